/*!
`graph teams app update` - replace a Teams app in the tenant app catalog
with a new app package.

  PUT {resource}/v1.0/appCatalogs/teamsApps/{id}   (body: zip package)
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::auth::Service;
use crate::cmd::graph::read_app_package;
use crate::cmd::shared::CommandContext;
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::{odata, validate};

#[derive(Args, Debug, Default, Clone)]
pub struct TeamsAppUpdateArgs {
    /// ID of the Teams app to update (the catalog id, not the manifest id)
    #[arg(short = 'i', long, value_name = "GUID")]
    pub id: Option<String>,

    /// Absolute or relative path to the Teams manifest zip file
    #[arg(short = 'p', long = "file-path", value_name = "PATH")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamsAppUpdateOptions {
    pub id: String,
    pub file_path: String,
}

impl TeamsAppUpdateArgs {
    pub fn validate(&self) -> Result<TeamsAppUpdateOptions, CommandError> {
        let check = || -> Result<TeamsAppUpdateOptions, String> {
            let id = validate::required("id", self.id.as_deref())?;
            validate::guid("id", id)?;
            let file_path = validate::required("file-path", self.file_path.as_deref())?;
            validate::existing_file("file-path", file_path)?;
            Ok(TeamsAppUpdateOptions {
                id: id.to_string(),
                file_path: file_path.to_string(),
            })
        };
        check().map_err(CommandError::Validation)
    }
}

pub async fn run(
    opts: &TeamsAppUpdateOptions,
    ctx: &CommandContext<'_>,
) -> Result<Value, CommandError> {
    let (token, resource) = ctx.authenticate_service(Service::Graph).await?;
    info!(id = %opts.id, "Updating app in the tenant app catalog...");

    let package = read_app_package(&opts.file_path).await?;
    let url = format!(
        "{resource}/v1.0/appCatalogs/teamsApps/{}",
        odata::encode(&opts.id)
    );
    ctx.send(
        ApiRequest::put(url)
            .bearer(&token, "application/json;odata.metadata=none")
            .bytes("application/zip", package),
    )
    .await?;

    info!("DONE");
    Ok(Value::Null)
}
