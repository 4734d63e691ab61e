/*!
`graph teams app publish` - add a Teams app package to the tenant app catalog.

  POST {resource}/v1.0/appCatalogs/teamsApps   (body: zip package)

Prints the new app (text: id only).
*/

use clap::Args;
use serde_json::{Value, json};
use tracing::info;

use crate::auth::Service;
use crate::cmd::graph::read_app_package;
use crate::cmd::shared::CommandContext;
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::validate;

#[derive(Args, Debug, Default, Clone)]
pub struct TeamsAppPublishArgs {
    /// Absolute or relative path to the Teams manifest zip file
    #[arg(short = 'p', long = "file-path", value_name = "PATH")]
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamsAppPublishOptions {
    pub file_path: String,
}

impl TeamsAppPublishArgs {
    pub fn validate(&self) -> Result<TeamsAppPublishOptions, CommandError> {
        let check = || -> Result<String, String> {
            let file_path = validate::required("file-path", self.file_path.as_deref())?;
            validate::existing_file("file-path", file_path)?;
            Ok(file_path.to_string())
        };
        check()
            .map(|file_path| TeamsAppPublishOptions { file_path })
            .map_err(CommandError::Validation)
    }
}

pub async fn run(
    opts: &TeamsAppPublishOptions,
    ctx: &CommandContext<'_>,
) -> Result<Value, CommandError> {
    let (token, resource) = ctx.authenticate_service(Service::Graph).await?;
    info!(file = %opts.file_path, "Publishing app to the tenant app catalog...");

    let package = read_app_package(&opts.file_path).await?;
    let app = ctx
        .send(
            ApiRequest::post(format!("{resource}/v1.0/appCatalogs/teamsApps"))
                .bearer(&token, "application/json;odata.metadata=none")
                .bytes("application/zip", package),
        )
        .await?;

    if ctx.is_json() {
        Ok(app)
    } else {
        Ok(json!({ "id": app.get("id").cloned().unwrap_or(Value::Null) }))
    }
}
