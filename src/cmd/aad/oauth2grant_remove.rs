/*!
`aad oauth2grant remove` - remove a service principal's OAuth2 permission grant.

  DELETE {resource}/myorganization/oauth2PermissionGrants/{grantId}?api-version=1.6

Grant ids are opaque base64-like strings (not GUIDs) and may start with `-`,
which the parser accepts as a value.
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::auth::Service;
use crate::cmd::shared::CommandContext;
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::{odata, validate};

#[derive(Args, Debug, Default, Clone)]
pub struct Oauth2GrantRemoveArgs {
    /// objectId of the OAuth2 permission grant to remove
    #[arg(short = 'i', long = "grant-id", value_name = "ID", allow_hyphen_values = true)]
    pub grant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oauth2GrantRemoveOptions {
    pub grant_id: String,
}

impl Oauth2GrantRemoveArgs {
    pub fn validate(&self) -> Result<Oauth2GrantRemoveOptions, CommandError> {
        let grant_id =
            validate::required("grant-id", self.grant_id.as_deref()).map_err(CommandError::Validation)?;
        Ok(Oauth2GrantRemoveOptions {
            grant_id: grant_id.to_string(),
        })
    }
}

pub async fn run(
    opts: &Oauth2GrantRemoveOptions,
    ctx: &CommandContext<'_>,
) -> Result<Value, CommandError> {
    let (token, resource) = ctx.authenticate_service(Service::Aad).await?;
    info!("Removing OAuth2 permissions...");

    let url = format!(
        "{resource}/myorganization/oauth2PermissionGrants/{}?api-version=1.6",
        odata::encode(&opts.grant_id)
    );
    ctx.send(ApiRequest::delete(url).bearer(&token, "application/json"))
        .await?;

    info!("DONE");
    Ok(Value::Null)
}
