/*!
`aad oauth2grant list` - OAuth2 permission grants issued to a service principal.

  GET {resource}/myorganization/oauth2PermissionGrants?api-version=1.6&$filter=clientId eq '<id>'

Text output: objectId, resourceId, scope. JSON output: grants as returned.
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::auth::Service;
use crate::cmd::shared::{CommandContext, collection_items, project};
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::{odata, validate};

const TEXT_FIELDS: &[&str] = &["objectId", "resourceId", "scope"];

#[derive(Args, Debug, Default, Clone)]
pub struct Oauth2GrantListArgs {
    /// objectId of the service principal whose grants to list
    #[arg(short = 'c', long = "client-id", value_name = "GUID")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oauth2GrantListOptions {
    pub client_id: String,
}

impl Oauth2GrantListArgs {
    pub fn validate(&self) -> Result<Oauth2GrantListOptions, CommandError> {
        let check = || -> Result<String, String> {
            let client_id = validate::required("client-id", self.client_id.as_deref())?;
            validate::guid("client-id", client_id)?;
            Ok(client_id.to_string())
        };
        check()
            .map(|client_id| Oauth2GrantListOptions { client_id })
            .map_err(CommandError::Validation)
    }
}

pub async fn run(
    opts: &Oauth2GrantListOptions,
    ctx: &CommandContext<'_>,
) -> Result<Value, CommandError> {
    let (token, resource) = ctx.authenticate_service(Service::Aad).await?;
    info!("Retrieving list of OAuth grants for the service principal...");

    let url = format!(
        "{resource}/myorganization/oauth2PermissionGrants?api-version=1.6&$filter=clientId%20eq%20'{}'",
        odata::encode(&opts.client_id)
    );
    let response = ctx
        .send(ApiRequest::get(url).bearer(&token, "application/json"))
        .await?;
    let grants = collection_items(&response);

    if ctx.is_json() {
        Ok(Value::Array(grants))
    } else {
        Ok(project(&grants, TEXT_FIELDS))
    }
}
