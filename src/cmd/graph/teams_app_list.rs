/*!
`graph teams app list` - apps in the Microsoft Teams app catalog.

  GET {resource}/v1.0/appCatalogs/teamsApps?$filter=distributionMethod eq 'organization'

`--all` drops the filter (includes store apps). Pages are followed through
`@odata.nextLink`. Text output: id, displayName, distributionMethod.
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::auth::Service;
use crate::cmd::shared::{CommandContext, follow_next_links, project};
use crate::error::CommandError;

const TEXT_FIELDS: &[&str] = &["id", "displayName", "distributionMethod"];

#[derive(Args, Debug, Default, Clone)]
pub struct TeamsAppListArgs {
    /// List all apps, not only the ones from the organization's app catalog
    #[arg(short = 'a', long)]
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamsAppListOptions {
    pub all: bool,
}

impl TeamsAppListArgs {
    pub fn validate(&self) -> Result<TeamsAppListOptions, CommandError> {
        Ok(TeamsAppListOptions { all: self.all })
    }
}

pub async fn run(opts: &TeamsAppListOptions, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    let (token, resource) = ctx.authenticate_service(Service::Graph).await?;
    info!(all = opts.all, "Retrieving Teams apps...");

    let mut url = format!("{resource}/v1.0/appCatalogs/teamsApps");
    if !opts.all {
        url.push_str("?$filter=distributionMethod%20eq%20'organization'");
    }
    let apps = follow_next_links(ctx, url, &token, "application/json;odata.metadata=none").await?;

    if ctx.is_json() {
        Ok(Value::Array(apps))
    } else {
        Ok(project(&apps, TEXT_FIELDS))
    }
}
