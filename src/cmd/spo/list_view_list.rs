/*!
`spo list view list` - views configured on a list.

  GET {web}/_api/web/lists(guid'<id>')/views
  GET {web}/_api/web/lists/GetByTitle('<title>')/views

Text output keeps Id, Title, DefaultView, Hidden, BaseViewId per view in
response order; JSON output is the `value` array untouched.
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use super::{ListTarget, ListTargetArgs, SPO_ACCEPT, site_token};
use crate::cmd::shared::{CommandContext, collection_items, project};
use crate::error::CommandError;
use crate::request::ApiRequest;

const TEXT_FIELDS: &[&str] = &["Id", "Title", "DefaultView", "Hidden", "BaseViewId"];

#[derive(Args, Debug, Default, Clone)]
pub struct ListViewListArgs {
    #[command(flatten)]
    pub target: ListTargetArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewListOptions {
    pub target: ListTarget,
}

impl ListViewListArgs {
    pub fn validate(&self) -> Result<ListViewListOptions, CommandError> {
        self.target
            .validate()
            .map(|target| ListViewListOptions { target })
            .map_err(CommandError::Validation)
    }
}

pub async fn run(opts: &ListViewListOptions, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    let token = site_token(ctx, &opts.target.web_url).await?;
    info!(list = opts.target.list.label(), "Retrieving views information...");

    let url = format!("{}/views", opts.target.list_api_url());
    let response = ctx.send(ApiRequest::get(url).bearer(&token, SPO_ACCEPT)).await?;
    let views = collection_items(&response);

    if ctx.is_json() {
        Ok(Value::Array(views))
    } else {
        Ok(project(&views, TEXT_FIELDS))
    }
}
