/*!
`spo list view get` - one view of a list, by id or title.

  GET {web}/_api/web/{list}/views/GetById('<id>')
  GET {web}/_api/web/{list}/views/GetByTitle('<title>')
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use super::{ListTarget, ListTargetArgs, SPO_ACCEPT, ViewRef, site_token, validate_view};
use crate::cmd::shared::CommandContext;
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::odata;

#[derive(Args, Debug, Default, Clone)]
pub struct ListViewGetArgs {
    #[command(flatten)]
    pub target: ListTargetArgs,

    /// ID of the view (specify view-id or view-title but not both)
    #[arg(long = "view-id", value_name = "GUID")]
    pub view_id: Option<String>,

    /// Title of the view (specify view-id or view-title but not both)
    #[arg(long = "view-title", value_name = "TITLE")]
    pub view_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewGetOptions {
    pub target: ListTarget,
    pub view: ViewRef,
}

impl ListViewGetArgs {
    pub fn validate(&self) -> Result<ListViewGetOptions, CommandError> {
        let check = || -> Result<ListViewGetOptions, String> {
            let target = self.target.validate()?;
            let view = validate_view(self.view_id.as_deref(), self.view_title.as_deref())?;
            Ok(ListViewGetOptions { target, view })
        };
        check().map_err(CommandError::Validation)
    }
}

fn view_url(opts: &ListViewGetOptions) -> String {
    let view = match &opts.view {
        ViewRef::Id(id) => format!("GetById('{}')", odata::encode(id)),
        ViewRef::Title(title) => format!("GetByTitle('{}')", odata::literal(title)),
    };
    format!("{}/views/{view}", opts.target.list_api_url())
}

pub async fn run(opts: &ListViewGetOptions, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    let token = site_token(ctx, &opts.target.web_url).await?;
    info!(view = opts.view.label(), list = opts.target.list.label(), "Retrieving view...");

    let view = ctx
        .send(ApiRequest::get(view_url(opts)).bearer(&token, SPO_ACCEPT))
        .await?;
    Ok(view)
}
