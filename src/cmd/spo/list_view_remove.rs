/*!
`spo list view remove` - delete a view from a list.

  POST {web}/_api/contextinfo                              -> FormDigestValue
  POST {web}/_api/web/{list}/views(guid'<id>')             X-HTTP-Method: DELETE
  POST {web}/_api/web/{list}/views/GetByTitle('<title>')   X-HTTP-Method: DELETE

Without `--confirm` the caller is asked first (see `spo::dispatch`).
*/

use clap::Args;
use serde_json::Value;
use tracing::info;

use super::{
    ListTarget, ListTargetArgs, SPO_ACCEPT, ViewRef, request_digest, site_token, validate_view,
};
use crate::cmd::shared::CommandContext;
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::odata;

#[derive(Args, Debug, Default, Clone)]
pub struct ListViewRemoveArgs {
    #[command(flatten)]
    pub target: ListTargetArgs,

    /// ID of the view to remove (specify view-id or view-title but not both)
    #[arg(long = "view-id", value_name = "GUID")]
    pub view_id: Option<String>,

    /// Title of the view to remove (specify view-id or view-title but not both)
    #[arg(long = "view-title", value_name = "TITLE")]
    pub view_title: Option<String>,

    /// Don't prompt for confirming removal of the view
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewRemoveOptions {
    pub target: ListTarget,
    pub view: ViewRef,
}

impl ListViewRemoveArgs {
    pub fn validate(&self) -> Result<ListViewRemoveOptions, CommandError> {
        let target = self.target.validate().map_err(CommandError::Validation)?;
        let view = validate_view(self.view_id.as_deref(), self.view_title.as_deref())
            .map_err(CommandError::Validation)?;
        Ok(ListViewRemoveOptions { target, view })
    }
}

impl ListViewRemoveOptions {
    fn view_url(&self) -> String {
        let view = match &self.view {
            ViewRef::Id(id) => format!("views(guid'{}')", odata::encode(id)),
            ViewRef::Title(title) => format!("views/GetByTitle('{}')", odata::literal(title)),
        };
        format!("{}/{view}", self.target.list_api_url())
    }
}

pub async fn run(
    opts: &ListViewRemoveOptions,
    ctx: &CommandContext<'_>,
) -> Result<Value, CommandError> {
    let token = site_token(ctx, &opts.target.web_url).await?;
    let digest = request_digest(ctx, &opts.target.web_url, &token).await?;
    info!(view = opts.view.label(), list = opts.target.list.label(), "Removing view...");

    ctx.send(
        ApiRequest::post(opts.view_url())
            .bearer(&token, SPO_ACCEPT)
            .header("X-HTTP-Method", "DELETE")
            .header("If-Match", "*")
            .header("X-RequestDigest", digest),
    )
    .await?;

    info!("DONE");
    Ok(Value::Null)
}
