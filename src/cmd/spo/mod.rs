//! `spo` - SharePoint Online commands (list views).
//!
//! Lists and views are addressed either by id or by title, never both:
//! `ListRef` / `ViewRef` carry exactly one of the two after validation.
//! The token resource is the origin of `--web-url`.

pub mod list_view_get;
pub mod list_view_list;
pub mod list_view_remove;

use clap::{Args, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::auth::Service;
use crate::cmd::shared::{CommandContext, confirm};
use crate::error::CommandError;
use crate::request::ApiRequest;
use crate::utils::{odata, validate};

pub use list_view_get::ListViewGetArgs;
pub use list_view_list::ListViewListArgs;
pub use list_view_remove::ListViewRemoveArgs;

/// `accept` for SharePoint REST: plain JSON without OData metadata.
pub const SPO_ACCEPT: &str = "application/json;odata=nometadata";

#[derive(Subcommand, Debug)]
pub enum SpoCommands {
    /// SharePoint lists
    #[command(subcommand)]
    List(ListCommands),
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Views of a list
    #[command(subcommand)]
    View(ListViewCommands),
}

#[derive(Subcommand, Debug)]
pub enum ListViewCommands {
    /// List views configured on the specified list
    List(ListViewListArgs),
    /// Get information about a specific list view
    Get(ListViewGetArgs),
    /// Delete the specified view from the list
    Remove(ListViewRemoveArgs),
}

pub async fn dispatch(cmd: &SpoCommands, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    let SpoCommands::List(ListCommands::View(view)) = cmd;
    match view {
        ListViewCommands::List(args) => list_view_list::run(&args.validate()?, ctx).await,
        ListViewCommands::Get(args) => list_view_get::run(&args.validate()?, ctx).await,
        ListViewCommands::Remove(args) => {
            let opts = args.validate()?;
            ctx.session.ensure_connected(Service::Spo)?;
            if !args.confirm && !confirm_removal(&opts)? {
                debug!("view removal declined");
                return Ok(Value::Null);
            }
            list_view_remove::run(&opts, ctx).await
        }
    }
}

fn confirm_removal(opts: &list_view_remove::ListViewRemoveOptions) -> Result<bool, CommandError> {
    let question = format!(
        "Are you sure you want to remove the view {} from the list {}?",
        opts.view.label(),
        opts.target.list.label()
    );
    confirm(&question).map_err(|e| CommandError::Io(e.to_string()))
}

/* ---- List / view addressing ---- */

/// Site + list options shared by every list view command.
#[derive(Args, Debug, Default, Clone)]
pub struct ListTargetArgs {
    /// URL of the site where the list is located
    #[arg(short = 'u', long = "web-url", value_name = "URL")]
    pub web_url: Option<String>,

    /// ID of the list (specify list-id or list-title but not both)
    #[arg(long = "list-id", value_name = "GUID")]
    pub list_id: Option<String>,

    /// Title of the list (specify list-id or list-title but not both)
    #[arg(long = "list-title", value_name = "TITLE")]
    pub list_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRef {
    Id(String),
    Title(String),
}

impl ListRef {
    /// `lists(guid'<id>')` or `lists/GetByTitle('<title>')`.
    pub fn api_path(&self) -> String {
        match self {
            ListRef::Id(id) => format!("lists(guid'{}')", odata::encode(id)),
            ListRef::Title(title) => format!("lists/GetByTitle('{}')", odata::literal(title)),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ListRef::Id(v) | ListRef::Title(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRef {
    Id(String),
    Title(String),
}

impl ViewRef {
    pub fn label(&self) -> &str {
        match self {
            ViewRef::Id(v) | ViewRef::Title(v) => v,
        }
    }
}

/// Validated site URL (no trailing slash) and list reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTarget {
    pub web_url: String,
    pub list: ListRef,
}

impl ListTarget {
    /// `{web}/_api/web/{list}`
    pub fn list_api_url(&self) -> String {
        format!("{}/_api/web/{}", self.web_url, self.list.api_path())
    }
}

impl ListTargetArgs {
    pub fn validate(&self) -> Result<ListTarget, String> {
        let web_url = validate::required("web-url", self.web_url.as_deref())?;
        validate::sharepoint_url("web-url", web_url)?;
        let by_id = validate::exactly_one(
            ("list-id", self.list_id.as_deref()),
            ("list-title", self.list_title.as_deref()),
        )?;
        let list = if by_id {
            let id = validate::required("list-id", self.list_id.as_deref())?;
            validate::guid("list-id", id)?;
            ListRef::Id(id.to_string())
        } else {
            ListRef::Title(validate::required("list-title", self.list_title.as_deref())?.to_string())
        };
        Ok(ListTarget {
            web_url: odata::trim_web_url(web_url).to_string(),
            list,
        })
    }
}

/// Exactly one of view id / view title, id must be a GUID.
pub fn validate_view(view_id: Option<&str>, view_title: Option<&str>) -> Result<ViewRef, String> {
    let by_id = validate::exactly_one(("view-id", view_id), ("view-title", view_title))?;
    if by_id {
        let id = validate::required("view-id", view_id)?;
        validate::guid("view-id", id)?;
        Ok(ViewRef::Id(id.to_string()))
    } else {
        Ok(ViewRef::Title(validate::required("view-title", view_title)?.to_string()))
    }
}

/* ---- SharePoint request helpers ---- */

/// Connection check + token for the site's tenant.
pub async fn site_token(ctx: &CommandContext<'_>, web_url: &str) -> Result<String, CommandError> {
    ctx.session.ensure_connected(Service::Spo)?;
    let resource = odata::origin(web_url)
        .ok_or_else(|| CommandError::Validation(format!("{web_url} is not a valid URL")))?;
    ctx.authenticate(Service::Spo, &resource).await
}

/// Form digest required by mutating SharePoint calls.
pub async fn request_digest(
    ctx: &CommandContext<'_>,
    web_url: &str,
    token: &str,
) -> Result<String, CommandError> {
    let response = ctx
        .send(ApiRequest::post(format!("{web_url}/_api/contextinfo")).bearer(token, SPO_ACCEPT))
        .await?;
    response
        .get("FormDigestValue")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CommandError::Request("Form digest missing from contextinfo response".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::cmd::format::OutputMode;
    use crate::cmd::testkit::{FakeClient, StaticTokens, context};

    const LIST_ID: &str = "1f187321-f086-4d3d-8523-517e94cc9df9";

    fn target(web_url: Option<&str>, list_id: Option<&str>, list_title: Option<&str>) -> Result<ListTarget, String> {
        ListTargetArgs {
            web_url: web_url.map(str::to_string),
            list_id: list_id.map(str::to_string),
            list_title: list_title.map(str::to_string),
        }
        .validate()
    }

    #[test]
    fn fails_without_web_url() {
        assert!(target(None, Some(LIST_ID), None).is_err());
    }

    #[test]
    fn fails_without_list_id_and_title() {
        assert!(target(Some("https://contoso.sharepoint.com"), None, None).is_err());
    }

    #[test]
    fn fails_with_invalid_web_url() {
        assert!(target(Some("foo"), Some(LIST_ID), None).is_err());
    }

    #[test]
    fn fails_with_invalid_list_id() {
        assert!(target(Some("https://contoso.sharepoint.com"), Some("12345"), None).is_err());
    }

    #[test]
    fn fails_with_both_list_id_and_title() {
        let err = target(Some("https://contoso.sharepoint.com"), Some(LIST_ID), Some("Documents")).unwrap_err();
        assert!(err.contains("but not both"));
    }

    #[test]
    fn accepts_valid_target() {
        let t = target(Some("https://contoso.sharepoint.com/sites/ninja/"), Some(LIST_ID), None).unwrap();
        assert_eq!(t.web_url, "https://contoso.sharepoint.com/sites/ninja");
        assert_eq!(
            t.list_api_url(),
            format!("https://contoso.sharepoint.com/sites/ninja/_api/web/lists(guid'{LIST_ID}')")
        );
    }

    #[test]
    fn title_path_is_escaped() {
        assert_eq!(
            ListRef::Title("Documents".into()).api_path(),
            "lists/GetByTitle('Documents')"
        );
        assert_eq!(
            ListRef::Title("Team's Docs".into()).api_path(),
            "lists/GetByTitle('Team%27%27s%20Docs')"
        );
    }

    #[test]
    fn view_rules() {
        assert!(validate_view(None, None).is_err());
        assert!(validate_view(Some("abc"), None).is_err());
        assert!(validate_view(Some(LIST_ID), Some("All")).is_err());
        assert_eq!(validate_view(None, Some("All Items")), Ok(ViewRef::Title("All Items".into())));
    }

    #[tokio::test]
    async fn unconfirmed_remove_checks_connection_before_prompting() {
        let session = Session::default();
        let tokens = StaticTokens::ok("ABC");
        let client = FakeClient::new(|_| Ok(Value::Null));
        let ctx = context(&session, &tokens, &client, OutputMode::Json);

        let cmd = SpoCommands::List(ListCommands::View(ListViewCommands::Remove(
            ListViewRemoveArgs {
                target: ListTargetArgs {
                    web_url: Some("https://contoso.sharepoint.com/sites/ninja".into()),
                    list_id: None,
                    list_title: Some("Documents".into()),
                },
                view_id: None,
                view_title: Some("All".into()),
                confirm: false,
            },
        )));
        let err = dispatch(&cmd, &ctx).await.unwrap_err();
        assert_eq!(
            err,
            CommandError::NotConnected("Log in to a SharePoint Online site first".into())
        );
        assert!(client.requests().is_empty());
        assert_eq!(tokens.calls(), 0);
    }
}
