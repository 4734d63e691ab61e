//! `aad` - Azure Active Directory Graph commands.

pub mod oauth2grant_list;
pub mod oauth2grant_remove;

use clap::Subcommand;
use serde_json::Value;

use crate::cmd::shared::CommandContext;
use crate::error::CommandError;

pub use oauth2grant_list::Oauth2GrantListArgs;
pub use oauth2grant_remove::Oauth2GrantRemoveArgs;

#[derive(Subcommand, Debug)]
pub enum AadCommands {
    /// Manage OAuth2 permission grants of service principals
    #[command(name = "oauth2grant", subcommand)]
    Oauth2Grant(Oauth2GrantCommands),
}

#[derive(Subcommand, Debug)]
pub enum Oauth2GrantCommands {
    /// List OAuth2 permission grants for the specified service principal
    List(Oauth2GrantListArgs),
    /// Remove specified service principal OAuth2 permissions
    Remove(Oauth2GrantRemoveArgs),
}

pub async fn dispatch(cmd: &AadCommands, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    match cmd {
        AadCommands::Oauth2Grant(Oauth2GrantCommands::List(args)) => {
            oauth2grant_list::run(&args.validate()?, ctx).await
        }
        AadCommands::Oauth2Grant(Oauth2GrantCommands::Remove(args)) => {
            oauth2grant_remove::run(&args.validate()?, ctx).await
        }
    }
}
