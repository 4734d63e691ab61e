//! `graph` - Microsoft Graph commands (Teams app catalog).

pub mod teams_app_list;
pub mod teams_app_publish;
pub mod teams_app_update;

use clap::Subcommand;
use serde_json::Value;

use crate::cmd::shared::CommandContext;
use crate::error::CommandError;

pub use teams_app_list::TeamsAppListArgs;
pub use teams_app_publish::TeamsAppPublishArgs;
pub use teams_app_update::TeamsAppUpdateArgs;

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Microsoft Teams
    #[command(subcommand)]
    Teams(TeamsCommands),
}

#[derive(Subcommand, Debug)]
pub enum TeamsCommands {
    /// Teams apps in the tenant app catalog
    #[command(subcommand)]
    App(TeamsAppCommands),
}

#[derive(Subcommand, Debug)]
pub enum TeamsAppCommands {
    /// List apps from the Microsoft Teams app catalog
    List(TeamsAppListArgs),
    /// Publish a Teams app to the tenant app catalog
    Publish(TeamsAppPublishArgs),
    /// Update a Teams app in the tenant app catalog
    Update(TeamsAppUpdateArgs),
}

pub async fn dispatch(cmd: &GraphCommands, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
    let GraphCommands::Teams(TeamsCommands::App(app)) = cmd;
    match app {
        TeamsAppCommands::List(args) => teams_app_list::run(&args.validate()?, ctx).await,
        TeamsAppCommands::Publish(args) => teams_app_publish::run(&args.validate()?, ctx).await,
        TeamsAppCommands::Update(args) => teams_app_update::run(&args.validate()?, ctx).await,
    }
}

/// Read a Teams app package (zip) from disk.
pub(crate) async fn read_app_package(path: &str) -> Result<Vec<u8>, CommandError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| CommandError::Request(format!("Failed to read app package {path}: {e}")))
}
