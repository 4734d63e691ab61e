/*!
Command dispatcher.

Layout:
  src/cmd/
    mod.rs        (this file: runtime + context wiring, output emission)
    session.rs    (login / logout / status)
    aad/          (Azure AD Graph: oauth2grant list|remove)
    graph/        (Microsoft Graph: teams app list|publish|update)
    spo/          (SharePoint Online: list view list|get|remove)
    shared.rs     (CommandContext, projection, paging, confirm prompt)
    format.rs     (text tables / JSON output)

Conventions:
  - Each leaf command exposes `XxxArgs::validate() -> XxxOptions` and
    `run(&XxxOptions, &CommandContext) -> Result<Value, CommandError>`.
  - `run` returns the value to print; `Value::Null` prints nothing.
  - The `execute_*` functions here are the only place that touches stdout.
*/

pub mod aad;
pub mod format;
pub mod graph;
pub mod session;
pub mod shared;
pub mod spo;

#[cfg(test)]
mod testkit;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::auth::login::{DEFAULT_AUTHORITY, DeviceCodeLogin};
use crate::auth::{SessionStore, StoredTokenProvider};
use crate::config;
use crate::error::CommandError;
use crate::request::HttpClient;
use format::{OutputMode, StyleOptions};
use shared::CommandContext;

pub use aad::AadCommands;
pub use graph::GraphCommands;
pub use session::{LoginArgs, LogoutArgs};
pub use spo::SpoCommands;

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct Globals {
    pub output: OutputMode,
    pub profile: String,
}

/// A command that talks to a remote service through `CommandContext`.
#[derive(Debug, Clone, Copy)]
pub enum RemoteCommand<'a> {
    Aad(&'a AadCommands),
    Graph(&'a GraphCommands),
    Spo(&'a SpoCommands),
}

impl RemoteCommand<'_> {
    pub async fn dispatch(&self, ctx: &CommandContext<'_>) -> Result<Value, CommandError> {
        match self {
            RemoteCommand::Aad(cmd) => aad::dispatch(cmd, ctx).await,
            RemoteCommand::Graph(cmd) => graph::dispatch(cmd, ctx).await,
            RemoteCommand::Spo(cmd) => spo::dispatch(cmd, ctx).await,
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")
}

fn emit(value: &Value, output: OutputMode) {
    if let Some(text) = format::render(value, output, &StyleOptions::detect()) {
        println!("{text}");
    }
}

pub fn execute_remote(cmd: RemoteCommand<'_>, globals: &Globals) -> Result<()> {
    let store = SessionStore::for_profile(&globals.profile)?;
    let session = store.load()?;
    debug!(path = %store.path().display(), "loaded session");

    let tokens = StoredTokenProvider::new(&session);
    let client = HttpClient::new()?;
    let ctx = CommandContext {
        session: &session,
        tokens: &tokens,
        client: &client,
        output: globals.output,
    };

    let value = runtime()?.block_on(cmd.dispatch(&ctx))?;
    emit(&value, globals.output);
    Ok(())
}

pub fn execute_login(args: &LoginArgs, globals: &Globals) -> Result<()> {
    let opts = args.validate()?;
    let app = config::load_profile(&globals.profile)?;
    let store = SessionStore::for_profile(&globals.profile)?;
    let flow = DeviceCodeLogin::new(DEFAULT_AUTHORITY);

    let value = runtime()?.block_on(session::login(&opts, &app, &flow, &store))?;
    emit(&value, globals.output);
    Ok(())
}

pub fn execute_logout(args: &LogoutArgs, globals: &Globals) -> Result<()> {
    let store = SessionStore::for_profile(&globals.profile)?;
    let value = session::logout(args, &store)?;
    emit(&value, globals.output);
    Ok(())
}

pub fn execute_status(globals: &Globals) -> Result<()> {
    let store = SessionStore::for_profile(&globals.profile)?;
    let value = session::status(&store)?;
    emit(&value, globals.output);
    Ok(())
}

/// Print a failed command the way the selected output mode expects.
pub fn report_error(err: &anyhow::Error, output: OutputMode) {
    let message = err
        .downcast_ref::<CommandError>()
        .map(|e| e.message().to_string())
        .unwrap_or_else(|| format!("{err:#}"));
    match output {
        OutputMode::Json => println!("{}", serde_json::json!({ "error": message })),
        OutputMode::Text => eprintln!(
            "{}",
            format::color(format::Role::Error, format!("Error: {message}"), &StyleOptions::detect())
        ),
    }
}
