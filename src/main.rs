#![recursion_limit = "256"]

use clap::{Parser, Subcommand};

mod auth;
mod cmd;
mod config;
mod error;
mod request;
mod utils;

use cmd::format::OutputMode;
use cmd::{AadCommands, GraphCommands, LoginArgs, LogoutArgs, RemoteCommand, SpoCommands};

/// m365 - manage Microsoft 365 tenants from the command line
///
/// Command layout:
///   m365 login <aad|graph|spo> [--url <site>]
///   m365 logout [aad|graph|spo]
///   m365 status
///   m365 aad oauth2grant <list|remove> ...
///   m365 graph teams app <list|publish|update> ...
///   m365 spo list view <list|get|remove> ...
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   -o / --output   text (default) or json
///   --profile       Config profile (or M365_PROFILE env)
///
/// Examples:
///   m365 login spo --url https://contoso.sharepoint.com
///   m365 spo list view list --web-url https://contoso.sharepoint.com/sites/ninja --list-title Documents
///   m365 aad oauth2grant list --client-id b2307a39-e878-458b-bc90-03bc578531d6 -o json
///   m365 graph teams app publish --file-path ./teamsapp.zip
#[derive(Parser, Debug)]
#[command(
    name = "m365",
    version,
    author,
    about = "m365 - Microsoft 365 administration CLI",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputMode::Text, global = true)]
    output: OutputMode,

    /// Configuration profile (falls back to M365_PROFILE, then "default")
    #[arg(long, global = true, value_name = "NAME")]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in to a Microsoft 365 service
    Login(LoginArgs),

    /// Sign out of one service, or all of them
    Logout(LogoutArgs),

    /// Show connection status per service
    Status,

    /// Azure Active Directory Graph commands
    #[command(subcommand)]
    Aad(AadCommands),

    /// Microsoft Graph commands
    #[command(subcommand)]
    Graph(GraphCommands),

    /// SharePoint Online commands
    #[command(subcommand)]
    Spo(SpoCommands),
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let globals = cmd::Globals {
        output: cli.output,
        profile: config::resolve_profile(cli.profile.as_deref()),
    };

    let result = match &cli.command {
        Commands::Login(args) => cmd::execute_login(args, &globals),
        Commands::Logout(args) => cmd::execute_logout(args, &globals),
        Commands::Status => cmd::execute_status(&globals),
        Commands::Aad(c) => cmd::execute_remote(RemoteCommand::Aad(c), &globals),
        Commands::Graph(c) => cmd::execute_remote(RemoteCommand::Graph(c), &globals),
        Commands::Spo(c) => cmd::execute_remote(RemoteCommand::Spo(c), &globals),
    };

    if let Err(err) = result {
        cmd::report_error(&err, globals.output);
        std::process::exit(1);
    }
}
