//! Connection state and token acquisition.
//!
//! A `Session` holds one `Connection` per `Service`. It is loaded once at
//! startup, handed to commands read-only through `CommandContext`, and only
//! written by `login` / `logout`.
//!
//! `TokenProvider` is the seam commands use to get a bearer token for a
//! resource; `StoredTokenProvider` serves tokens persisted by `login`.

pub mod login;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::error::CommandError;

pub const AAD_GRAPH_RESOURCE: &str = "https://graph.windows.net";
pub const MS_GRAPH_RESOURCE: &str = "https://graph.microsoft.com";

/// Tokens closer than this to expiry are treated as expired.
const EXPIRY_SKEW_SECS: u64 = 60;

/// Remote service a command (or login) targets.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Service {
    /// Azure Active Directory Graph
    Aad,
    /// Microsoft Graph
    Graph,
    /// SharePoint Online
    Spo,
}

impl Service {
    pub const fn all() -> &'static [Service] {
        &[Service::Aad, Service::Graph, Service::Spo]
    }

    /// Fixed resource for services that have one (SharePoint depends on the tenant).
    pub fn fixed_resource(&self) -> Option<&'static str> {
        match self {
            Service::Aad => Some(AAD_GRAPH_RESOURCE),
            Service::Graph => Some(MS_GRAPH_RESOURCE),
            Service::Spo => None,
        }
    }

    /// Error returned when a command runs without a connection.
    pub fn not_connected_message(&self) -> &'static str {
        match self {
            Service::Aad => "Log in to Azure Active Directory Graph first",
            Service::Graph => "Log in to the Microsoft Graph first",
            Service::Spo => "Log in to a SharePoint Online site first",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Service::Aad => "Azure Active Directory Graph",
            Service::Graph => "Microsoft Graph",
            Service::Spo => "SharePoint Online",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Service::Aad => "aad",
            Service::Graph => "graph",
            Service::Spo => "spo",
        })
    }
}

/// Persisted state of one service connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub connected: bool,
    /// Resource the token was issued for (tenant origin for SharePoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Connection {
    pub fn connected_to(resource: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            connected: true,
            resource: Some(resource.into()),
            access_token: Some(access_token.into()),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn token_valid(&self) -> bool {
        match self.expires_at {
            None => self.access_token.is_some(),
            Some(exp) => self.access_token.is_some() && exp > now_secs() + EXPIRY_SKEW_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub aad: Connection,
    #[serde(default)]
    pub graph: Connection,
    #[serde(default)]
    pub spo: Connection,
}

impl Session {
    pub fn connection(&self, service: Service) -> &Connection {
        match service {
            Service::Aad => &self.aad,
            Service::Graph => &self.graph,
            Service::Spo => &self.spo,
        }
    }

    pub fn connection_mut(&mut self, service: Service) -> &mut Connection {
        match service {
            Service::Aad => &mut self.aad,
            Service::Graph => &mut self.graph,
            Service::Spo => &mut self.spo,
        }
    }

    /// Fail fast unless the service is connected.
    pub fn ensure_connected(&self, service: Service) -> Result<&Connection, CommandError> {
        let conn = self.connection(service);
        if conn.connected {
            Ok(conn)
        } else {
            Err(CommandError::NotConnected(
                service.not_connected_message().to_string(),
            ))
        }
    }
}

/* ---- Persistence ---- */

/// JSON file holding the session of one profile.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn for_profile(profile: &str) -> Result<Self> {
        Ok(Self::at(
            crate::config::config_dir()?.join(format!("session-{profile}.json")),
        ))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means nothing is connected yet.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read session file: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session file: {}", self.path.display()))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        let mut file = session_file_options()
            .open(&self.path)
            .with_context(|| format!("failed to write session file: {}", self.path.display()))?;
        restrict_to_owner(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// The session file holds bearer and refresh tokens: owner read/write only.
fn session_file_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// `mode` only applies on creation; files from older runs are tightened too.
#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict session file: {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_to_owner(_: &Path) -> Result<()> {
    Ok(())
}

/* ---- Token acquisition ---- */

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Bearer token for `resource` on behalf of `service`'s connection.
    async fn access_token(&self, service: Service, resource: &str)
    -> Result<String, CommandError>;
}

/// Serves tokens written by `login`. Does not refresh: an expired token asks
/// the user to log in again.
pub struct StoredTokenProvider<'a> {
    session: &'a Session,
}

impl<'a> StoredTokenProvider<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TokenProvider for StoredTokenProvider<'_> {
    async fn access_token(
        &self,
        service: Service,
        resource: &str,
    ) -> Result<String, CommandError> {
        let conn = self.session.connection(service);
        if conn.resource.as_deref().map(normalize_resource) != Some(normalize_resource(resource)) {
            return Err(CommandError::Authentication(format!(
                "No access token available for {resource}. Run `m365 login {service}` for that resource"
            )));
        }
        if !conn.token_valid() {
            return Err(CommandError::Authentication(format!(
                "Access token for {resource} expired. Run `m365 login {service}` again"
            )));
        }
        conn.access_token
            .clone()
            .ok_or_else(|| CommandError::Authentication("Error getting access token".into()))
    }
}

fn normalize_resource(resource: &str) -> String {
    resource.trim_end_matches('/').to_ascii_lowercase()
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
