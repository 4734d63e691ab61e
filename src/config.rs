//! Profile configuration (`config.toml` under the platform config dir).
//!
//! ```toml
//! [default]
//! client_id = "31359c7f-bd7e-475c-86db-fdb8c937548e"
//! tenant_id = "common"
//!
//! [contoso]
//! client_id = "..."
//! tenant_id = "contoso.onmicrosoft.com"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_PROFILE: &str = "default";
/// Multi-tenant app registration published for PnP / M365 command-line tooling.
pub const DEFAULT_CLIENT_ID: &str = "31359c7f-bd7e-475c-86db-fdb8c937548e";
pub const DEFAULT_TENANT: &str = "common";
pub const APP_DIR: &str = "m365-cli";

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub client_id: String,
    #[serde(default = "default_tenant")]
    pub tenant_id: String,
}

fn default_tenant() -> String {
    DEFAULT_TENANT.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            tenant_id: default_tenant(),
        }
    }
}

pub type ConfigMap = HashMap<String, AppConfig>;

pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join(APP_DIR))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Profile name: explicit flag, then `M365_PROFILE`, then `default`.
pub fn resolve_profile(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| {
            std::env::var("M365_PROFILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

pub fn load_profile(profile: &str) -> Result<AppConfig> {
    load_profile_from(&config_path()?, profile)
}

/// Without a config file only the default profile exists, with built-in values.
pub fn load_profile_from(path: &Path, profile: &str) -> Result<AppConfig> {
    if !path.exists() {
        if profile == DEFAULT_PROFILE {
            return Ok(AppConfig::default());
        }
        anyhow::bail!(
            "Profile `{profile}` requested but no config file found at {}",
            path.display()
        );
    }

    let config_data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let profiles: ConfigMap = toml::from_str(&config_data)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    profiles
        .get(profile)
        .cloned()
        .with_context(|| format!("Profile `{profile}` not found in config"))
}
