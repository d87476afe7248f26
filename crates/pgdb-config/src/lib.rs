//! Local configuration store for the pgdb CLI
//!
//! Persists a mapping from server alias to pgdbd base URL as a single JSON
//! file (`~/.config/pgdb/config.json`). The file is read once per
//! invocation, mutated in memory and written back wholesale.

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Persisted server configuration: alias → daemon base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub default_server: String,
    #[serde(default)]
    pub servers: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_server: "default".to_string(),
            servers: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// Resolve an alias (or the configured default) to its URL.
    pub fn resolve(&self, alias: Option<&str>) -> Result<(String, String)> {
        let selected = alias.unwrap_or(&self.default_server);
        match self.servers.get(selected) {
            Some(url) => Ok((selected.to_string(), url.clone())),
            None => Err(ConfigError::UnknownAlias(selected.to_string())),
        }
    }
}

/// Handle to the configuration file on disk.
///
/// The path is fixed at construction so library code never has to consult
/// process-wide state; tests point it at a temporary directory.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Open the store at its default location.
    ///
    /// `PGDB_CONFIG_PATH` overrides the path entirely, otherwise the file
    /// lives under the platform configuration directory.
    pub fn open_default() -> Result<Self> {
        if let Ok(path) = std::env::var("PGDB_CONFIG_PATH") {
            return Ok(Self { path: PathBuf::from(path) });
        }

        let dir = dirs::config_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join("pgdb");

        Ok(Self {
            path: dir.join("config.json"),
        })
    }

    /// Open the store at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration. A missing or blank file yields defaults.
    pub fn load(&self) -> Result<ServerConfig> {
        if !self.path.exists() {
            return Ok(ServerConfig::default());
        }

        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(ServerConfig::default());
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Write the whole configuration back, pretty-printed with a trailing
    /// newline. The parent directory is created owner-only.
    pub fn save(&self, config: &ServerConfig) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
            }
        }

        let mut text = serde_json::to_string_pretty(config)?;
        text.push('\n');
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Point an alias at a URL and persist. Setting the `default` alias also
    /// marks it as the selected default.
    pub fn set_server(&self, alias: &str, url: &str) -> Result<()> {
        validate_server_url(url)?;

        let mut config = self.load()?;
        config.servers.insert(alias.to_string(), url.to_string());
        if alias == "default" {
            config.default_server = "default".to_string();
        }
        self.save(&config)
    }
}

/// Check that a value is an absolute URL with an http(s) scheme.
pub fn validate_server_url(url: &str) -> Result<()> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    };

    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::UnsupportedScheme(url.to_string()));
    }

    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }

    Ok(())
}
