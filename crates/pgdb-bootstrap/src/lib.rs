//! SSH bootstrap of pgdbd on an existing host
//!
//! Given a reachable host, generates an idempotent install script, streams
//! it over ssh and, on success, records the daemon URL in the local
//! configuration store. The host only needs ssh access for a privileged
//! user; everything else is installed by the script.

pub mod error;
pub mod script;
pub mod ssh;

pub use error::{BootstrapError, Result};
pub use ssh::SshExecutor;

use pgdb_config::ConfigStore;
use serde::Serialize;

/// Parameters for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub host: String,
    pub user: String,
    pub repo_url: String,
    pub install_path: String,
    pub pgdb_port: u16,
    /// Externally visible host for the daemon URL. Defaults to `host`;
    /// never inferred beyond that.
    pub public_host: Option<String>,
    /// Pre-shared daemon token; generated when absent.
    pub token: Option<String>,
}

impl BootstrapOptions {
    pub fn new(host: impl Into<String>, repo_url: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: "root".to_string(),
            repo_url: repo_url.into(),
            install_path: "/opt/pgdb".to_string(),
            pgdb_port: 8080,
            public_host: None,
            token: None,
        }
    }
}

/// Summary of one successful bootstrap run.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapResult {
    pub host: String,
    pub user: String,
    pub daemon_url: String,
    pub token: String,
    pub service_status: &'static str,
    pub next_steps: Vec<String>,
}

/// Install and start pgdbd on the target host, then persist the daemon URL
/// under the `default` alias. The configuration store is only touched after
/// the remote script exits 0.
pub async fn bootstrap(
    executor: &SshExecutor,
    store: &ConfigStore,
    options: &BootstrapOptions,
) -> Result<BootstrapResult> {
    let public_host = options
        .public_host
        .clone()
        .unwrap_or_else(|| options.host.clone());
    let token = options.token.clone().unwrap_or_else(generate_token);

    let remote_script = script::render(&script::ScriptParams {
        repo_url: &options.repo_url,
        install_path: &options.install_path,
        token: &token,
        public_host: &public_host,
        pgdb_port: options.pgdb_port,
    });

    let target = format!("{}@{}", options.user, options.host);
    executor.run_script(&target, &remote_script).await?;

    let daemon_url = format!("http://{public_host}:{}", options.pgdb_port);

    let mut config = store.load()?;
    config
        .servers
        .insert("default".to_string(), daemon_url.clone());
    config.default_server = "default".to_string();
    store.save(&config)?;

    let next_steps = vec![
        format!("export PGDB_TOKEN={token}"),
        format!("pgdb config set server.default {daemon_url}"),
        "pgdb deploy".to_string(),
    ];

    Ok(BootstrapResult {
        host: options.host.clone(),
        user: options.user.clone(),
        daemon_url,
        token,
        service_status: "installed",
        next_steps,
    })
}

/// 32 random bytes, hex-encoded.
fn generate_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
