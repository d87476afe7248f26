pub mod config;
pub mod deploy;
pub mod destroy;
pub mod infra;
pub mod status;

use pgdb_client::PgdbClient;
use pgdb_config::ConfigStore;

/// Daemon API token, read once per invocation.
fn require_daemon_token() -> anyhow::Result<String> {
    std::env::var("PGDB_TOKEN")
        .map_err(|_| anyhow::anyhow!("PGDB_TOKEN is required in the environment"))
}

/// Resolve the configured server and build an authenticated client for it.
fn daemon_client(server: Option<&str>) -> anyhow::Result<PgdbClient> {
    let token = require_daemon_token()?;
    let config = ConfigStore::open_default()?.load()?;
    let (_alias, url) = config.resolve(server)?;
    Ok(PgdbClient::new(&url, token)?)
}
