//! Hetzner provisioning error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HetznerError {
    #[error("HCLOUD_TOKEN (or HETZNER_TOKEN) is required to create Hetzner infrastructure")]
    MissingToken,

    #[error("--ssh-key-id is required (use an existing Hetzner SSH key id)")]
    MissingSshKeyId,

    #[error("Hetzner API {method} {path} failed ({status}): {body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error(
        "Timed out waiting for server {server_id} to reach running state after {waited_secs}s"
    )]
    ReadinessTimeout { server_id: u64, waited_secs: u64 },

    #[error("Hetzner server was created but no public IPv4 was assigned")]
    NoPublicIpv4,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] pgdb_config::ConfigError),
}

pub type Result<T> = std::result::Result<T, HetznerError>;
