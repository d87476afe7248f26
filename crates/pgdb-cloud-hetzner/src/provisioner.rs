//! Provisioning orchestration
//!
//! Drives the strict create-firewall → create-volume → create-server
//! sequence, waits for the server to report `running`, derives the daemon
//! URL from its public address and persists it under the `default` alias.
//!
//! Resources created before a failing step are left in place; the provider
//! is the system of record and cleanup is an operator decision.

use crate::api::{
    CreateFirewallRequest, CreateServerRequest, CreateVolumeRequest, FirewallRef, FirewallRule,
    HcloudClient, Server,
};
use crate::cloud_init::cloud_init;
use crate::error::{HetznerError, Result};
use pgdb_config::ConfigStore;
use serde::Serialize;
use std::time::Duration;

/// Parameters for one provisioning run. Defaults mirror the CLI flags.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Logical name; derived from the current time when absent.
    pub name: Option<String>,
    pub location: String,
    pub server_type: String,
    pub image: String,
    pub volume_size_gb: u32,
    /// Id of an existing Hetzner SSH key. Keys are never created here.
    pub ssh_key_id: Option<i64>,
    pub pgdb_port: u16,
    pub allow_cidr: String,
    pub poll_interval: Duration,
    pub ready_timeout: Duration,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            name: None,
            location: "nbg1".to_string(),
            server_type: "cpx21".to_string(),
            image: "ubuntu-24.04".to_string(),
            volume_size_gb: 20,
            ssh_key_id: None,
            pgdb_port: 8080,
            allow_cidr: "0.0.0.0/0".to_string(),
            poll_interval: Duration::from_secs(2),
            ready_timeout: Duration::from_secs(180),
        }
    }
}

/// Summary of one successful provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionResult {
    pub provider: &'static str,
    pub server: ServerSummary,
    pub volume: VolumeSummary,
    pub firewall: FirewallSummary,
    pub daemon_url: String,
    pub next_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    pub id: u64,
    pub name: String,
    pub ipv4: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeSummary {
    pub id: u64,
    pub name: String,
    pub size_gb: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FirewallSummary {
    pub id: u64,
    pub name: String,
}

/// Resolve the Hetzner API token from the environment, first name wins.
pub fn resolve_api_token() -> Result<String> {
    std::env::var("HCLOUD_TOKEN")
        .or_else(|_| std::env::var("HETZNER_TOKEN"))
        .map_err(|_| HetznerError::MissingToken)
}

/// Create firewall, volume and server, wait for readiness and persist the
/// derived daemon URL under the `default` alias.
pub async fn provision(
    api: &HcloudClient,
    store: &ConfigStore,
    options: &ProvisionOptions,
) -> Result<ProvisionResult> {
    let ssh_key_id = match options.ssh_key_id {
        Some(id) if id > 0 => id as u64,
        _ => return Err(HetznerError::MissingSshKeyId),
    };

    let name = options.name.clone().unwrap_or_else(default_name);

    let firewall = api
        .create_firewall(&CreateFirewallRequest {
            name: format!("{name}-fw"),
            rules: vec![
                FirewallRule::ingress_tcp(22, &options.allow_cidr, "SSH"),
                FirewallRule::ingress_tcp(options.pgdb_port, &options.allow_cidr, "pgdbd API"),
            ],
        })
        .await?;
    tracing::info!("created firewall {} (id {})", firewall.name, firewall.id);

    let volume = api
        .create_volume(&CreateVolumeRequest {
            name: format!("{name}-data"),
            size: options.volume_size_gb,
            location: options.location.clone(),
            format: "ext4".to_string(),
            automount: true,
        })
        .await?;
    tracing::info!("created volume {} (id {})", volume.name, volume.id);

    let server = api
        .create_server(&CreateServerRequest {
            name: name.clone(),
            server_type: options.server_type.clone(),
            image: options.image.clone(),
            location: options.location.clone(),
            ssh_keys: vec![ssh_key_id],
            firewalls: vec![FirewallRef {
                firewall: firewall.id,
            }],
            volumes: vec![volume.id],
            user_data: cloud_init(options.pgdb_port),
        })
        .await?;
    tracing::info!("created server {} (id {}), waiting for it to boot", server.name, server.id);

    let ready = wait_for_server_running(
        api,
        server.id,
        options.poll_interval,
        options.ready_timeout,
    )
    .await?;

    let ip = ready
        .public_ipv4()
        .ok_or(HetznerError::NoPublicIpv4)?
        .to_string();

    let daemon_url = format!("http://{ip}:{}", options.pgdb_port);

    let mut config = store.load()?;
    config
        .servers
        .insert("default".to_string(), daemon_url.clone());
    config.default_server = "default".to_string();
    store.save(&config)?;

    let next_steps = vec![
        format!("ssh root@{ip}"),
        "Set a strong token on the server: export PGDB_TOKEN=$(openssl rand -hex 32)".to_string(),
        format!(
            "Set daemon host/port: export PGDB_PUBLIC_HOST={ip} && export PGDB_LISTEN=:{}",
            options.pgdb_port
        ),
        "Clone this repository on the server and run: sudo -E ./scripts/install.sh".to_string(),
        "On your local machine set the same token: export PGDB_TOKEN=<same-token>".to_string(),
        "Then run: pgdb deploy".to_string(),
    ];

    Ok(ProvisionResult {
        provider: "hetzner",
        server: ServerSummary {
            id: ready.id,
            name: ready.name.clone(),
            ipv4: ip,
            status: ready.status.clone(),
        },
        volume: VolumeSummary {
            id: volume.id,
            name: volume.name.clone(),
            size_gb: volume.size,
        },
        firewall: FirewallSummary {
            id: firewall.id,
            name: firewall.name.clone(),
        },
        daemon_url,
        next_steps,
    })
}

/// Poll the server at a fixed interval until it reports `running`.
///
/// `pending → running` is terminal success; exceeding the deadline is a
/// distinct timeout error so operators can tell a slow boot from an API
/// failure. Boot latency is provider-bounded, so there is no backoff.
async fn wait_for_server_running(
    api: &HcloudClient,
    server_id: u64,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<Server> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < timeout {
        let server = api.get_server(server_id).await?;
        if server.is_running() {
            return Ok(server);
        }
        tokio::time::sleep(poll_interval).await;
    }

    Err(HetznerError::ReadinessTimeout {
        server_id,
        waited_secs: timeout.as_secs(),
    })
}

/// Time-derived default resource name, e.g. `pgdb-m2jb0a1k`.
fn default_name() -> String {
    format!("pgdb-{}", to_base36(chrono::Utc::now().timestamp_millis() as u64))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}
