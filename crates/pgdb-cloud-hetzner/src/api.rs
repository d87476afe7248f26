//! Hetzner Cloud API client
//!
//! A thin authenticated JSON client over the resource endpoints the
//! provisioner needs: firewalls, volumes and servers. Every call goes
//! through one generic request helper; there are no retries, callers decide
//! whether a failure is terminal.

use crate::error::{HetznerError, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const HCLOUD_API_BASE: &str = "https://api.hetzner.cloud/v1";

/// Authenticated Hetzner Cloud API client.
pub struct HcloudClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HcloudClient {
    /// Client against the public API. The token is passed in explicitly;
    /// resolving it from the environment is the caller's concern.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, HCLOUD_API_BASE)
    }

    /// Client against an alternative endpoint. Tests point this at an
    /// in-process stub.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Issue one authenticated JSON request and decode the response.
    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("hcloud {} {}", method, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(HetznerError::Api {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    pub async fn create_firewall(&self, request: &CreateFirewallRequest) -> Result<Firewall> {
        let response: FirewallResponse = self
            .request(Method::POST, "/firewalls", Some(request))
            .await?;
        Ok(response.firewall)
    }

    pub async fn create_volume(&self, request: &CreateVolumeRequest) -> Result<Volume> {
        let response: VolumeResponse = self.request(Method::POST, "/volumes", Some(request)).await?;
        Ok(response.volume)
    }

    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<Server> {
        let response: ServerResponse = self.request(Method::POST, "/servers", Some(request)).await?;
        Ok(response.server)
    }

    pub async fn get_server(&self, id: u64) -> Result<Server> {
        let response: ServerResponse = self
            .request(Method::GET, &format!("/servers/{id}"), None::<&()>)
            .await?;
        Ok(response.server)
    }
}

// ============ API Types ============

#[derive(Debug, Serialize)]
pub struct CreateFirewallRequest {
    pub name: String,
    pub rules: Vec<FirewallRule>,
}

#[derive(Debug, Serialize)]
pub struct FirewallRule {
    pub direction: String,
    pub protocol: String,
    pub port: String,
    pub source_ips: Vec<String>,
    pub description: String,
}

impl FirewallRule {
    /// Ingress TCP rule for one port, scoped to a source CIDR.
    pub fn ingress_tcp(port: u16, source_cidr: &str, description: &str) -> Self {
        Self {
            direction: "in".to_string(),
            protocol: "tcp".to_string(),
            port: port.to_string(),
            source_ips: vec![source_cidr.to_string()],
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FirewallResponse {
    firewall: Firewall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Firewall {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateVolumeRequest {
    pub name: String,
    pub size: u32,
    pub location: String,
    pub format: String,
    pub automount: bool,
}

#[derive(Debug, Deserialize)]
struct VolumeResponse {
    volume: Volume,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub id: u64,
    pub name: String,
    pub size: u32,
}

#[derive(Debug, Serialize)]
pub struct CreateServerRequest {
    pub name: String,
    pub server_type: String,
    pub image: String,
    pub location: String,
    pub ssh_keys: Vec<u64>,
    pub firewalls: Vec<FirewallRef>,
    pub volumes: Vec<u64>,
    pub user_data: String,
}

#[derive(Debug, Serialize)]
pub struct FirewallRef {
    pub firewall: u64,
}

#[derive(Debug, Deserialize)]
struct ServerResponse {
    server: Server,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub public_net: Option<PublicNet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublicNet {
    pub ipv4: Option<Ipv4Info>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ipv4Info {
    pub ip: String,
}

impl Server {
    /// Assigned public IPv4 address, if the provider reported one.
    pub fn public_ipv4(&self) -> Option<&str> {
        Some(self.public_net.as_ref()?.ipv4.as_ref()?.ip.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}
