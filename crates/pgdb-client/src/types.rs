//! Request and response shapes of the pgdbd HTTP API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployResponse {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
    pub database_url: String,
    pub created_at: String,
    pub postgres_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusItem {
    pub name: String,
    pub container_id: String,
    pub volume_name: String,
    pub host: String,
    pub host_port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
    pub created_at: String,
    pub postgres_version: String,
    pub database_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub items: Vec<StatusItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestroyResponse {
    pub ok: bool,
}
