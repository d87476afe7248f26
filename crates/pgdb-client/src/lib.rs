//! HTTP client for the pgdbd daemon API
//!
//! Bearer-token authenticated JSON requests against the base URL the
//! provisioning commands persisted. Non-success responses surface the HTTP
//! status together with the raw response body; callers decide whether a
//! failure is terminal.

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;

use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Deploys can pull a postgres image on the daemon side, so they get a much
/// longer deadline than the bookkeeping endpoints.
const DEPLOY_TIMEOUT: Duration = Duration::from_secs(90);

/// Client for one pgdbd server.
pub struct PgdbClient {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl PgdbClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Create a database.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployResponse> {
        let url = self.endpoint(&["v1", "deploy"])?;
        tracing::debug!("pgdbd POST {}", url.path());

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .timeout(DEPLOY_TIMEOUT)
            .json(request)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// List all databases the daemon manages.
    pub async fn status(&self) -> Result<StatusResponse> {
        let url = self.endpoint(&["v1", "status"])?;
        tracing::debug!("pgdbd GET {}", url.path());

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Destroy a database, optionally keeping its data volume.
    pub async fn destroy(&self, name: &str, keep_data: bool) -> Result<DestroyResponse> {
        let mut url = self.endpoint(&["v1", "db", name])?;
        url.query_pairs_mut()
            .append_pair("keep_data", if keep_data { "true" } else { "false" });
        tracing::debug!("pgdbd DELETE {}", url.path());

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Join path segments onto the base URL. Segments are percent-encoded,
    /// which is what keeps user-supplied database names path-safe.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
