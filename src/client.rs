//! HTTP transport for the DuoDebate API.

use reqwest::Client;

use crate::error::DebateError;
use crate::events::{DebateRequest, DebateResponse, ModelConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct DebateClient {
    client: Client,
    base_url: String,
}

impl DebateClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Opens the SSE stream for a debate run. The caller consumes
    /// `bytes_stream()` from the returned response; dropping it aborts the
    /// transport.
    pub async fn start_debate(
        &self,
        request: &DebateRequest,
    ) -> Result<reqwest::Response, DebateError> {
        let response = self
            .client
            .post(format!("{}/api/debate/stream", self.base_url))
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DebateError::Api { status, body });
        }
        Ok(response)
    }

    /// Non-streaming mode: runs the whole debate server-side and returns the
    /// full transcript in one body.
    pub async fn debate(&self, request: &DebateRequest) -> Result<DebateResponse, DebateError> {
        let response = self
            .client
            .post(format!("{}/api/debate", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DebateError::Api { status, body });
        }
        Ok(response.json().await?)
    }

    /// Liveness probe; any failure reads as "offline".
    pub async fn check_health(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, "health check failed");
                false
            }
        }
    }

    /// Model pairing the backend is configured with; `None` when the
    /// endpoint is unreachable or the body doesn't parse.
    pub async fn get_config(&self) -> Option<ModelConfig> {
        let response = self
            .client
            .get(format!("{}/api/config", self.base_url))
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json().await.ok()
    }
}
