use crate::graph::raw::GraphEnvelope;
use crate::graph::validate::{self, MalformedGraphError};
use crate::session::NodeDetail;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Anything that keeps a backend response from becoming usable data. These
/// surface in the UI status line instead of disappearing into a console log.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("fetched graph is malformed: {0}")]
    Malformed(#[from] MalformedGraphError),
    #[error("failed to start client runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Blocking client for the local debugger backend. Each call runs one request
/// to completion on the client's own runtime, so there is never more than one
/// in-flight request per caller.
pub struct DebuggerClient {
    base_url: String,
    http: reqwest::Client,
    runtime: Runtime,
}

impl DebuggerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(DebuggerClient {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sessions(&self) -> Result<Vec<String>, FetchError> {
        self.get_json(&format!("{}/sessions", self.base_url))
    }

    /// Fetches and validates a session's computation graph.
    pub fn session_graph(&self, session: &str) -> Result<GraphEnvelope, FetchError> {
        let envelope: GraphEnvelope =
            self.get_json(&format!("{}/sessions/{session}", self.base_url))?;
        validate::validate(envelope.raw())?;
        Ok(envelope)
    }

    pub fn program_source(&self, session: &str) -> Result<String, FetchError> {
        self.get_text(&format!("{}/programs/{session}", self.base_url))
    }

    pub fn node_data(&self, session: &str, node: usize) -> Result<NodeDetail, FetchError> {
        self.get_json(&format!("{}/sessions/{session}/{node}", self.base_url))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.get_text(url)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "debugger backend request");
        self.runtime.block_on(async {
            let response = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Http {
                    url: url.to_string(),
                    source,
                })?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url, status = status.as_u16(), "backend request rejected");
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().await.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })
        })
    }
}
