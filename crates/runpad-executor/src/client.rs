//! HTTP execution client.

use async_trait::async_trait;
use reqwest::Client;
use runpad_core::{ExecutionResult, Executor, ExecutorError, RunRequest, RunpadConfig};

use crate::protocol::RunResponse;

/// Executor that POSTs submissions to a fixed remote endpoint.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http: Client,
    endpoint: String,
}

impl HttpExecutor {
    /// Create a client for `endpoint` using the transport's default timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ExecutorError> {
        Self::with_client(Client::builder(), endpoint)
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn from_config(config: &RunpadConfig) -> Result<Self, ExecutorError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder, config.endpoint.clone())
    }

    fn with_client(
        builder: reqwest::ClientBuilder,
        endpoint: impl Into<String>,
    ) -> Result<Self, ExecutorError> {
        let http = builder
            .build()
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint runs are submitted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn run(&self, request: &RunRequest) -> Result<ExecutionResult, ExecutorError> {
        tracing::debug!(endpoint = %self.endpoint, bytes = request.code.len(), "submitting run");

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExecutorError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ExecutorError::Transport(e.to_string()))?;
        let parsed: RunResponse =
            serde_json::from_slice(&body).map_err(|e| ExecutorError::Decode(e.to_string()))?;

        Ok(parsed.into())
    }
}
