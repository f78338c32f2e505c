//! HTTP client library for the bulksweep server.
//!
//! Provides `SweepClient` for the CLI commands, and the batch scheduler
//! that drives a full deletion operation over it.

mod error;
mod scheduler;

pub use error::{ClientError, Result};
pub use scheduler::{
    BatchScheduler, BatchTransport, SchedulerError, StartGate, SweepOutcome, SweepProgress,
};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::{
    ACTOR_HEADER, ContentTypeSummary, DeleteBatchRequest, DeleteBatchResponse, FindRequest,
    FindResponse, ListLogsResponse, ListTypesResponse, LogEntryResponse, PurgeLogsResponse,
};

/// HTTP client for a bulksweep server.
#[derive(Debug, Clone)]
pub struct SweepClient {
    base_url: String,
    http: Client,
    api_token: Option<String>,
    actor: String,
}

impl SweepClient {
    /// Create a new client pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, api_token: Option<String>, actor: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
            api_token,
            actor: actor.to_string(),
        }
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header(ACTOR_HEADER, &self.actor);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Parse a domain envelope leniently.
    ///
    /// Find and DeleteBatch carry their own success flags and may arrive
    /// with a non-2xx status while still being fully informative, so the
    /// body is parsed regardless of status; only an unparseable body
    /// becomes an API error.
    async fn envelope<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|_| ClientError::ApiError {
            status,
            message: body,
        })
    }

    /// Check that the server is up. Calls GET /readyz.
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/readyz", self.base_url);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::ServerUnhealthy {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    /// List deletable content types with their taxonomies.
    pub async fn list_types(&self) -> Result<Vec<ContentTypeSummary>> {
        let url = format!("{}/api/v1/types", self.base_url);
        let response = self.decorate(self.http.get(&url)).send().await?;
        let body: ListTypesResponse = self.envelope(response).await?;
        Ok(body.types)
    }

    /// Resolve selection criteria into a target set server-side.
    pub async fn find(&self, request: &FindRequest) -> Result<FindResponse> {
        let url = format!("{}/api/v1/find", self.base_url);
        let response = self.decorate(self.http.post(&url)).json(request).send().await?;
        self.envelope(response).await
    }

    /// Dispatch one deletion batch.
    pub async fn delete_batch(&self, ids: &[u64], is_last_batch: bool) -> Result<DeleteBatchResponse> {
        let url = format!("{}/api/v1/delete-batch", self.base_url);
        let request = DeleteBatchRequest {
            ids: ids.to_vec(),
            is_last_batch,
        };
        let response = self.decorate(self.http.post(&url)).json(&request).send().await?;
        self.envelope(response).await
    }

    /// List activity log entries, newest first.
    pub async fn list_logs(
        &self,
        action: Option<&str>,
        status: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntryResponse>> {
        let url = format!("{}/api/v1/logs", self.base_url);
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(action) = action {
            query.push(("action", action.to_string()));
        }
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .decorate(self.http.get(&url))
            .query(&query)
            .send()
            .await?;
        let body: ListLogsResponse = self.envelope(response).await?;
        Ok(body.entries)
    }

    /// Run the retention sweep now. Returns the number of entries removed.
    pub async fn purge_logs(&self) -> Result<usize> {
        let url = format!("{}/api/admin/v1/logs/purge", self.base_url);
        let response = self.decorate(self.http.post(&url)).send().await?;
        let body: PurgeLogsResponse = self.envelope(response).await?;
        Ok(body.removed)
    }
}
