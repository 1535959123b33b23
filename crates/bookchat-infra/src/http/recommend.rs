//! HttpRecommendationClient -- concrete [`RecommendationClient`] over HTTP.
//!
//! Sends one JSON POST per query to the configured endpoint:
//! `{"query": "...", "userId": "..."}` in, `{"response": "..."}` out.
//! No authentication header, no streaming, no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use bookchat_core::recommend::client::RecommendationClient;
use bookchat_types::error::RecommendError;
use bookchat_types::identity::UserId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest<'a> {
    query: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    response: String,
}

/// Recommendation backend reached over HTTP.
pub struct HttpRecommendationClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecommendationClient {
    /// Build a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RecommendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecommendError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RecommendationClient for HttpRecommendationClient {
    async fn ask(&self, query: &str, user_id: &UserId) -> Result<String, RecommendError> {
        let body = AskRequest {
            query,
            user_id: user_id.as_str(),
        };

        tracing::debug!(endpoint = %self.endpoint, user_id = %user_id, "Sending recommendation request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RecommendError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecommendError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AskResponse = response
            .json()
            .await
            .map_err(|e| RecommendError::Decode(format!("failed to parse response: {e}")))?;

        Ok(parsed.response)
    }
}
