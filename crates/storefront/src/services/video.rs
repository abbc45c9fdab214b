//! Conversational video provider client.
//!
//! Starts a real-time video conversation with the store's presenter replica
//! in the shopper's language and returns the joinable room URL.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::VideoConfig;

/// Errors from the video provider client.
#[derive(Debug, Error)]
pub enum VideoError {
    /// HTTP transport failure.
    #[error("video provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("video provider error ({status}): {message}")]
    Provider {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// A conversation as created on the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub conversation_url: String,
}

#[derive(Debug, Serialize)]
struct CreateConversationRequest<'a> {
    replica_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

/// Video provider API client.
#[derive(Clone)]
pub struct VideoClient {
    inner: Arc<VideoClientInner>,
}

struct VideoClientInner {
    client: reqwest::Client,
    base_url: String,
    replica_id: String,
}

impl VideoClient {
    /// Create a new video provider client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &VideoConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(VideoClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                replica_id: config.replica_id.clone(),
            }),
        }
    }

    /// Start a conversation in the given language.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::Provider` if the provider rejects the request.
    #[instrument(skip(self))]
    pub async fn create_conversation(&self, language: &str) -> Result<Conversation, VideoError> {
        let request = CreateConversationRequest {
            replica_id: &self.inner.replica_id,
            language: Some(language),
        };

        let response = self
            .inner
            .client
            .post(format!("{}/conversations", self.inner.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(VideoError::Provider { status, message });
        }

        Ok(response.json().await?)
    }
}
