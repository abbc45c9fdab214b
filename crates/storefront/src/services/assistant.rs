//! Design assistant client.
//!
//! Relays a design session's message log to the hosted assistant and returns
//! its reply. The assistant answers in the session's language.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use aurelia_core::MessageRole;

use crate::config::AssistantConfig;
use crate::models::design::DesignMessage;

/// Errors from the assistant client.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP transport failure.
    #[error("assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Assistant rejected the request.
    #[error("assistant error ({status}): {message}")]
    Upstream {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The assistant returned no reply content.
    #[error("assistant returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    language: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

/// Hosted design assistant API client.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AssistantClient {
    /// Create a new assistant client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_key.expose_secret()
        ))
        .expect("Invalid API key for header");
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(AssistantClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Send the session history and get the assistant's next reply.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::Upstream` if the assistant rejects the
    /// request, `EmptyReply` if it answers with no content.
    #[instrument(skip(self, history), fields(messages = history.len()))]
    pub async fn reply(
        &self,
        language: &str,
        history: &[DesignMessage],
    ) -> Result<String, AssistantError> {
        let request = ChatRequest {
            language,
            messages: history
                .iter()
                .map(|m| ChatMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
        };

        let response = self
            .inner
            .client
            .post(format!("{}/chat", self.inner.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream { status, message });
        }

        let body: ChatResponse = response.json().await?;
        if body.reply.trim().is_empty() {
            return Err(AssistantError::EmptyReply);
        }
        Ok(body.reply)
    }
}
