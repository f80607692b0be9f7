//! Language-model capability and its HTTP backends.
//!
//! Agents only see the [`LanguageModel`] trait. [`build_model`] picks the
//! concrete client from [`BackendSettings`] at start-up.

mod chat;
mod ollama;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use elizao_core::{BackendSettings, ModelBackend};

use crate::error::ModelError;

pub use chat::ChatCompletionsClient;
pub use ollama::OllamaClient;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in a model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Text generation backend.
///
/// Calls block until the backend answers or the client timeout fires. There
/// is no retry.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Generates a completion for `messages`.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ModelError>;

    /// Verifies the backend is reachable.
    async fn check(&self) -> Result<(), ModelError>;
}

/// Builds the client selected by `settings`.
///
/// Hosted backends without an API key fail with [`ModelError::Configuration`].
pub fn build_model(settings: &BackendSettings) -> Result<Arc<dyn LanguageModel>, ModelError> {
    let http = http_client(settings.timeout)?;
    let base = settings.base_url.as_str().trim_end_matches('/').to_string();

    let model: Arc<dyn LanguageModel> = match settings.backend {
        ModelBackend::Ollama => Arc::new(OllamaClient::with_client(http, base, &settings.model)),
        ModelBackend::Atoma | ModelBackend::OpenRouter => {
            let key = settings.api_key.clone().ok_or_else(|| {
                ModelError::Configuration(format!(
                    "{} backend requires an API key",
                    settings.backend
                ))
            })?;
            let client = ChatCompletionsClient::with_client(http, base, &settings.model, key);
            match settings.backend {
                ModelBackend::OpenRouter => Arc::new(client.with_title("Elizao")),
                _ => Arc::new(client),
            }
        }
    };
    Ok(model)
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ModelError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ModelError::Configuration(format!("failed to build HTTP client: {}", e)))
}

pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ModelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ModelError::Status {
        status: status.as_u16(),
        body,
    })
}
