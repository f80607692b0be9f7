//! Ollama `/api/generate` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{error_for_status, ChatMessage, ChatRole, LanguageModel};
use crate::error::ModelError;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Creates a client for `base_url` (without trailing slash).
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

/// Flattens a conversation into Ollama's single-prompt form.
pub(crate) fn flatten_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        match message.role {
            ChatRole::System => {
                prompt.push_str(&format!("System: {}\n\n", message.content));
            }
            ChatRole::User => prompt.push_str(&format!("User: {}\n", message.content)),
            ChatRole::Assistant => {
                prompt.push_str(&format!("Assistant: {}\n", message.content));
            }
        }
    }
    prompt.push_str("Assistant: ");
    prompt
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ModelError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: flatten_prompt(messages),
            stream: false,
            options: GenerateOptions { temperature },
        };
        trace!(?request, "Sending Ollama generate request");

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let response = error_for_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        let text = body
            .response
            .ok_or_else(|| ModelError::MalformedResponse("missing 'response' field".into()))?;

        debug!(model = %self.model, chars = text.len(), "Ollama response received");
        Ok(text)
    }

    async fn check(&self) -> Result<(), ModelError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        error_for_status(response).await?;
        Ok(())
    }
}
