//! OpenAI-compatible chat completions client (Atoma, OpenRouter).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{error_for_status, ChatMessage, LanguageModel};
use crate::error::ModelError;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Bearer-authenticated `/v1/chat/completions` client.
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    title: Option<String>,
}

impl ChatCompletionsClient {
    /// Creates a client for `base_url` (without trailing slash).
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            title: None,
        }
    }

    /// Sends an `X-Title` header with every request.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.bearer_auth(&self.api_key);
        match &self.title {
            Some(title) => builder.header("X-Title", title),
            None => builder,
        }
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
        };
        trace!(?request, "Sending chat completion request");

        let response = self
            .authorized(
                self.http
                    .post(format!("{}/v1/chat/completions", self.base_url)),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let response = error_for_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::MalformedResponse("no message content in choices".into()))?;

        debug!(model = %self.model, chars = text.len(), "Chat completion received");
        Ok(text)
    }

    async fn check(&self) -> Result<(), ModelError> {
        let response = self
            .authorized(self.http.get(format!("{}/v1/models", self.base_url)))
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        error_for_status(response).await?;
        Ok(())
    }
}
