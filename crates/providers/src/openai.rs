use crate::{LlmProvider, ProviderError};
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
pub const XAI_BASE_URL: &str = "https://api.x.ai";
pub const XAI_DEFAULT_MODEL: &str = "grok-2-latest";

/// Settings for any endpoint speaking the OpenAI chat completions dialect
/// (Groq and xAI both do).
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    pub fn groq(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            base_url: GROQ_BASE_URL.to_string(),
            chat_model: model.unwrap_or_else(|| GROQ_DEFAULT_MODEL.to_string()),
            temperature: 0.7,
            timeout: None,
        }
    }

    pub fn xai(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            base_url: XAI_BASE_URL.to_string(),
            chat_model: model.unwrap_or_else(|| XAI_DEFAULT_MODEL.to_string()),
            temperature: 0.7,
            timeout: None,
        }
    }
}

#[derive(Clone)]
pub struct OpenAiCompatProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiCompatProvider {
    pub fn new(cfg: OpenAiConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            cfg: Arc::new(cfg),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.cfg.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessageResp,
}

#[derive(Deserialize)]
struct ChatMessageResp {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn model(&self) -> &str {
        &self.cfg.chat_model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        #[derive(serde::Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
        }

        let body = ChatRequest {
            model: &self.cfg.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.cfg.temperature,
        };

        let url = self.endpoint();
        debug!(%url, model = %self.cfg.chat_model, "chat completion request");

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let value: serde_json::Value = resp.json().await?;
        parse_chat_response(value)
    }
}

fn parse_chat_response(value: serde_json::Value) -> Result<String, ProviderError> {
    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(ProviderError::Api(message));
    }
    let parsed: ChatApiResponse = serde_json::from_value(value)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
