use crate::{LlmProvider, ProviderError};
use bytes::Bytes;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Option<Duration>,
}

impl AnthropicConfig {
    pub fn new(api_key: String, model: Option<String>) -> Self {
        Self {
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: model.unwrap_or_else(|| ANTHROPIC_DEFAULT_MODEL.to_string()),
            max_tokens: 1200,
            timeout: None,
        }
    }
}

#[derive(Clone)]
pub struct AnthropicProvider {
    client: Client,
    cfg: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(cfg: AnthropicConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            cfg,
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn model(&self) -> &str {
        &self.cfg.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.cfg.base_url.trim_end_matches('/'));

        // The messages API takes the system prompt as a top-level field.
        let body = json!({
            "model": self.cfg.model,
            "max_tokens": self.cfg.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user }],
        });

        debug!(%url, model = %self.cfg.model, "anthropic request");

        let resp = self
            .client
            .post(url)
            .header("x-api-key", &self.cfg.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
        parse_messages_response(&value)
    }
}

fn parse_messages_response(value: &serde_json::Value) -> Result<String, ProviderError> {
    if value["type"] == "error" || value.get("error").is_some() {
        let message = value["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| value["error"].to_string());
        return Err(ProviderError::Api(message));
    }
    Ok(value["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string())
}
