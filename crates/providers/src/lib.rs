//! Provider abstractions for chat LLMs and text-to-speech.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod anthropic;
pub mod google_tts;
pub mod mock;
pub mod openai;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider error: {0}")]
    Api(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("Requested provider {0} not configured")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::RequestFailed(err.to_string())
    }
}

/// Synthesized audio as returned by a speech provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    pub mime: String,
    /// Base64 encoded audio bytes.
    pub base64: String,
}

impl AudioClip {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Sends one system + user exchange and returns the assistant's reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait SpeechProvider: Send + Sync {
    /// True for providers that return canned audio instead of calling a service.
    fn is_mock(&self) -> bool {
        false
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    llms: HashMap<String, Arc<dyn LlmProvider>>,
    speech: Option<Arc<dyn SpeechProvider>>,
    pub preferred_llm: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(mut self, name: &str, provider: Arc<dyn LlmProvider>) -> Self {
        self.llms.insert(name.to_string(), provider);
        self
    }

    pub fn with_speech(mut self, provider: Arc<dyn SpeechProvider>) -> Self {
        self.speech = Some(provider);
        self
    }

    pub fn set_preferred_llm(mut self, name: &str) -> Self {
        self.preferred_llm = Some(name.to_string());
        self
    }

    /// Names of registered chat providers, sorted.
    pub fn llm_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.llms.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn llm(&self, name: Option<&str>) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_llm.clone())
            .ok_or_else(|| ProviderError::UnknownProvider("no llm provider configured".into()))?;
        self.llms
            .get(&key)
            .cloned()
            .ok_or(ProviderError::NotConfigured(key))
    }

    pub fn speech(&self) -> Result<Arc<dyn SpeechProvider>, ProviderError> {
        self.speech
            .clone()
            .ok_or_else(|| ProviderError::UnknownProvider("no speech provider configured".into()))
    }
}
