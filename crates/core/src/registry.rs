use crate::analyzer::LlmAnalyzer;
use crate::config::{AnalysisOptions, AppConfig};
use crate::pipeline::Pipeline;
use providers::anthropic::{AnthropicConfig, AnthropicProvider};
use providers::google_tts::{GoogleAuth, GoogleTtsConfig, GoogleTtsProvider, GOOGLE_TTS_URL};
use providers::mock::{MockProvider, MockSpeechProvider};
use providers::openai::{OpenAiCompatProvider, OpenAiConfig};
use providers::{ProviderError, ProviderRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const ANTHROPIC: &str = "anthropic";
pub const GROQ: &str = "groq";
pub const XAI: &str = "xai";
pub const MOCK: &str = "mock";

/// Preference order when nothing is requested explicitly.
pub const PRIORITY: [&str; 3] = [ANTHROPIC, GROQ, XAI];

/// Provider-related environment, captured once so construction is testable.
#[derive(Debug, Clone, Default)]
pub struct ProviderEnv {
    pub anthropic_key: Option<String>,
    pub groq_key: Option<String>,
    pub xai_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub groq_model: Option<String>,
    pub xai_model: Option<String>,
    pub provider: Option<String>,
    pub use_mock: bool,
    pub tts_api_key: Option<String>,
    pub tts_access_token: Option<String>,
    pub tts_language: Option<String>,
    pub tts_voice: Option<String>,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderEnv {
    pub fn from_env() -> Self {
        Self {
            anthropic_key: env_value("ANTHROPIC_API_KEY"),
            groq_key: env_value("GROQ_API_KEY"),
            xai_key: env_value("XAI_API_KEY"),
            anthropic_model: env_value("ANTHROPIC_MODEL"),
            groq_model: env_value("GROQ_MODEL"),
            xai_model: env_value("XAI_MODEL"),
            provider: env_value("PROVIDER").map(|p| p.to_lowercase()),
            use_mock: env_value("USE_MOCK").as_deref() == Some("true"),
            tts_api_key: env_value("GOOGLE_TTS_API_KEY"),
            tts_access_token: env_value("GOOGLE_TTS_ACCESS_TOKEN"),
            tts_language: env_value("GOOGLE_TTS_LANGUAGE"),
            tts_voice: env_value("GOOGLE_TTS_VOICE"),
        }
    }

    pub fn key_for(&self, name: &str) -> Option<&str> {
        match name {
            ANTHROPIC => self.anthropic_key.as_deref(),
            GROQ => self.groq_key.as_deref(),
            XAI => self.xai_key.as_deref(),
            _ => None,
        }
    }

    pub fn any_llm_key(&self) -> bool {
        PRIORITY.iter().any(|name| self.key_for(name).is_some())
    }

    /// Mock mode: forced, or nothing real to talk to.
    pub fn mock_mode(&self) -> bool {
        self.use_mock || !self.any_llm_key()
    }

    pub fn tts_configured(&self) -> bool {
        self.tts_api_key.is_some() || self.tts_access_token.is_some()
    }
}

/// The provider analysis requests go to: an explicit request, else `PROVIDER`,
/// else the config preference, else the first configured one by priority.
pub fn active_provider(env: &ProviderEnv, config: &AppConfig) -> Option<String> {
    if env.mock_mode() {
        return Some(MOCK.to_string());
    }
    if let Some(requested) = env.provider.clone().or_else(|| config.provider.preferred.clone()) {
        return Some(requested);
    }
    PRIORITY
        .iter()
        .find(|name| env.key_for(name).is_some())
        .map(|name| name.to_string())
}

pub fn build_registry(config: &AppConfig, env: &ProviderEnv) -> anyhow::Result<ProviderRegistry> {
    let timeout = config.provider.request_timeout_secs.map(Duration::from_secs);
    let mut reg = ProviderRegistry::new();

    if env.mock_mode() {
        warn!(forced = env.use_mock, "mock mode: serving canned analysis");
        reg = reg.with_llm(MOCK, Arc::new(MockProvider));
    } else {
        if let Some(key) = &env.anthropic_key {
            let mut cfg = AnthropicConfig::new(key.clone(), env.anthropic_model.clone());
            cfg.max_tokens = config.provider.max_tokens;
            cfg.timeout = timeout;
            reg = reg.with_llm(ANTHROPIC, Arc::new(AnthropicProvider::new(cfg)?));
        }
        if let Some(key) = &env.groq_key {
            let mut cfg = OpenAiConfig::groq(key.clone(), env.groq_model.clone());
            cfg.temperature = config.provider.temperature;
            cfg.timeout = timeout;
            reg = reg.with_llm(GROQ, Arc::new(OpenAiCompatProvider::new(cfg)?));
        }
        if let Some(key) = &env.xai_key {
            let mut cfg = OpenAiConfig::xai(key.clone(), env.xai_model.clone());
            cfg.temperature = config.provider.temperature;
            cfg.timeout = timeout;
            reg = reg.with_llm(XAI, Arc::new(OpenAiCompatProvider::new(cfg)?));
        }
    }

    if let Some(name) = active_provider(env, config) {
        info!(provider = %name, "active llm provider");
        reg = reg.set_preferred_llm(&name);
    }

    let auth = env
        .tts_api_key
        .clone()
        .map(GoogleAuth::ApiKey)
        .or_else(|| env.tts_access_token.clone().map(GoogleAuth::BearerToken));
    reg = match auth {
        Some(auth) => reg.with_speech(Arc::new(GoogleTtsProvider::new(GoogleTtsConfig {
            auth,
            url: GOOGLE_TTS_URL.to_string(),
            language: env
                .tts_language
                .clone()
                .unwrap_or_else(|| config.tts.language.clone()),
            voice: env.tts_voice.clone().or_else(|| config.tts.voice.clone()),
        }))),
        None => {
            info!("text-to-speech not configured, using mock audio");
            reg.with_speech(Arc::new(MockSpeechProvider))
        }
    };

    Ok(reg)
}

/// Pipeline over the named provider, or the registry's preferred one.
pub fn pipeline_for(
    reg: &ProviderRegistry,
    provider: Option<&str>,
    options: AnalysisOptions,
) -> Result<Pipeline, ProviderError> {
    let llm = reg.llm(provider)?;
    Ok(Pipeline::new(Arc::new(LlmAnalyzer::new(llm)), options))
}
