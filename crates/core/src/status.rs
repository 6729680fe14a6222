use crate::config::AppConfig;
use crate::registry::{ProviderEnv, ANTHROPIC, GROQ, MOCK, PRIORITY, XAI};
use providers::anthropic::ANTHROPIC_DEFAULT_MODEL;
use providers::openai::{GROQ_DEFAULT_MODEL, XAI_DEFAULT_MODEL};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub mode: String,
    pub mock: MockStatus,
    pub anthropic: LlmStatus,
    pub groq: LlmStatus,
    pub xai: LlmStatus,
    pub tts: TtsStatus,
    pub analysis: crate::config::AnalysisOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct MockStatus {
    pub forced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmStatus {
    pub configured: bool,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TtsStatus {
    pub configured: bool,
    pub language: String,
    pub voice: Option<String>,
}

/// Which keys are present; never the keys themselves.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderKeys {
    pub mock: MockStatus,
    pub keys: KeyPresence,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyPresence {
    pub anthropic: bool,
    pub groq: bool,
    pub xai: bool,
}

/// Provider a status check reports. A requested provider without a key falls
/// through to the first configured one; analysis itself still fails on it.
fn reported_mode(env: &ProviderEnv, config: &AppConfig) -> String {
    if env.mock_mode() {
        return MOCK.to_string();
    }
    env.provider
        .as_deref()
        .or(config.provider.preferred.as_deref())
        .filter(|requested| env.key_for(requested).is_some())
        .or_else(|| {
            PRIORITY
                .iter()
                .copied()
                .find(|name| env.key_for(name).is_some())
        })
        .unwrap_or("unknown")
        .to_string()
}

pub fn status_report(env: &ProviderEnv, config: &AppConfig) -> StatusReport {
    let llm = |name: &str, model: &Option<String>, default: &str| LlmStatus {
        configured: env.key_for(name).is_some(),
        model: model.clone().unwrap_or_else(|| default.to_string()),
    };
    StatusReport {
        mode: reported_mode(env, config),
        mock: MockStatus {
            forced: env.use_mock,
        },
        anthropic: llm(ANTHROPIC, &env.anthropic_model, ANTHROPIC_DEFAULT_MODEL),
        groq: llm(GROQ, &env.groq_model, GROQ_DEFAULT_MODEL),
        xai: llm(XAI, &env.xai_model, XAI_DEFAULT_MODEL),
        tts: TtsStatus {
            configured: env.tts_configured(),
            language: env
                .tts_language
                .clone()
                .unwrap_or_else(|| config.tts.language.clone()),
            voice: env.tts_voice.clone().or_else(|| config.tts.voice.clone()),
        },
        analysis: config.analysis,
    }
}

pub fn provider_keys(env: &ProviderEnv) -> ProviderKeys {
    ProviderKeys {
        mock: MockStatus {
            forced: env.use_mock,
        },
        keys: KeyPresence {
            anthropic: env.anthropic_key.is_some(),
            groq: env.groq_key.is_some(),
            xai: env.xai_key.is_some(),
        },
    }
}
