use crate::{AudioClip, ProviderError, SpeechProvider};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[derive(Clone, Debug)]
pub enum GoogleAuth {
    ApiKey(String),
    BearerToken(String),
}

#[derive(Clone, Debug)]
pub struct GoogleTtsConfig {
    pub auth: GoogleAuth,
    pub url: String,
    pub language: String,
    pub voice: Option<String>,
}

#[derive(Clone)]
pub struct GoogleTtsProvider {
    client: Client,
    cfg: GoogleTtsConfig,
}

impl GoogleTtsProvider {
    pub fn new(cfg: GoogleTtsConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssml_gender: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

fn build_request<'a>(cfg: &'a GoogleTtsConfig, text: &'a str) -> SynthesizeRequest<'a> {
    // A named voice pins the speaker; otherwise let the service pick a neutral one.
    let voice = match cfg.voice.as_deref() {
        Some(name) => VoiceSelection {
            language_code: &cfg.language,
            name: Some(name),
            ssml_gender: None,
        },
        None => VoiceSelection {
            language_code: &cfg.language,
            name: None,
            ssml_gender: Some("NEUTRAL"),
        },
    };
    SynthesizeRequest {
        input: SynthesisInput { text },
        voice,
        audio_config: AudioConfig {
            audio_encoding: "MP3",
        },
    }
}

#[async_trait::async_trait]
impl SpeechProvider for GoogleTtsProvider {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        let body = build_request(&self.cfg, text);
        debug!(language = %self.cfg.language, chars = text.chars().count(), "tts request");

        let mut builder = self.client.post(&self.cfg.url).json(&body);
        builder = match &self.cfg.auth {
            GoogleAuth::ApiKey(key) => builder.query(&[("key", key)]),
            GoogleAuth::BearerToken(token) => builder.bearer_auth(token),
        };
        let resp = builder.send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let parsed: SynthesizeResponse = resp.json().await?;
        let base64 = parsed
            .audio_content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("missing audioContent".into()))?;
        Ok(AudioClip {
            mime: "audio/mp3".to_string(),
            base64,
        })
    }
}
