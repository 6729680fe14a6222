use providers::{ProviderError, SpeechProvider};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub const MOCK_AUDIO_MESSAGE: &str = "Mock audio generated (Text-to-Speech not configured)";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no text provided for audio generation")]
    EmptyText,
    #[error("audio generation failed: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutcome {
    pub audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Renders `text` (normally the audio script) to a `data:` URL.
pub async fn generate_audio(
    speech: &dyn SpeechProvider,
    text: &str,
) -> Result<AudioOutcome, AudioError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AudioError::EmptyText);
    }
    info!(chars = text.chars().count(), mock = speech.is_mock(), "generating audio");
    let clip = speech.synthesize(text).await?;
    Ok(AudioOutcome {
        audio_url: clip.data_url(),
        message: speech.is_mock().then(|| MOCK_AUDIO_MESSAGE.to_string()),
    })
}
