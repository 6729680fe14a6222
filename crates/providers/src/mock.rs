use crate::{AudioClip, LlmProvider, ProviderError, SpeechProvider};

/// Canned analysis served in mock mode.
pub const MOCK_ANALYSIS: &str = r#"{
  "executive_summary": "This is a mock executive summary for the investment opportunity.",
  "financial_analysis": "Mock financial analysis: Revenue of $10M, 25% growth rate, 15% profit margin.",
  "risks_opportunities": "- Risk: Market volatility\n- Opportunity: Market expansion\n- Risk: Competition",
  "audio_script": "This investment presents a compelling opportunity with strong financials and manageable risks. The company shows consistent growth with a solid market position."
}"#;

/// A short silent WAV clip, base64 encoded.
pub const MOCK_AUDIO_WAV: &str = "UklGRnoGAABXQVZFZm10IBAAAAABAAEAQB8AAEAfAAABAAgAZGF0YQoGAACBhYqFbF1fdJivrJBhNjVgodDbq2EcBj+a2/LDciUFLIHO8tiJNwgZaLvt559NEAxQp+PwtmMcBjiR1/LMeSwFJHfH8N2QQAoUXrTp66hVFApGn+DyvmEaAzKH0O/JciYELYDI7tuNOQYdYrbn7qpbFgxXpuT3u2IcBzKM0fHQdCsELH/L7NmOOgcdY7Dn6KZTEgxPo+T1v2IgAjaJ0/LNeSUEL4DM69qOOQcdYbXn6qpZFgtTpOL0wWMgAzKL0O7OdCwEL4DN6tmPOwkpPo/Ry2w=";

#[derive(Debug, Default, Clone, Copy)]
pub struct MockProvider;

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        Ok(MOCK_ANALYSIS.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockSpeechProvider;

#[async_trait::async_trait]
impl SpeechProvider for MockSpeechProvider {
    fn is_mock(&self) -> bool {
        true
    }

    async fn synthesize(&self, _text: &str) -> Result<AudioClip, ProviderError> {
        Ok(AudioClip {
            mime: "audio/wav".to_string(),
            base64: MOCK_AUDIO_WAV.to_string(),
        })
    }
}
