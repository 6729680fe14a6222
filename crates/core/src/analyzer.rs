use crate::analysis::AnalysisResult;
use crate::parse;
use providers::{LlmProvider, ProviderError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const SYSTEM_PROMPT: &str = "Act as an institutional-grade investment analyst and portfolio manager. \
Deliver rigorous, decision-ready research and portfolio guidance grounded in transparent assumptions, \
repeatable process, and quantitative rigor.";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("could not extract any analysis fields from the provider reply: {0}")]
    Unparsable(String),
}

/// Analyzes one unit of text: the whole memo, one chunk, or a refine prompt.
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze_unit(&self, text: &str) -> Result<AnalysisResult, AnalyzeError>;
}

pub fn user_prompt(text: &str) -> String {
    format!(
        "Analyze the following investment memo and provide the following fields in JSON: \n\n\
         1) executive_summary (2-4 sentences)\n\
         2) financial_analysis (key numbers, growth, profitability, risks)\n\
         3) risks_opportunities (bullet points)\n\
         4) audio_script (a 60-90 second spoken summary for a busy executive).\n\n\
         Memo:\n{text}\n\n\
         Return only valid JSON with keys: executive_summary, financial_analysis, risks_opportunities, audio_script."
    )
}

/// Analyzer backed by a chat provider.
#[derive(Clone)]
pub struct LlmAnalyzer {
    provider: Arc<dyn LlmProvider>,
}

impl LlmAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze_unit(&self, text: &str) -> Result<AnalysisResult, AnalyzeError> {
        debug!(
            model = self.provider.model(),
            chars = text.chars().count(),
            "analyzing unit"
        );
        let reply = self.provider.complete(SYSTEM_PROMPT, &user_prompt(text)).await?;
        parse::parse_reply(&reply).ok_or_else(|| {
            warn!(model = self.provider.model(), "provider reply had no analysis fields");
            AnalyzeError::Unparsable(preview(&reply, 200))
        })
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
