use crate::analysis::{AnalysisResult, Field};
use crate::analyzer::{AnalyzeError, Analyzer};
use crate::merger::MergedResult;
use tracing::info;

pub const TRUNCATION_MARKER: &str = "\n…[truncated]";

/// Keeps the first `cap` chars of `text`, marking the cut when one happens.
pub fn cap_field(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}

pub fn refine_prompt(merged: &MergedResult, field_cap: usize) -> String {
    let capped = |field: Field| cap_field(merged.get(field), field_cap);
    format!(
        "The following are partial analyses of consecutive sections of one long investment memo. \
         Consolidate them into a single coherent analysis: remove duplication, reconcile \
         conflicting figures, and keep the most decision-relevant details.\n\n\
         Partial executive summaries:\n{summary}\n\n\
         Partial financial analyses:\n{financial}\n\n\
         Partial risks and opportunities:\n{risks}\n\n\
         Partial audio scripts:\n{audio}\n\n\
         Requirements:\n\
         - executive_summary: 3-5 sentences covering the whole memo.\n\
         - financial_analysis: key figures, growth, profitability and financial risks in one narrative.\n\
         - risks_opportunities: a deduplicated bullet list, each line starting with \"- Risk:\" or \"- Opportunity:\".\n\
         - audio_script: a 60-90 second spoken summary (about 150-220 words) for a busy executive.\n\
         - Respond with JSON only, no prose or code fences, with exactly the keys \
         executive_summary, financial_analysis, risks_opportunities, audio_script.",
        summary = capped(Field::ExecutiveSummary),
        financial = capped(Field::FinancialAnalysis),
        risks = capped(Field::RisksOpportunities),
        audio = capped(Field::AudioScript),
    )
}

/// Sends the capped merge back through the analyzer for consolidation. The
/// analyzer's result is returned as-is.
pub async fn refine(
    analyzer: &dyn Analyzer,
    merged: &MergedResult,
    field_cap: usize,
) -> Result<AnalysisResult, AnalyzeError> {
    let prompt = refine_prompt(merged, field_cap);
    info!(prompt_chars = prompt.chars().count(), "refining merged analysis");
    analyzer.analyze_unit(&prompt).await
}
