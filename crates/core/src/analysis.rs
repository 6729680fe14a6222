use serde::{Deserialize, Serialize};

/// Placeholder for a field the provider's reply did not contain.
pub const NOT_AVAILABLE: &str = "Not available";

/// Structured analysis of one text unit (the whole memo, one chunk, or the refine prompt).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub executive_summary: String,
    pub financial_analysis: String,
    pub risks_opportunities: String,
    pub audio_script: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ExecutiveSummary,
    FinancialAnalysis,
    RisksOpportunities,
    AudioScript,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::ExecutiveSummary,
        Field::FinancialAnalysis,
        Field::RisksOpportunities,
        Field::AudioScript,
    ];

    /// JSON key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Field::ExecutiveSummary => "executive_summary",
            Field::FinancialAnalysis => "financial_analysis",
            Field::RisksOpportunities => "risks_opportunities",
            Field::AudioScript => "audio_script",
        }
    }

    /// Human-readable heading.
    pub fn label(self) -> &'static str {
        match self {
            Field::ExecutiveSummary => "Executive Summary",
            Field::FinancialAnalysis => "Financial Analysis",
            Field::RisksOpportunities => "Risks & Opportunities",
            Field::AudioScript => "Audio Script",
        }
    }
}

impl AnalysisResult {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ExecutiveSummary => &self.executive_summary,
            Field::FinancialAnalysis => &self.financial_analysis,
            Field::RisksOpportunities => &self.risks_opportunities,
            Field::AudioScript => &self.audio_script,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::ExecutiveSummary => self.executive_summary = value,
            Field::FinancialAnalysis => self.financial_analysis = value,
            Field::RisksOpportunities => self.risks_opportunities = value,
            Field::AudioScript => self.audio_script = value,
        }
    }

    /// Builds a result from per-field values, substituting [`NOT_AVAILABLE`]
    /// for missing or blank ones.
    pub fn from_fields<F>(mut lookup: F) -> Self
    where
        F: FnMut(Field) -> Option<String>,
    {
        let mut result = AnalysisResult::default();
        for field in Field::ALL {
            let value = lookup(field)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            result.set(field, value);
        }
        result
    }
}

/// True when a field value carries no content: blank or the sentinel.
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == NOT_AVAILABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_fields_fills_sentinel() {
        let result = AnalysisResult::from_fields(|f| match f {
            Field::ExecutiveSummary => Some("  summary ".into()),
            Field::AudioScript => Some("   ".into()),
            _ => None,
        });
        assert_eq!(result.executive_summary, "summary");
        assert_eq!(result.financial_analysis, NOT_AVAILABLE);
        assert_eq!(result.audio_script, NOT_AVAILABLE);
    }

    #[test]
    fn serializes_with_wire_keys() {
        let mut result = AnalysisResult::default();
        for field in Field::ALL {
            result.set(field, field.label().to_string());
        }
        let value = serde_json::to_value(&result).unwrap();
        for field in Field::ALL {
            assert_eq!(value[field.key()], field.label());
        }
    }
}
