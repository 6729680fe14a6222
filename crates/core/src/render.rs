use crate::analysis::{AnalysisResult, Field};

pub fn to_markdown(result: &AnalysisResult) -> String {
    let mut out = String::from("# Investment Memo Analysis\n");
    for field in Field::ALL {
        out.push_str("\n## ");
        out.push_str(field.label());
        out.push_str("\n\n");
        out.push_str(result.get(field).trim());
        out.push('\n');
    }
    out
}

pub fn to_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Plain terminal rendering.
pub fn to_text(result: &AnalysisResult) -> String {
    Field::ALL
        .iter()
        .map(|f| format!("{}:\n{}\n", f.label().to_uppercase(), result.get(*f).trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            executive_summary: "Summary.".into(),
            financial_analysis: "Revenue $1M.".into(),
            risks_opportunities: "- Risk: A".into(),
            audio_script: "Listen.".into(),
        }
    }

    #[test]
    fn markdown_has_a_section_per_field_in_order() {
        let md = to_markdown(&sample());
        let positions: Vec<usize> = Field::ALL
            .iter()
            .map(|f| md.find(&format!("## {}", f.label())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(md.contains("## Risks & Opportunities\n\n- Risk: A\n"));
    }

    #[test]
    fn json_round_trips() {
        let json = to_json(&sample()).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn text_uses_uppercase_headings() {
        assert!(to_text(&sample()).starts_with("EXECUTIVE SUMMARY:\nSummary.\n"));
    }
}
