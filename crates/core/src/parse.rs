//! Turning a provider reply into analysis fields.
//!
//! Replies are supposed to be a bare JSON object but frequently arrive wrapped
//! in prose or markdown fences, or as plain headed sections. Each strategy
//! below is tried in order and the first one that yields at least one field
//! wins.

use crate::analysis::{AnalysisResult, Field};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

pub type Fields = HashMap<Field, String>;

pub type Strategy = fn(&str) -> Option<Fields>;

/// Parser strategies in the order they are attempted.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("strict", parse_strict),
    ("brace_substring", parse_brace_substring),
    ("headings", parse_headings),
];

/// Runs the strategies over `reply`; `None` when nothing could be extracted.
pub fn parse_reply(reply: &str) -> Option<AnalysisResult> {
    for (name, strategy) in STRATEGIES {
        if let Some(mut fields) = strategy(reply) {
            debug!(strategy = *name, fields = fields.len(), "parsed provider reply");
            return Some(AnalysisResult::from_fields(|f| fields.remove(&f)));
        }
    }
    None
}

/// Parses the whole reply as JSON, after removing a surrounding code fence.
pub fn parse_strict(reply: &str) -> Option<Fields> {
    let value: Value = serde_json::from_str(strip_fence(reply)).ok()?;
    fields_from_json(&value)
}

/// Strips a reply of the form ```` ```json ... ``` ```` down to its body.
fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // the opening fence line may carry a language tag
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses the span from the first `{` to the last `}`.
pub fn parse_brace_substring(reply: &str) -> Option<Fields> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    let value: Value = serde_json::from_str(&reply[start..=end]).ok()?;
    fields_from_json(&value)
}

fn fields_from_json(value: &Value) -> Option<Fields> {
    let obj = value.as_object()?;
    let fields: Fields = Field::ALL
        .iter()
        .filter_map(|f| {
            let text = obj.get(f.key()).and_then(render_value)?;
            Some((*f, text))
        })
        .collect();
    non_empty(fields)
}

fn render_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\d+[.)][ \t]*)?(?:\*\*|__)?[ \t]*(executive[ _]summary|financial[ _]analysis|risks_opportunities|risks?[ _]*(?:and|&|/)[ _]*opportunities|audio[ _]script)[ \t]*(?:\*\*|__)?[ \t]*(?::[ \t]*(?:\*\*|__)?|$)",
        )
        .expect("heading pattern is valid")
    })
}

fn field_for_label(label: &str) -> Option<Field> {
    let lower = label.to_ascii_lowercase();
    if lower.starts_with("exec") {
        Some(Field::ExecutiveSummary)
    } else if lower.starts_with("fin") {
        Some(Field::FinancialAnalysis)
    } else if lower.starts_with("risk") {
        Some(Field::RisksOpportunities)
    } else if lower.starts_with("audio") {
        Some(Field::AudioScript)
    } else {
        None
    }
}

/// Splits the reply at lines that start with one of the four field headings.
/// The text between two headings belongs to the first; a repeated heading
/// keeps its first non-empty section.
pub fn parse_headings(reply: &str) -> Option<Fields> {
    let re = heading_regex();
    let marks: Vec<(Field, usize, usize)> = re
        .captures_iter(reply)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let field = field_for_label(caps.get(1)?.as_str())?;
            Some((field, whole.start(), whole.end()))
        })
        .collect();

    let mut fields = Fields::new();
    for (i, (field, _, body_start)) in marks.iter().enumerate() {
        let body_end = marks.get(i + 1).map(|m| m.1).unwrap_or(reply.len());
        let body = reply[*body_start..body_end].trim();
        if body.is_empty() || fields.contains_key(field) {
            continue;
        }
        fields.insert(*field, body.to_string());
    }
    non_empty(fields)
}

fn non_empty(fields: Fields) -> Option<Fields> {
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NOT_AVAILABLE;

    const FULL: &str = r#"{"executive_summary":"S","financial_analysis":"F","risks_opportunities":"R","audio_script":"A"}"#;

    #[test]
    fn strict_json_parses() {
        let result = parse_reply(FULL).unwrap();
        assert_eq!(result.executive_summary, "S");
        assert_eq!(result.audio_script, "A");
    }

    #[test]
    fn fenced_json_falls_back_to_brace_substring() {
        let reply = format!("Here is the analysis:\n```json\n{FULL}\n```\nLet me know!");
        assert!(parse_strict(&reply).is_none());
        let result = parse_reply(&reply).unwrap();
        assert_eq!(result.financial_analysis, "F");
        assert_eq!(result.risks_opportunities, "R");
    }

    #[test]
    fn bare_fenced_json_parses_strictly() {
        let reply = format!("```json\n{FULL}\n```");
        let fields = parse_strict(&reply).unwrap();
        assert_eq!(fields[&Field::AudioScript], "A");
        let untagged = format!("```\n{FULL}\n```\n");
        assert_eq!(parse_strict(&untagged).unwrap().len(), 4);
        assert_eq!(strip_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn missing_field_becomes_sentinel() {
        let result = parse_reply(r#"{"executive_summary":"only this"}"#).unwrap();
        assert_eq!(result.executive_summary, "only this");
        assert_eq!(result.financial_analysis, NOT_AVAILABLE);
        assert_eq!(result.risks_opportunities, NOT_AVAILABLE);
        assert_eq!(result.audio_script, NOT_AVAILABLE);
    }

    #[test]
    fn arrays_render_one_item_per_line() {
        let reply = r#"{"risks_opportunities":["- Risk: churn","- Opportunity: EU"],"financial_analysis":{"revenue":"$10M"}}"#;
        let result = parse_reply(reply).unwrap();
        assert_eq!(
            result.risks_opportunities,
            "- Risk: churn\n- Opportunity: EU"
        );
        assert_eq!(result.financial_analysis, r#"{"revenue":"$10M"}"#);
    }

    #[test]
    fn headed_sections_are_extracted() {
        let reply = "\
## Executive Summary
Strong team, early revenue.

**Financial Analysis:** Revenue $4M, growing 80% YoY.

Risks & Opportunities:
- Risk: concentration
- Opportunity: upsell

Audio Script: Here is the short version.";
        let result = parse_reply(reply).unwrap();
        assert_eq!(result.executive_summary, "Strong team, early revenue.");
        assert_eq!(result.financial_analysis, "Revenue $4M, growing 80% YoY.");
        assert_eq!(
            result.risks_opportunities,
            "- Risk: concentration\n- Opportunity: upsell"
        );
        assert_eq!(result.audio_script, "Here is the short version.");
    }

    #[test]
    fn heading_words_inside_prose_are_not_headings() {
        let reply = "Executive Summary: Fine.\nThe financial analysis shows growth.";
        let fields = parse_headings(reply).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields[&Field::ExecutiveSummary],
            "Fine.\nThe financial analysis shows growth."
        );
    }

    #[test]
    fn unparsable_reply_yields_none() {
        assert!(parse_reply("I cannot help with that.").is_none());
        assert!(parse_reply(r#"{"unrelated": true}"#).is_none());
        assert!(parse_reply("").is_none());
    }
}
