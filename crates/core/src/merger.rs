use crate::analysis::{is_absent, AnalysisResult, Field};

pub const MERGE_SEPARATOR: &str = "\n\n";

/// Field-wise concatenation of per-chunk results, fed to the refine pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedResult(AnalysisResult);

impl MergedResult {
    pub fn get(&self, field: Field) -> &str {
        self.0.get(field)
    }

    pub fn into_inner(self) -> AnalysisResult {
        self.0
    }
}

/// Joins each field across `partials` in order, skipping blank values and the
/// "not available" sentinel. No deduplication happens here.
pub fn merge(partials: &[AnalysisResult]) -> MergedResult {
    let mut merged = AnalysisResult::default();
    for field in Field::ALL {
        let joined = partials
            .iter()
            .map(|p| p.get(field).trim())
            .filter(|v| !is_absent(v))
            .collect::<Vec<_>>()
            .join(MERGE_SEPARATOR);
        merged.set(field, joined);
    }
    MergedResult(merged)
}
