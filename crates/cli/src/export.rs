use anyhow::{Context, Result};
use memo_core::render;
use memo_core::AnalysisResult;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
}

/// `.json` exports JSON; any other extension gets Markdown.
pub fn format_for(path: &Path) -> ExportFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
        _ => ExportFormat::Markdown,
    }
}

pub async fn write_export(path: &Path, result: &AnalysisResult) -> Result<()> {
    let body = match format_for(path) {
        ExportFormat::Json => render::to_json(result)?,
        ExportFormat::Markdown => render::to_markdown(result),
    };
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
