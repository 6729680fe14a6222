//! Reading memo text from files and uploads.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MemoError {
    #[error("failed to read memo: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported memo format: {0}")]
    Unsupported(String),
    #[error("memo file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
    #[error("memo contains no text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoFormat {
    Text,
    Pdf,
}

fn format_from_name(name: &str) -> Option<MemoFormat> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();
    match ext.as_str() {
        "txt" | "md" | "markdown" | "text" => Some(MemoFormat::Text),
        "pdf" => Some(MemoFormat::Pdf),
        _ => None,
    }
}

/// Content sniffing wins over the file name; names only decide for bytes with
/// no recognizable signature.
pub fn detect_format(name: &str, bytes: &[u8]) -> Result<MemoFormat, MemoError> {
    if let Some(kind) = infer::get(bytes) {
        return match kind.mime_type() {
            "application/pdf" => Ok(MemoFormat::Pdf),
            other if other.starts_with("text/") => Ok(MemoFormat::Text),
            other => Err(MemoError::Unsupported(other.to_string())),
        };
    }
    match format_from_name(name) {
        Some(format) => Ok(format),
        None if std::str::from_utf8(bytes).is_ok() => Ok(MemoFormat::Text),
        None => Err(MemoError::Unsupported(name.to_string())),
    }
}

/// Extracts memo text from an uploaded file's bytes.
pub fn memo_from_bytes(name: &str, bytes: &[u8], limit: usize) -> Result<String, MemoError> {
    if bytes.len() > limit {
        return Err(MemoError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }
    let format = detect_format(name, bytes)?;
    debug!(name, ?format, size = bytes.len(), "extracting memo text");
    let text = match format {
        MemoFormat::Text => String::from_utf8_lossy(bytes).into_owned(),
        MemoFormat::Pdf => pdf_text(bytes)?,
    };
    if text.trim().is_empty() {
        return Err(MemoError::Empty);
    }
    Ok(text)
}

pub async fn load_memo(path: &Path, limit: usize) -> Result<String, MemoError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path.to_string_lossy();
    memo_from_bytes(&name, &bytes, limit)
}

#[cfg(feature = "pdf")]
fn pdf_text(bytes: &[u8]) -> Result<String, MemoError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| MemoError::Pdf(e.to_string()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(_bytes: &[u8]) -> Result<String, MemoError> {
    Err(MemoError::Unsupported(
        "PDF support not compiled in (enable the `pdf` feature)".to_string(),
    ))
}
