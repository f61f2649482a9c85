//! Loading uploaded documents from disk.
//!
//! Plain text and Markdown are read as (lossy) UTF-8. PDF text comes from
//! the pdf-extract crate; the document info dictionary, read with lopdf,
//! supplies title, author and creation-year hints.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::{DocumentHints, UploadInput};
use crate::utils::{validate_upload_filename, ValidationError};

/// Errors that can occur while reading an upload
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("File not found or not readable: {0}")]
    InvalidFile(String),

    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn creation_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:19|20)\d{2}").expect("valid regex"))
}

fn author_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[;,]").expect("valid regex"))
}

/// Read `path` into an [`UploadInput`]
pub fn load_document(path: &Path) -> Result<UploadInput, DocumentError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = validate_upload_filename(&filename)?;

    if !path.is_file() {
        return Err(DocumentError::InvalidFile(path.display().to_string()));
    }

    let (text, hints) = match extension.as_str() {
        "pdf" => {
            let text = pdf_extract::extract_text(path)
                .map_err(|e| DocumentError::ExtractionFailed(e.to_string()))?;
            (text, pdf_hints(path))
        }
        _ => {
            let bytes = std::fs::read(path)?;
            (String::from_utf8_lossy(&bytes).into_owned(), DocumentHints::default())
        }
    };

    tracing::debug!("Loaded {} chars from {}", text.len(), filename);
    Ok(UploadInput {
        text,
        filename,
        hints,
    })
}

/// Title, authors and year from the PDF info dictionary, when present
fn pdf_hints(path: &Path) -> DocumentHints {
    let document = match lopdf::Document::load(path) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!("No PDF metadata for {}: {}", path.display(), e);
            return DocumentHints::default();
        }
    };

    let info = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| match obj.as_reference() {
            Ok(id) => document.get_dictionary(id).ok(),
            Err(_) => obj.as_dict().ok(),
        });
    let Some(info) = info else {
        return DocumentHints::default();
    };

    let field = |key: &[u8]| -> Option<String> {
        let bytes = info.get(key).ok()?.as_str().ok()?;
        let text = decode_pdf_string(bytes).trim().to_string();
        (!text.is_empty()).then_some(text)
    };

    hints_from_info(field(b"Title"), field(b"Author"), field(b"CreationDate"))
}

fn hints_from_info(
    title: Option<String>,
    author: Option<String>,
    creation_date: Option<String>,
) -> DocumentHints {
    let authors = author
        .map(|a| {
            author_separator()
                .split(&a)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let year = creation_date
        .as_deref()
        .and_then(|d| creation_year().find(d))
        .and_then(|m| m.as_str().parse().ok());

    DocumentHints {
        title,
        authors,
        year,
    }
}

/// PDF text strings are UTF-16BE when they start with a byte-order mark
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
