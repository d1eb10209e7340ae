//! PDF adapter backed by `pdf-extract`.
//!
//! `pdf-extract` returns the whole document as one string with form feeds
//! (`\x0C`) between pages, so we split on those to recover per-page records
//! and tag each with its page number.

use std::path::Path;

use crate::core::errors::ApiError;

use super::SourceRecord;

pub fn load(path: &Path) -> Result<Vec<SourceRecord>, ApiError> {
    let data = std::fs::read(path)
        .map_err(|e| ApiError::SourceUnavailable(format!("cannot read {}: {e}", path.display())))?;

    let text = pdf_extract::extract_text_from_mem(&data)
        .map_err(|e| ApiError::SourceUnavailable(format!("cannot parse PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(ApiError::SourceUnavailable(
            "PDF contains no extractable text".to_string(),
        ));
    }

    // Fall back to triple newlines when no form feeds are present.
    let pages: Vec<&str> = if text.contains('\x0C') {
        text.split('\x0C').collect()
    } else {
        text.split("\n\n\n").collect()
    };

    let mut records = Vec::new();
    for (page_idx, page) in pages.iter().enumerate() {
        let normalized = normalize_page(page);
        if normalized.is_empty() {
            continue;
        }

        let mut record = SourceRecord::new(normalized);
        record
            .metadata
            .insert("page".to_string(), (page_idx + 1).to_string());
        records.push(record);
    }

    if records.is_empty() {
        return Err(ApiError::SourceUnavailable(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(records)
}

/// Join hard-wrapped lines; PDF extraction often breaks mid-sentence.
fn normalize_page(page: &str) -> String {
    page.split("\n\n")
        .map(|para| {
            para.lines()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
