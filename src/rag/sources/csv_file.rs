//! CSV adapter.
//!
//! Every row becomes exactly one record: the text serializes all
//! column/value pairs into one sentence (`"col1: val1. col2: val2."`) and
//! the original columns pass through as metadata. Rows are never split by
//! the chunking policy, however long.

use std::path::Path;

use crate::core::errors::ApiError;

use super::SourceRecord;

pub fn load(path: &Path) -> Result<Vec<SourceRecord>, ApiError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ApiError::SourceUnavailable(format!("cannot read {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| ApiError::SourceUnavailable(format!("malformed CSV header: {e}")))?
        .clone();

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            ApiError::SourceUnavailable(format!("malformed CSV row {}: {e}", row_idx + 2))
        })?;

        let mut sentence = String::new();
        let mut record = SourceRecord::new(String::new());

        for (header, value) in headers.iter().zip(row.iter()) {
            if !sentence.is_empty() {
                sentence.push(' ');
            }
            sentence.push_str(&format!("{}: {}.", header.trim(), value.trim()));
            record
                .metadata
                .insert(header.trim().to_string(), value.trim().to_string());
        }

        record.metadata.insert("row".to_string(), (row_idx + 1).to_string());
        record.text = sentence;
        records.push(record);
    }

    if records.is_empty() {
        return Err(ApiError::SourceUnavailable(
            "CSV contains no data rows".to_string(),
        ));
    }

    Ok(records)
}
