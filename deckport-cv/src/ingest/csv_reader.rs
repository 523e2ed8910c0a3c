//! CSV decoding and table reading
//!
//! Inventory tools export in a mix of encodings and delimiters. Bytes are
//! decoded as UTF-8 with a Windows-1252 fallback, the delimiter is sniffed
//! from a sample when the dialect doesn't pin one, and the csv crate does
//! the actual record splitting (flexible mode: tools pad or drop trailing
//! columns freely).

use crate::error::{ConvertError, Result};
use csv::{ReaderBuilder, Trim};

/// Raw tabular input: one header row plus data rows
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decode input bytes to text
///
/// UTF-8 first (with BOM stripping), then Windows-1252, which decodes any
/// byte sequence and covers the legacy desktop tools.
pub fn decode_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

/// Detect the delimiter from a content sample
///
/// Scores each candidate by per-line frequency and consistency across the
/// first lines; the steadiest frequent delimiter wins.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        if sample_lines.is_empty() {
            continue;
        }

        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&c| (c as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;

        let score = avg / (1.0 + variance.sqrt());
        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    best_delimiter
}

/// Read decoded content into a header row plus data rows
pub fn read_table(content: &str, delimiter: u8) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ConvertError::Csv(format!("Failed to read header row: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ConvertError::Csv("Input has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| ConvertError::Csv(format!("Failed to parse row {}: {}", index + 1, e)))?;

        // Skip fully blank rows; tools leave them at the end of exports
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    tracing::debug!(
        columns = headers.len(),
        rows = rows.len(),
        "Read input table"
    );

    Ok(RawTable { headers, rows })
}
