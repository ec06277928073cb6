use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::core::result::Split;
use crate::core::time::RaceTime;
use crate::utils::validation::{check_punch_limit, normalize_code, MAX_PUNCHES};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid punch format: {0}")]
    InvalidFormat(String),

    #[error("Invalid card data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Too many punches: {0} exceeds maximum allowed ({MAX_PUNCHES})")]
    TooManyPunches(usize),
}

/// Pick the delimiter from the file extension: `.csv` is comma separated,
/// everything else tab separated
#[must_use]
pub fn delimiter_for(path: &Path) -> char {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ',',
        _ => '\t',
    }
}

/// Parse a TSV/CSV punch file with columns: code, time
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_punches_file(path: &Path) -> Result<Vec<Split>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_punches_text(&content, delimiter_for(path))
}

/// Parse TSV/CSV punch text with columns: code, time
///
/// Times are `HH:MM:SS[.fff]`, `MM:SS` or milliseconds. Zero codes are
/// skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if lines have fewer than 2 fields or
/// contain an invalid code or time, or `ParseError::TooManyPunches` if the
/// limit is exceeded.
pub fn parse_punches_text(text: &str, delimiter: char) -> Result<Vec<Split>, ParseError> {
    let mut splits = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if first == "code" || first == "cp" || first == "control" {
                continue;
            }
        }

        let line_num = i + 1;

        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }

        let code = normalize_code(fields[0]).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Invalid code on line {line_num}: '{}'", fields[0]))
        })?;
        let time = RaceTime::parse(fields[1]).ok_or_else(|| {
            ParseError::InvalidFormat(format!("Invalid time on line {line_num}: '{}'", fields[1]))
        })?;

        if code == "0" {
            warn!("Skipping zero code on line {line_num}");
            continue;
        }

        if check_punch_limit(splits.len()).is_some() {
            return Err(ParseError::TooManyPunches(splits.len()));
        }

        splits.push(Split::new(code, time));
    }

    Ok(splits)
}
