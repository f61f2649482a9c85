//! Input validation for query and upload requests.
//!
//! Validation failures are reported to the caller unchanged and are never
//! retried.

use std::path::Path;

use thiserror::Error;

use crate::models::{MAX_YEAR, MIN_YEAR};

/// File extensions accepted for uploads
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

/// Validation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter a research query.")]
    EmptyQuery,

    #[error("Number of papers must be between {min} and {max}, got {value}")]
    ResultsOutOfRange { value: usize, min: usize, max: usize },

    #[error("Year must be between 1900 and 2100, got {0}")]
    YearOutOfRange(i32),

    #[error("Start year ({start}) cannot be greater than end year ({end})")]
    InvertedYearRange { start: i32, end: i32 },

    #[error("Unsupported file type '{0}'. Please upload a PDF, TXT, or MD file.")]
    UnsupportedFormat(String),

    #[error("Could not extract readable text from uploaded file.")]
    EmptyDocument,

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// Trim a query and reject blank input
pub fn validate_query(query: &str) -> Result<String, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(query.to_string())
}

/// Check the requested number of papers against the allowed range
pub fn validate_max_results(value: usize, min: usize, max: usize) -> Result<usize, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::ResultsOutOfRange { value, min, max });
    }
    Ok(value)
}

/// Check that a year lies in 1900..=2100
pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }
    Ok(year)
}

/// Validate optional inclusive year bounds
pub fn validate_year_range(
    start: Option<i32>,
    end: Option<i32>,
) -> Result<(Option<i32>, Option<i32>), ValidationError> {
    let start = start.map(validate_year).transpose()?;
    let end = end.map(validate_year).transpose()?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvertedYearRange { start, end });
        }
    }
    Ok((start, end))
}

/// Lowercase extension of an upload, if it is one we can read
pub fn validate_upload_filename(filename: &str) -> Result<String, ValidationError> {
    let filename = filename.trim();
    if filename.is_empty() || filename.contains('\0') {
        return Err(ValidationError::InvalidFilename(filename.to_string()));
    }

    let extension = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(ValidationError::UnsupportedFormat(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  graph nets ").unwrap(), "graph nets");
        assert_eq!(validate_query("   "), Err(ValidationError::EmptyQuery));
    }

    #[test]
    fn test_validate_max_results() {
        assert_eq!(validate_max_results(4, 4, 20), Ok(4));
        assert_eq!(validate_max_results(20, 4, 20), Ok(20));
        assert!(matches!(
            validate_max_results(3, 4, 20),
            Err(ValidationError::ResultsOutOfRange { value: 3, .. })
        ));
        assert!(validate_max_results(21, 4, 20).is_err());
    }

    #[test]
    fn test_validate_year_range() {
        assert_eq!(validate_year_range(None, None), Ok((None, None)));
        assert_eq!(validate_year_range(Some(2020), Some(2020)), Ok((Some(2020), Some(2020))));
        assert_eq!(
            validate_year_range(Some(2021), Some(2020)),
            Err(ValidationError::InvertedYearRange {
                start: 2021,
                end: 2020
            })
        );
        assert_eq!(
            validate_year_range(Some(1899), None),
            Err(ValidationError::YearOutOfRange(1899))
        );
        assert_eq!(
            validate_year_range(None, Some(2101)),
            Err(ValidationError::YearOutOfRange(2101))
        );
    }

    #[test]
    fn test_validate_upload_filename() {
        assert_eq!(validate_upload_filename("paper.PDF").unwrap(), "pdf");
        assert_eq!(validate_upload_filename("notes.md").unwrap(), "md");
        assert_eq!(
            validate_upload_filename("slides.pptx"),
            Err(ValidationError::UnsupportedFormat("pptx".to_string()))
        );
        assert_eq!(
            validate_upload_filename("README"),
            Err(ValidationError::UnsupportedFormat(String::new()))
        );
        assert!(validate_upload_filename("").is_err());
    }
}
