//! Version report artifact
//!
//! The artifact is a JSON array of `VersionStatus` records.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::domain::status::VersionStatus;

/// Errors raised while writing or parsing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to encode report: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode report: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to access report file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Serializes records as pretty-printed JSON
pub fn to_json(statuses: &[VersionStatus]) -> Result<String, ReportError> {
    serde_json::to_string_pretty(statuses).map_err(ReportError::Encode)
}

/// Parses records from JSON
pub fn from_json(json: &str) -> Result<Vec<VersionStatus>, ReportError> {
    serde_json::from_str(json).map_err(ReportError::Decode)
}

/// Writes the report to `path`, replacing any existing file
pub fn write_report(path: &Path, statuses: &[VersionStatus]) -> Result<(), ReportError> {
    let json = to_json(statuses)?;
    fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
