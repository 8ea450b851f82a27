use thiserror::Error;

/// Structural failures that abort an ingestion call before any record is built.
///
/// Content problems (blank names, bad emails, unknown grades) are never raised
/// here; they are collected into a `ValidationReport` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("file has no data rows: expected a header line followed by at least one record")]
    NoDataRows,

    #[error("unknown import kind: {0} (expected \"student\" or \"teacher\")")]
    UnknownKind(String),
}

impl IngestError {
    /// Stable code used in the sidecar error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::NoDataRows => "no_data_rows",
            IngestError::UnknownKind(_) => "bad_params",
        }
    }
}
