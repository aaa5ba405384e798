//! Refinement client errors.

use thiserror::Error;

/// Errors returned by the refinement client.
#[derive(Error, Debug)]
pub enum RefineError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Failed to encode request: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("HTTP request failed (attempt {attempt}): {source}")]
    Transport {
        attempt: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("API returned client error status: {status}")]
    ClientStatus { status: u16 },
    #[error("API returned non-200 status: {status} (attempt {attempt})")]
    UnexpectedStatus { status: u16, attempt: u32 },
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        last: Box<RefineError>,
    },
    #[error("Request cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl RefineError {
    /// Whether another attempt may succeed where this one failed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RefineError::Transport { .. } | RefineError::UnexpectedStatus { .. }
        )
    }

    /// The HTTP status behind this error, looking through `MaxRetriesExceeded`.
    pub fn status(&self) -> Option<u16> {
        match self {
            RefineError::ClientStatus { status } | RefineError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            RefineError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            RefineError::MaxRetriesExceeded { last, .. } => last.status(),
            _ => None,
        }
    }
}
