//! Error taxonomy for the review and conversion core.
//!
//! Validation happens before any mutation; storage failures are wrapped so
//! callers see a generic failure while the underlying cause stays reachable
//! through `source()` for logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("detection {0} not found")]
    DetectionNotFound(i64),

    #[error("panorama {0} not found")]
    PanoramaNotFound(i64),

    #[error("panorama {0} has no confirmed detections")]
    NoConfirmedDetections(i64),

    #[error("conversion for panorama {0} raced a concurrent run; retry")]
    ConversionConflict(i64),

    // Display stays generic; the driver error is only exposed via source().
    #[error("storage failure")]
    Storage(#[source] rusqlite::Error),

    #[error("encoding failure")]
    Encoding(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unknown review action `{0}` (expected `confirm` or `reject`)")]
    InvalidAction(String),

    #[error("panorama upload carried no face images")]
    NoFaces,

    #[error("face `{0}` payload is not a recognizable image")]
    NotAnImage(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Storage(e)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Encoding(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_display_does_not_leak_driver_detail() {
        let err = CoreError::Storage(rusqlite::Error::InvalidQuery);
        assert_eq!(err.to_string(), "storage failure");
    }
}
