//! Exchange rate errors.

use thiserror::Error;

/// Why a rate fetch failed.
///
/// Every variant is recoverable: the previous table stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection, DNS or TLS failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider did not answer within the configured timeout.
    #[error("Rate provider timed out after {0}s")]
    Timeout(u64),

    /// The provider answered with a non-success status.
    #[error("Rate provider returned HTTP {0}")]
    Status(u16),

    /// The body was not valid JSON.
    #[error("Malformed rate response: {0}")]
    Parse(String),

    /// The body had no `rates` object.
    #[error("Rate response is missing the 'rates' object")]
    MissingRates,

    /// The `rates` object held no usable entry besides the base.
    #[error("Rate response contains no usable rates")]
    NoUsableRates,
}

impl FetchError {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
            Self::Parse(_) => "parse",
            Self::MissingRates => "missing_rates",
            Self::NoUsableRates => "no_usable_rates",
        }
    }
}

impl From<FetchError> for currex_shared::AppError {
    fn from(err: FetchError) -> Self {
        Self::ExternalService(err.to_string())
    }
}

/// Errors from the snapshot persistence layer.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the snapshot failed.
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be (de)serialized.
    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use currex_shared::AppError;

    #[test]
    fn test_fetch_error_kinds_are_distinct() {
        let kinds = [
            FetchError::Transport(String::new()).kind(),
            FetchError::Timeout(15).kind(),
            FetchError::Status(503).kind(),
            FetchError::Parse(String::new()).kind(),
            FetchError::MissingRates.kind(),
            FetchError::NoUsableRates.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::Timeout(15).to_string(),
            "Rate provider timed out after 15s"
        );
        assert_eq!(
            FetchError::Status(503).to_string(),
            "Rate provider returned HTTP 503"
        );
    }

    #[test]
    fn test_fetch_error_maps_to_external_service() {
        let err: AppError = FetchError::MissingRates.into();
        assert_eq!(err.status_code(), 502);
    }
}
