//! Error types shared by the generator, the cache backends and the pool.

use crate::number::ParseNumberError;

/// Failure reported by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store rejected or failed the operation.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted value could not be decoded.
    #[error("corrupt cache entry for ordinal {ordinal}: {reason}")]
    Corrupt { ordinal: u64, reason: String },

    /// I/O failure in a file-backed store.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error type for Fibonacci requests.
#[derive(Debug, thiserror::Error)]
pub enum FiboError {
    /// A decimal value could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseNumberError),

    /// An ordinal supplied by an external caller could not be parsed.
    #[error("invalid ordinal: {0:?}")]
    InvalidOrdinal(String),

    /// A precondition on the arguments was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `start` was called on a pool that is already running.
    #[error("worker pool is already running")]
    AlreadyRunning,

    /// `close` (or a submission) was attempted on a stopped pool.
    #[error("worker pool is not running")]
    NotRunning,

    /// The cache backend failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// A worker exited before finishing the job it held.
    #[error("a pool worker exited before finishing its job")]
    WorkerLost,

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Parse an ordinal supplied as text by a CLI or HTTP caller.
///
/// ```
/// assert_eq!(fibo_core::parse_ordinal("42").unwrap(), 42);
/// assert!(fibo_core::parse_ordinal("-1").is_err());
/// ```
pub fn parse_ordinal(s: &str) -> Result<u64, FiboError> {
    s.trim()
        .parse::<u64>()
        .map_err(|_| FiboError::InvalidOrdinal(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            FiboError::InvalidArgument("ordinal must be non-negative".into()).to_string(),
            "invalid argument: ordinal must be non-negative"
        );
        assert_eq!(
            FiboError::AlreadyRunning.to_string(),
            "worker pool is already running"
        );
        let err = FiboError::from(CacheError::Storage("disk full".into()));
        assert_eq!(err.to_string(), "cache error: storage error: disk full");
    }

    #[test]
    fn parse_error_converts() {
        let err: FiboError = "12x".parse::<crate::Number>().unwrap_err().into();
        assert!(matches!(err, FiboError::Parse(_)));
        assert_eq!(err.to_string(), "invalid decimal number: \"12x\"");
    }

    #[test]
    fn parse_ordinal_accepts_unsigned() {
        assert_eq!(parse_ordinal("0").unwrap(), 0);
        assert_eq!(parse_ordinal(" 20 ").unwrap(), 20);
        assert_eq!(parse_ordinal("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn parse_ordinal_rejects_invalid() {
        for bad in ["-1", "abc", "", "18446744073709551616"] {
            assert!(matches!(parse_ordinal(bad), Err(FiboError::InvalidOrdinal(_))));
        }
    }
}
