//! Shared error model.
//!
//! Every fallible operation in the engine returns one of these variants.
//! Display strings follow a `CATEGORY/detail` convention so log lines and
//! API error bodies stay grep-able.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsimError {
    /// Upstream fetch failed (network, HTTP status, or body read).
    #[error("UPSTREAM/{0}")]
    Upstream(String),

    /// Cache file could not be read, written, or failed its integrity check.
    #[error("CACHE/{0}")]
    Cache(String),

    /// Plan catalog file was missing a required entry or failed to parse.
    #[error("CATALOG/{0}")]
    Catalog(String),

    /// A profile operation was rejected (unknown identifier, bad patch).
    #[error("PROFILE/{0}")]
    Profile(String),

    /// No activation payload could be produced for a profile.
    #[error("PAYLOAD/{0}")]
    Payload(String),

    /// Serialization or deserialization failure.
    #[error("SERDE/{0}")]
    Serde(String),

    /// Filesystem failure outside the cache path.
    #[error("IO/{0}")]
    Io(String),
}

impl From<serde_json::Error> for EsimError {
    fn from(e: serde_json::Error) -> Self {
        EsimError::Serde(e.to_string())
    }
}

impl From<std::io::Error> for EsimError {
    fn from(e: std::io::Error) -> Self {
        EsimError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_format() {
        let err = EsimError::Upstream("timeout after 30s".to_string());
        assert_eq!(err.to_string(), "UPSTREAM/timeout after 30s");

        let err = EsimError::Profile("no profile with iccid 89...".to_string());
        assert!(err.to_string().starts_with("PROFILE/"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: EsimError = bad.unwrap_err().into();
        assert!(matches!(err, EsimError::Serde(_)));
    }
}
