//! Error types for the CRM datastore.

use std::fmt;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the datastore.
///
/// Business-level conditions (record not found, empty collection) are never
/// represented as errors; repositories signal those with `Ok(None)`,
/// `Ok(false)`, or an empty `Vec`. The variants below cover genuine
/// environment and encoding failures only.
#[derive(Debug, Clone)]
pub enum Error {
    /// Serialization failed when encoding a collection for storage.
    ///
    /// This occurs when an entity's `Serde` implementation fails.
    /// Common causes:
    /// - Entity contains a non-serializable value
    /// - Serde serialization error
    SerializationError(String),

    /// Deserialization failed when decoding a stored collection blob.
    ///
    /// This indicates corrupted or malformed data in the store.
    /// Repositories catch this variant and fail open to an empty
    /// collection; it only reaches callers that decode blobs directly.
    ///
    /// **Recovery:** The blob is overwritten on the next write.
    DeserializationError(String),

    /// Backing store error (file I/O, etc).
    ///
    /// This indicates the underlying key-value store is unavailable or
    /// returned an error. Common causes:
    /// - Store file unreadable or unwritable
    /// - Disk full
    ///
    /// **Recovery:** Treat as fatal to the current operation, not to the
    /// process.
    BackendError(String),

    /// Session state could not be interpreted.
    ///
    /// Raised only when a caller explicitly asks for the signed-in session
    /// and it is absent. Namespace resolution never raises this; it falls
    /// back to the demo-user sentinel instead.
    NoSession,

    /// Generic error with custom message.
    ///
    /// Used for errors that don't fit into other variants.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::NoSession => write!(f, "No active session"),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BackendError("disk full".to_string());
        assert_eq!(err.to_string(), "Backend error: disk full");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_malformed_json_maps_to_deserialization() {
        let parse_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::DeserializationError(_)));
    }
}
