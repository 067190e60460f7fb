//! Error types for parser backend operations

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Result type for parser backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a backend failure.
///
/// This is the part of an error that survives the adapter boundary; the
/// classifier only ever looks at the kind, never at the message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ErrorKind {
    /// Syntax error unrelated to entity policy
    MalformedDocument,
    /// The backend enforced an expansion depth/size limit
    EntityExpansionRejected,
    /// The backend refused a DTD or an external entity
    ExternalEntityDisallowed,
    /// The backend hit an allocation or size limit of its own
    ResourceExhausted,
    /// Anything else
    Unknown,
}

/// Unified error type for all parser backends
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Syntax error
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Expansion limit enforced by the backend
    #[error("entity expansion rejected: {0}")]
    EntityExpansionRejected(String),

    /// DTD or external entity refused
    #[error("external entity disallowed: {0}")]
    ExternalEntityDisallowed(String),

    /// Allocation or size limit reached
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The backend cannot honor the requested configuration
    #[error("configuration not supported: {0}")]
    Unsupported(String),

    /// IO error while resolving an external entity
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error, message kept verbatim
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedDocument(msg.into())
    }

    pub fn expansion_rejected<S: Into<String>>(msg: S) -> Self {
        Error::EntityExpansionRejected(msg.into())
    }

    pub fn external_disallowed<S: Into<String>>(msg: S) -> Self {
        Error::ExternalEntityDisallowed(msg.into())
    }

    pub fn resource_exhausted<S: Into<String>>(msg: S) -> Self {
        Error::ResourceExhausted(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Map this error onto the reported taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Error::EntityExpansionRejected(_) => ErrorKind::EntityExpansionRejected,
            Error::ExternalEntityDisallowed(_) => ErrorKind::ExternalEntityDisallowed,
            Error::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Error::Unsupported(_) | Error::Io(_) | Error::Other(_) => ErrorKind::Unknown,
        }
    }

    /// The bare message, without the kind prefix added by `Display`
    pub fn message(&self) -> String {
        match self {
            Error::MalformedDocument(msg)
            | Error::EntityExpansionRejected(msg)
            | Error::ExternalEntityDisallowed(msg)
            | Error::ResourceExhausted(msg)
            | Error::Unsupported(msg)
            | Error::Other(msg) => msg.clone(),
            Error::Io(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Error::malformed("x").kind(), ErrorKind::MalformedDocument);
        assert_eq!(
            Error::expansion_rejected("x").kind(),
            ErrorKind::EntityExpansionRejected
        );
        assert_eq!(
            Error::external_disallowed("x").kind(),
            ErrorKind::ExternalEntityDisallowed
        );
        assert_eq!(
            Error::resource_exhausted("x").kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(Error::other("x").kind(), ErrorKind::Unknown);
        assert_eq!(Error::unsupported("x").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn io_errors_are_unknown() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "gone");
    }

    #[test]
    fn message_drops_prefix() {
        let err = Error::malformed("unexpected end of input");
        assert_eq!(err.to_string(), "malformed document: unexpected end of input");
        assert_eq!(err.message(), "unexpected end of input");
    }

    #[test]
    fn kind_labels_round_trip() {
        assert_eq!(ErrorKind::EntityExpansionRejected.to_string(), "EntityExpansionRejected");
        assert_eq!(
            "ResourceExhausted".parse::<ErrorKind>().unwrap(),
            ErrorKind::ResourceExhausted
        );
    }
}
