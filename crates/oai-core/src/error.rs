//! Error types for OAI-PMH backends.
//!
//! Protocol failures are expressed through [`OaiError`], which always carries
//! exactly one [`ErrorCode`] from the closed OAI-PMH taxonomy. Infrastructure
//! faults (storage, configuration) and newtype validation failures have their
//! own variants on the unified [`Error`] type and carry no protocol code.

use std::fmt;
use thiserror::Error;

/// The unified error type for backend operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A protocol-level failure with an OAI-PMH error code.
    #[error("{0}")]
    Oai(#[from] OaiError),

    /// The underlying record store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (invalid identifier, prefix, set spec, datestamp).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Backend configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An internal invariant was violated.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Returns the OAI-PMH error code, if this is a protocol failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Error::Oai(err) => Some(err.code),
            _ => None,
        }
    }

    /// Returns true if this error carries the given OAI-PMH code.
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code() == Some(code)
    }
}

/// The closed set of OAI-PMH error conditions.
///
/// Exactly one code is reported per failed call; codes never combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadArgument,
    BadResumptionToken,
    /// Raised only by the protocol layer; backends never produce it.
    BadVerb,
    CannotDisseminateFormat,
    IdDoesNotExist,
    NoRecordsMatch,
    NoMetadataFormats,
    NoSetHierarchy,
}

impl ErrorCode {
    /// All codes, in protocol documentation order.
    pub const ALL: [ErrorCode; 8] = [
        ErrorCode::BadArgument,
        ErrorCode::BadResumptionToken,
        ErrorCode::BadVerb,
        ErrorCode::CannotDisseminateFormat,
        ErrorCode::IdDoesNotExist,
        ErrorCode::NoRecordsMatch,
        ErrorCode::NoMetadataFormats,
        ErrorCode::NoSetHierarchy,
    ];

    /// Returns the code as it appears in an OAI-PMH `<error code="...">` element.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadArgument => "badArgument",
            ErrorCode::BadResumptionToken => "badResumptionToken",
            ErrorCode::BadVerb => "badVerb",
            ErrorCode::CannotDisseminateFormat => "cannotDisseminateFormat",
            ErrorCode::IdDoesNotExist => "idDoesNotExist",
            ErrorCode::NoRecordsMatch => "noRecordsMatch",
            ErrorCode::NoMetadataFormats => "noMetadataFormats",
            ErrorCode::NoSetHierarchy => "noSetHierarchy",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol failure reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiError {
    /// The OAI-PMH error code.
    pub code: ErrorCode,
    /// Human-readable detail for logs and the protocol layer.
    pub message: String,
}

impl OaiError {
    /// Create a new protocol error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadArgument, message)
    }

    pub fn bad_resumption_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadResumptionToken, message)
    }

    pub fn cannot_disseminate_format(prefix: &str) -> Self {
        Self::new(
            ErrorCode::CannotDisseminateFormat,
            format!("metadata format '{}' is not available", prefix),
        )
    }

    pub fn id_does_not_exist(identifier: &str) -> Self {
        Self::new(
            ErrorCode::IdDoesNotExist,
            format!("no record with identifier '{}'", identifier),
        )
    }

    pub fn no_records_match() -> Self {
        Self::new(
            ErrorCode::NoRecordsMatch,
            "the combination of arguments results in an empty list",
        )
    }

    pub fn no_metadata_formats(identifier: &str) -> Self {
        Self::new(
            ErrorCode::NoMetadataFormats,
            format!("record '{}' has no metadata formats", identifier),
        )
    }

    pub fn no_set_hierarchy() -> Self {
        Self::new(
            ErrorCode::NoSetHierarchy,
            "the repository does not support sets",
        )
    }
}

impl fmt::Display for OaiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for OaiError {}

/// Failures of the underlying record store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the store failed.
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// A stored document could not be decoded.
    #[error("corrupt document at {path}: {message}")]
    Corrupt { path: String, message: String },

    /// The store lock could not be acquired.
    #[error("lock error: {message}")]
    Lock { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid record identifier.
    #[error("invalid identifier '{value}': {reason}")]
    Identifier { value: String, reason: String },

    /// Invalid metadata prefix.
    #[error("invalid metadata prefix '{value}': {reason}")]
    MetadataPrefix { value: String, reason: String },

    /// Invalid set spec.
    #[error("invalid set spec '{value}': {reason}")]
    SetSpec { value: String, reason: String },

    /// Invalid datestamp.
    #[error("invalid datestamp '{value}': {reason}")]
    Datestamp { value: String, reason: String },

    /// Invalid schema or namespace URL.
    #[error("invalid URL '{value}': {reason}")]
    Url { value: String, reason: String },

    /// Invalid metadata document.
    #[error("invalid metadata document: {reason}")]
    Metadata { reason: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Page size must be positive.
    #[error("page_size must be greater than zero")]
    ZeroPageSize,

    /// At least one metadata format must be configured.
    #[error("at least one metadata format must be configured")]
    NoMetadataFormats,

    /// Metadata format prefixes must be unique.
    #[error("duplicate metadata format prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },

    /// The token secret is empty.
    #[error("token_secret must not be empty")]
    EmptySecret,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_render_as_wire_names() {
        let names: Vec<_> = ErrorCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            [
                "badArgument",
                "badResumptionToken",
                "badVerb",
                "cannotDisseminateFormat",
                "idDoesNotExist",
                "noRecordsMatch",
                "noMetadataFormats",
                "noSetHierarchy",
            ]
        );
    }

    #[test]
    fn unified_error_exposes_code() {
        let err: Error = OaiError::no_records_match().into();
        assert_eq!(err.code(), Some(ErrorCode::NoRecordsMatch));
        assert!(err.is(ErrorCode::NoRecordsMatch));
        assert!(!err.is(ErrorCode::BadArgument));
    }

    #[test]
    fn storage_errors_have_no_code() {
        let err: Error = StorageError::Lock {
            message: "busy".to_string(),
        }
        .into();
        assert_eq!(err.code(), None);
    }

    #[test]
    fn display_includes_code() {
        let err = OaiError::id_does_not_exist("oai:example:1");
        assert_eq!(
            err.to_string(),
            "[idDoesNotExist] no record with identifier 'oai:example:1'"
        );
    }
}
