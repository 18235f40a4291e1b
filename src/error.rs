//! Structured error types for tree loading, merging and resolution.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Lookup errors
    PathNotFound,
    ServiceNotFound,
    MissingFileReference,

    // Shape errors
    TypeMismatch,
    MergeConflict,
    CyclicExtends,
    UnresolvedVariable,

    // Boundary errors
    DecodeError,
    EncodeError,
    IoError,
    ConfigError,
}

/// Errors raised by the library. None of them abort the process.
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment is missing or traverses a non-mapping.
    #[error("Can't find the path '{path}' in this map")]
    PathNotFound { path: String },

    /// An `extends` entry has no usable `file`.
    #[error("Nested configuration contains errors: 'file' key is unset")]
    MissingFileReference,

    /// The `service` named by an `extends` entry is absent from its document.
    #[error("Can't find service '{service}' in nested config '{file}'")]
    ServiceNotFound { service: String, file: String },

    /// The markup could not be parsed.
    #[error("Failed to decode document{}: {message}", source_suffix(.path))]
    Decode {
        path: Option<PathBuf>,
        message: String,
    },

    /// A node could not be written out as YAML or JSON.
    #[error("Failed to encode document: {message}")]
    Encode { message: String },

    /// A referenced document could not be read.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value does not have the variant an operation requires.
    #[error("Type mismatch at '{context}': expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// Merge recursion met a mapping on one side and a non-mapping on the other.
    #[error("Merge conflict at key '{key}': cannot merge a mapping into {found}")]
    MergeConflict { key: String, found: String },

    /// An `extends` chain refers back to an entry already on the chain.
    #[error("Cyclic extends: {}", .chain.join(" -> "))]
    CyclicExtends { chain: Vec<String> },

    /// A `${NAME}` placeholder had no value and the policy forbids blanks.
    #[error("Unresolved variable '${{{name}}}'")]
    UnresolvedVariable { name: String },

    /// Tool configuration could not be loaded.
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

fn source_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" '{}'", p.display()),
        None => String::new(),
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::PathNotFound { .. } => ErrorCode::PathNotFound,
            Error::MissingFileReference => ErrorCode::MissingFileReference,
            Error::ServiceNotFound { .. } => ErrorCode::ServiceNotFound,
            Error::Decode { .. } => ErrorCode::DecodeError,
            Error::Encode { .. } => ErrorCode::EncodeError,
            Error::Io { .. } => ErrorCode::IoError,
            Error::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            Error::MergeConflict { .. } => ErrorCode::MergeConflict,
            Error::CyclicExtends { .. } => ErrorCode::CyclicExtends,
            Error::UnresolvedVariable { .. } => ErrorCode::UnresolvedVariable,
            Error::Config { .. } => ErrorCode::ConfigError,
        }
    }

    // Convenience constructors

    pub fn path_not_found(path: &str) -> Self {
        Self::PathNotFound {
            path: path.to_string(),
        }
    }

    pub fn service_not_found(service: &str, file: &str) -> Self {
        Self::ServiceNotFound {
            service: service.to_string(),
            file: file.to_string(),
        }
    }

    pub fn type_mismatch(context: &str, expected: &str, found: &str) -> Self {
        Self::TypeMismatch {
            context: context.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn merge_conflict(key: &str, found: &str) -> Self {
        Self::MergeConflict {
            key: key.to_string(),
            found: found.to_string(),
        }
    }

    pub fn decode(path: Option<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            path,
            message: err.to_string(),
        }
    }

    pub fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Serializable form of an [`Error`], printed by the CLI.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_serialize_screaming_snake() {
        let report = ErrorReport::from(&Error::service_not_found("base", "b.yml"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "SERVICE_NOT_FOUND");
        assert_eq!(json["message"], "Can't find service 'base' in nested config 'b.yml'");
    }

    #[test]
    fn test_encode_has_its_own_code() {
        let err = Error::encode("unsupported value");
        assert_eq!(err.code(), ErrorCode::EncodeError);
        assert_eq!(err.to_string(), "Failed to encode document: unsupported value");
        let json = serde_json::to_value(ErrorReport::from(&err)).unwrap();
        assert_eq!(json["code"], "ENCODE_ERROR");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::path_not_found("a/b").to_string(),
            "Can't find the path 'a/b' in this map"
        );
        assert_eq!(
            Error::UnresolvedVariable { name: "HOME".into() }.to_string(),
            "Unresolved variable '${HOME}'"
        );
        let cyclic = Error::CyclicExtends {
            chain: vec!["a.yml#svc".into(), "b.yml#base".into(), "a.yml#svc".into()],
        };
        assert_eq!(cyclic.code(), ErrorCode::CyclicExtends);
        assert!(cyclic.to_string().contains("a.yml#svc -> b.yml#base -> a.yml#svc"));
    }

    #[test]
    fn test_decode_message_names_path() {
        let err = Error::decode(Some(PathBuf::from("b.yml")), "bad indent");
        assert_eq!(err.to_string(), "Failed to decode document 'b.yml': bad indent");
        let err = Error::decode(None, "bad indent");
        assert_eq!(err.to_string(), "Failed to decode document: bad indent");
    }
}
