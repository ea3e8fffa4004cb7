//! Error types for schema inference, snapshot storage, and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors during schema inference and merging.
#[derive(Debug, Error)]
pub enum InferError {
    /// A value outside the closed kind set was encountered. Fatal: the
    /// pipeline cannot model it, so the error propagates unchanged.
    #[error("unsupported value at {path}: {detail}")]
    UnsupportedType { path: String, detail: String },

    /// A `SchemaNode` handed to the merger violated an internal invariant
    /// (empty kind set, `required` not a subset of `properties`, `format`
    /// on a non-string node). Never silently repaired.
    #[error("malformed schema node: {reason}")]
    MalformedNode { reason: String },

    #[error("no example values have been added")]
    NoValues,
}

impl InferError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from the snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StoreError::InvalidJson { .. } => 2,
            _ => 3, // IO
        }
    }
}

/// Errors during payload validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("schema is not a valid JSON Schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
