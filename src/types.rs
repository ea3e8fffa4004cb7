//! Core types for schema inference.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InferError;

/// One of the closed set of primitive schema kinds.
///
/// The derived `Ord` fixes the canonical order unions are rendered in:
/// null, boolean, integer, number, string, array, object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Returns the JSON Schema type name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a value into one kind from the closed set.
///
/// Integers and floating numbers map to distinct kinds, matching the
/// `integer`/`number` split in JSON Schema.
///
/// # Errors
///
/// Returns [`InferError::UnsupportedType`] for a number that is neither an
/// integer nor representable as `f64` (possible with arbitrary-precision
/// parsing). This is fatal and must propagate to the caller unchanged.
pub fn classify(value: &Value, path: &str) -> Result<Kind, InferError> {
    match value {
        Value::Null => Ok(Kind::Null),
        Value::Bool(_) => Ok(Kind::Boolean),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(Kind::Integer)
            } else if n.is_f64() {
                Ok(Kind::Number)
            } else {
                Err(InferError::UnsupportedType {
                    path: path.to_string(),
                    detail: format!("number {} cannot be classified", n),
                })
            }
        }
        Value::String(_) => Ok(Kind::String),
        Value::Array(_) => Ok(Kind::Array),
        Value::Object(_) => Ok(Kind::Object),
    }
}

/// How detected string formats appear in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// Do not emit the `format` keyword at all.
    Off,
    /// Detect and emit `format` normally (validators may enforce it).
    #[default]
    On,
    /// Emit `format`, but set `$vocabulary` so that a conforming validator
    /// treats it as an annotation only, never an assertion.
    Safe,
}

/// Options for schema inference.
#[derive(Debug, Clone)]
pub struct InferOptions {
    /// How the `format` keyword is detected and emitted.
    pub format_mode: FormatMode,
    /// Collect up to this many distinct example values per path and emit
    /// the `examples` keyword. Zero disables collection.
    pub examples_limit: usize,
    /// Explicit `$schema` value for the produced document.
    pub schema_uri: Option<String>,
}

impl InferOptions {
    /// Create options with format detection on and example collection off.
    pub fn new() -> Self {
        Self {
            format_mode: FormatMode::On,
            examples_limit: 0,
            schema_uri: None,
        }
    }

    /// Set the format mode.
    pub fn format_mode(mut self, mode: FormatMode) -> Self {
        self.format_mode = mode;
        self
    }

    /// Set the per-path example limit.
    pub fn examples(mut self, limit: usize) -> Self {
        self.examples_limit = limit;
        self
    }

    /// Set an explicit `$schema` URI for the output document.
    pub fn schema_uri(mut self, uri: impl Into<String>) -> Self {
        self.schema_uri = Some(uri.into());
        self
    }
}

impl Default for InferOptions {
    fn default() -> Self {
        Self::new()
    }
}
