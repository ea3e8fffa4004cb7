//! jsonshape
//!
//! Infers a minimal JSON Schema from a stream of example values, merges
//! schemas across repeated observations while tracking which properties are
//! consistently present, detects unambiguous string formats, and renders
//! human-readable diffs between two schema versions.
//!
//! # Example
//!
//! ```
//! use jsonshape::{InferOptions, SchemaBuilder};
//! use serde_json::json;
//!
//! let mut builder = SchemaBuilder::new(InferOptions::default());
//! builder.add_value(&json!({"a": 1})).unwrap();
//! builder.add_value(&json!({"a": "x"})).unwrap();
//!
//! let schema = builder.to_schema().unwrap();
//! assert_eq!(schema["properties"]["a"]["type"], json!(["integer", "string"]));
//! assert_eq!(schema["required"], json!(["a"]));
//! ```
//!
//! Optionality emerges through merging: a property missing from any
//! observation leaves `required`.
//!
//! ```
//! use jsonshape::SchemaBuilder;
//! use serde_json::json;
//!
//! let mut builder = SchemaBuilder::default();
//! builder.add_value(&json!({"a": 1})).unwrap();
//! builder.add_value(&json!({})).unwrap();
//!
//! let schema = builder.to_schema().unwrap();
//! assert!(schema.get("required").is_none());
//! ```
//!
//! # Diffs
//!
//! [`diff_schemas`] compares two schema documents and categorizes every
//! change as added, removed, or replaced, with paths shortened for humans
//! (`foo.bar.type` rather than `foo.properties.bar.properties.type`).

mod builder;
mod diff;
mod error;
mod format;
mod node;
mod serializer;
mod store;
mod types;
mod validator;

pub use builder::{FormatObservations, SchemaBuilder};
pub use diff::{canonical_json, diff_schemas, ChangeKind, DiffCache, DiffEntry, SchemaDiff};
pub use error::{InferError, SchemaError, StoreError, ValidateError};
pub use format::{detect_format, StringFormat};
pub use node::{merge, SchemaNode};
pub use serializer::DRAFT_2020_12_URI;
pub use store::{SnapshotStore, SNAPSHOT_SUFFIX};
pub use types::{classify, FormatMode, InferOptions, Kind};
pub use validator::validate_value;
