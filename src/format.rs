//! String format detection via ordered pattern matching.
//!
//! Patterns are tried most specific first so that no two can both match
//! ambiguously: email, uuid, date-time, date, uri, ipv4.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// An unambiguous string sub-type tag inferred heuristically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringFormat {
    Email,
    Uuid,
    DateTime,
    Date,
    Uri,
    Ipv4,
}

impl StringFormat {
    /// Returns the JSON Schema `format` keyword value for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Uuid => "uuid",
            StringFormat::DateTime => "date-time",
            StringFormat::Date => "date",
            StringFormat::Uri => "uri",
            StringFormat::Ipv4 => "ipv4",
        }
    }
}

impl std::fmt::Display for StringFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered (pattern, tag) pairs evaluated in fixed sequence.
static DETECTORS: Lazy<Vec<(Regex, StringFormat)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex"),
            StringFormat::Email,
        ),
        (
            Regex::new(
                r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
            )
            .expect("uuid regex"),
            StringFormat::Uuid,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
                .expect("date-time regex"),
            StringFormat::DateTime,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"),
            StringFormat::Date,
        ),
        (
            Regex::new(r"(?i)^https?://[^\s/$.?#].[^\s]*$").expect("uri regex"),
            StringFormat::Uri,
        ),
        (
            Regex::new(
                r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
            )
            .expect("ipv4 regex"),
            StringFormat::Ipv4,
        ),
    ]
});

/// Detect the format of a string value.
///
/// Pure and stateless: the same input always yields the same output.
/// Returns `None` when no pattern matches; this is a normal outcome,
/// not an error.
pub fn detect_format(value: &str) -> Option<StringFormat> {
    if value.is_empty() {
        return None;
    }
    DETECTORS
        .iter()
        .find(|(pattern, _)| pattern.is_match(value))
        .map(|(_, tag)| *tag)
}
