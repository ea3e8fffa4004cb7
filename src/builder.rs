//! Schema building - walks example values into schema trees and caches.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::InferError;
use crate::format::{detect_format, StringFormat};
use crate::node::{merge, SchemaNode};
use crate::serializer::{render_document, RenderContext};
use crate::types::{classify, FormatMode, InferOptions};

/// Root of the logical path space: `root`, `root.<key>`, `root[0]`.
pub(crate) const ROOT_PATH: &str = "root";

/// Formats observed at one logical path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatObservations {
    /// Distinct formats detected at this path.
    pub detected: BTreeSet<StringFormat>,
    /// True when a string matching no pattern was seen here.
    pub unformatted: bool,
}

impl FormatObservations {
    /// The single unambiguous format for this path, if there is one.
    ///
    /// `None` as soon as two different formats were observed or a
    /// non-matching string appeared.
    pub fn unambiguous(&self) -> Option<StringFormat> {
        if self.unformatted || self.detected.len() != 1 {
            return None;
        }
        self.detected.iter().next().copied()
    }
}

/// Builds a schema from a stream of example values observed at the same
/// logical location.
///
/// Each added value is walked into a fresh [`SchemaNode`] tree and merged
/// into the accumulator; string formats and bounded example values are
/// recorded in per-path caches along the way. All elements of one array
/// share the representative path slot `[0]`, since the element schema is
/// unified into a single node regardless of index.
#[derive(Debug)]
pub struct SchemaBuilder {
    options: InferOptions,
    root: Option<SchemaNode>,
    formats: BTreeMap<String, FormatObservations>,
    examples: BTreeMap<String, Vec<Value>>,
}

impl SchemaBuilder {
    /// Create a builder with the given options.
    pub fn new(options: InferOptions) -> Self {
        Self {
            options,
            root: None,
            formats: BTreeMap::new(),
            examples: BTreeMap::new(),
        }
    }

    /// Add one observed example value.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::UnsupportedType`] if the value contains a
    /// number outside the closed kind set.
    pub fn add_value(&mut self, value: &Value) -> Result<(), InferError> {
        let node = self.infer_node(value, ROOT_PATH)?;
        self.root = Some(match self.root.take() {
            Some(acc) => merge(&acc, &node)?,
            None => node,
        });
        Ok(())
    }

    /// The merged schema tree over all observations so far.
    pub fn schema_node(&self) -> Option<&SchemaNode> {
        self.root.as_ref()
    }

    /// Formats observed per logical path.
    pub fn formats(&self) -> &BTreeMap<String, FormatObservations> {
        &self.formats
    }

    /// Example values collected per logical path.
    pub fn examples(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.examples
    }

    /// Render the accumulated schema as a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`InferError::NoValues`] if nothing has been added yet.
    pub fn to_schema(&self) -> Result<Value, InferError> {
        let node = self.root.as_ref().ok_or(InferError::NoValues)?;
        let ctx = RenderContext {
            formats: Some(&self.formats),
            examples: Some(&self.examples),
            options: &self.options,
        };
        Ok(render_document(node, &ctx))
    }

    fn infer_node(&mut self, value: &Value, path: &str) -> Result<SchemaNode, InferError> {
        self.record_example(path, value);

        let kind = classify(value, path)?;
        let mut node = SchemaNode::of_kind(kind);

        match value {
            Value::String(s) => {
                if self.options.format_mode != FormatMode::Off {
                    let detected = detect_format(s);
                    let observations = self.formats.entry(path.to_string()).or_default();
                    match detected {
                        Some(tag) => {
                            observations.detected.insert(tag);
                        }
                        None => observations.unformatted = true,
                    }
                    node.format = detected;
                }
            }
            Value::Object(map) => {
                // Every key of a single observation is tentatively required;
                // optionality emerges only through merging.
                for (key, child) in map {
                    let child_path = format!("{path}.{key}");
                    let child_node = self.infer_node(child, &child_path)?;
                    node.properties.insert(key.clone(), child_node);
                    node.required.insert(key.clone());
                }
            }
            Value::Array(elements) => {
                let elem_path = format!("{path}[0]");
                let mut unified: Option<SchemaNode> = None;
                for element in elements {
                    let elem_node = self.infer_node(element, &elem_path)?;
                    unified = Some(match unified {
                        Some(acc) => merge(&acc, &elem_node)?,
                        None => elem_node,
                    });
                }
                node.items = unified.map(Box::new);
            }
            _ => {}
        }

        debug_assert!(node.type_names.contains(&kind));
        Ok(node)
    }

    fn record_example(&mut self, path: &str, value: &Value) {
        if self.options.examples_limit == 0 {
            return;
        }
        let bucket = self.examples.entry(path.to_string()).or_default();
        if bucket.len() >= self.options.examples_limit {
            return;
        }
        if bucket.iter().any(|existing| existing == value) {
            return;
        }
        bucket.push(value.clone());
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new(InferOptions::default())
    }
}
