//! Serialization of schema trees into JSON Schema documents.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::builder::{FormatObservations, ROOT_PATH};
use crate::format::StringFormat;
use crate::node::SchemaNode;
use crate::types::{FormatMode, InferOptions, Kind};

/// Meta-schema URI used when safe mode has no explicit `$schema` configured.
pub const DRAFT_2020_12_URI: &str = "https://json-schema.org/draft/2020-12/schema";

/// Read-only view over the builder's annotation caches.
pub(crate) struct RenderContext<'a> {
    pub formats: Option<&'a BTreeMap<String, FormatObservations>>,
    pub examples: Option<&'a BTreeMap<String, Vec<Value>>>,
    pub options: &'a InferOptions,
}

/// Convert a finalized schema tree into a JSON Schema document.
pub(crate) fn render_document(node: &SchemaNode, ctx: &RenderContext) -> Value {
    let mut doc = Map::new();

    match ctx.options.format_mode {
        FormatMode::Safe => {
            let uri = ctx
                .options
                .schema_uri
                .clone()
                .unwrap_or_else(|| DRAFT_2020_12_URI.to_string());
            doc.insert("$schema".to_string(), Value::String(uri));
            doc.insert("$vocabulary".to_string(), format_annotation_vocabulary());
        }
        _ => {
            if let Some(uri) = &ctx.options.schema_uri {
                doc.insert("$schema".to_string(), Value::String(uri.clone()));
            }
        }
    }

    if let Value::Object(body) = render_node(node, ROOT_PATH, ctx) {
        for (key, value) in body {
            doc.insert(key, value);
        }
    }

    Value::Object(doc)
}

impl SchemaNode {
    /// Render this node alone as a JSON Schema document.
    ///
    /// Formats come from the node tree itself; example annotations require
    /// the caches a [`crate::SchemaBuilder`] owns, so none are emitted here.
    pub fn to_document(&self, options: &InferOptions) -> Value {
        let ctx = RenderContext {
            formats: None,
            examples: None,
            options,
        };
        render_document(self, &ctx)
    }
}

fn render_node(node: &SchemaNode, path: &str, ctx: &RenderContext) -> Value {
    let mut map = Map::new();

    if node.type_names.len() == 1 {
        if let Some(kind) = node.type_names.iter().next() {
            map.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        }
    } else {
        map.insert(
            "type".to_string(),
            Value::Array(
                node.type_names
                    .iter()
                    .map(|kind| Value::String(kind.as_str().to_string()))
                    .collect(),
            ),
        );
    }

    if let Some(tag) = effective_format(node, path, ctx) {
        map.insert("format".to_string(), Value::String(tag.as_str().to_string()));
    }

    if !node.properties.is_empty() {
        let mut properties = Map::new();
        for (name, child) in &node.properties {
            let child_path = format!("{path}.{name}");
            properties.insert(name.clone(), render_node(child, &child_path, ctx));
        }
        map.insert("properties".to_string(), Value::Object(properties));
        map.insert("additionalProperties".to_string(), Value::Bool(false));
        if !node.required.is_empty() {
            map.insert(
                "required".to_string(),
                Value::Array(node.required.iter().cloned().map(Value::String).collect()),
            );
        }
    }

    if let Some(items) = &node.items {
        let items_path = format!("{path}[0]");
        map.insert("items".to_string(), render_node(items, &items_path, ctx));
    }

    if ctx.options.examples_limit > 0 {
        if let Some(cache) = ctx.examples {
            if let Some(values) = cache.get(path) {
                if !values.is_empty() {
                    let capped: Vec<Value> = values
                        .iter()
                        .take(ctx.options.examples_limit)
                        .cloned()
                        .collect();
                    map.insert("examples".to_string(), Value::Array(capped));
                }
            }
        }
    }

    Value::Object(map)
}

/// The format to emit for a node, if any.
///
/// Emitted only for a pure string node with a single unambiguous candidate:
/// the cache entry for the path when one exists, the node's own format
/// otherwise (trees merged outside a builder carry it themselves).
fn effective_format(node: &SchemaNode, path: &str, ctx: &RenderContext) -> Option<StringFormat> {
    if ctx.options.format_mode == FormatMode::Off {
        return None;
    }
    if node.type_names.len() != 1 || !node.type_names.contains(&Kind::String) {
        return None;
    }
    match ctx.formats {
        Some(cache) => match cache.get(path) {
            Some(observations) => observations.unambiguous(),
            None => node.format,
        },
        None => node.format,
    }
}

/// The draft 2020-12 vocabulary block that keeps `format` an annotation:
/// format-assertion disabled, format-annotation kept enabled.
fn format_annotation_vocabulary() -> Value {
    json!({
        "https://json-schema.org/draft/2020-12/vocab/core": true,
        "https://json-schema.org/draft/2020-12/vocab/applicator": true,
        "https://json-schema.org/draft/2020-12/vocab/validation": true,
        "https://json-schema.org/draft/2020-12/vocab/meta-data": true,
        "https://json-schema.org/draft/2020-12/vocab/format-annotation": true,
        "https://json-schema.org/draft/2020-12/vocab/format-assertion": false,
    })
}
