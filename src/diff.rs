//! Structural schema diffing and text rendering.
//!
//! Compares two JSON Schema documents in lock-step and produces an ordered
//! list of path-scoped changes plus a human-readable report. Missing and
//! empty keywords are treated uniformly: an absent keyword is simply no
//! change relative to an equally-absent one.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Category of a single change. Part of the contract: consumers key off
/// these to decide whether a change is additive or destructive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Replaced,
}

/// One path-scoped change between two schema documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Raw key path into the documents (structural segments included).
    pub path: Vec<String>,
    /// Value on the old side, absent for additions.
    pub old: Option<Value>,
    /// Value on the new side, absent for removals.
    pub new: Option<Value>,
}

impl DiffEntry {
    /// The category of this change.
    pub fn kind(&self) -> ChangeKind {
        match (&self.old, &self.new) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Removed,
            _ => ChangeKind::Replaced,
        }
    }

    /// The readable rendering of the path.
    ///
    /// Structural segments `properties` and `items` are elided. The
    /// keywords `type`, `required`, and `format` render as dotted suffixes
    /// unless they are literal property names, which render bracketed and
    /// quoted, as does any other schema keyword.
    pub fn display_path(&self) -> String {
        format_path(&self.path)
    }
}

/// An ordered set of changes between two schema documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    pub entries: Vec<DiffEntry>,
}

impl SchemaDiff {
    /// True when the documents were structurally identical.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the diff as text, optionally with ANSI colour: additions
    /// green, removals red, replacements cyan.
    pub fn render(&self, color: bool) -> String {
        let painter = Painter { enabled: color };
        let mut lines: Vec<String> = Vec::new();

        for entry in &self.entries {
            let path = entry.display_path();
            match (&entry.old, &entry.new) {
                (Some(Value::Array(old)), Some(Value::Array(new))) => {
                    lines.extend(render_list_diff(&path, old, new, &painter));
                }
                (None, Some(Value::Array(new))) => {
                    lines.extend(render_list_diff(&path, &[], new, &painter));
                }
                (Some(Value::Array(old)), None) => {
                    lines.extend(render_list_diff(&path, old, &[], &painter));
                }
                (None, Some(value)) => {
                    lines.push(painter.paint(GREEN, &format!("+ {path}: {}", compact(value))));
                }
                (Some(value), None) => {
                    lines.push(painter.paint(RED, &format!("- {path}: {}", compact(value))));
                }
                (Some(old), Some(new)) if is_terminal(old) && is_terminal(new) => {
                    lines.push(painter.paint(
                        CYAN,
                        &format!("r {path}: {} -> {}", compact(old), compact(new)),
                    ));
                }
                (Some(old), Some(new)) => {
                    lines.push(format!("- {path}:"));
                    for line in pretty(old).lines() {
                        lines.push(painter.paint(RED, &format!("  {line}")));
                    }
                    lines.push(format!("+ {path}:"));
                    for line in pretty(new).lines() {
                        lines.push(painter.paint(GREEN, &format!("  {line}")));
                    }
                }
                (None, None) => {}
            }
            lines.push(String::new());
        }

        let mut text = lines.join("\n");
        while text.ends_with('\n') {
            text.pop();
        }
        text
    }
}

/// Compare two JSON Schema documents.
///
/// Entry order is deterministic: keys of the new document first, in
/// document order, then keys only the old document has.
pub fn diff_schemas(old: &Value, new: &Value) -> SchemaDiff {
    let mut entries = Vec::new();
    let mut path = Vec::new();
    find_differences(old, new, &mut path, &mut entries);
    SchemaDiff { entries }
}

fn find_differences(
    old: &Value,
    new: &Value,
    path: &mut Vec<String>,
    out: &mut Vec<DiffEntry>,
) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut keys: Vec<&String> = new_map.keys().collect();
            keys.extend(old_map.keys().filter(|k| !new_map.contains_key(*k)));

            for key in keys {
                path.push(key.clone());
                match (old_map.get(key), new_map.get(key)) {
                    (None, Some(added)) => out.push(DiffEntry {
                        path: path.clone(),
                        old: None,
                        new: Some(added.clone()),
                    }),
                    (Some(removed), None) => out.push(DiffEntry {
                        path: path.clone(),
                        old: Some(removed.clone()),
                        new: None,
                    }),
                    (Some(old_value), Some(new_value)) => {
                        if old_value.is_object() && new_value.is_object() {
                            find_differences(old_value, new_value, path, out);
                        } else if old_value != new_value {
                            out.push(DiffEntry {
                                path: path.clone(),
                                old: Some(old_value.clone()),
                                new: Some(new_value.clone()),
                            });
                        }
                    }
                    (None, None) => {}
                }
                path.pop();
            }
        }
        _ => {
            if old != new {
                out.push(DiffEntry {
                    path: path.clone(),
                    old: Some(old.clone()),
                    new: Some(new.clone()),
                });
            }
        }
    }
}

fn format_path(path: &[String]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if segment == "properties" || segment == "items" {
            continue;
        }
        let under_properties = i > 0 && path[i - 1] == "properties";
        let keyword = matches!(segment.as_str(), "type" | "required" | "format");

        if keyword && !under_properties {
            out.push('.');
            out.push_str(segment);
        } else if under_properties && !keyword {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        } else {
            // Property names shadowing keywords, and any other keyword,
            // render bracketed and quoted.
            out.push('[');
            out.push_str(&json_quote(segment));
            out.push(']');
        }
    }
    out
}

fn json_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

fn render_list_diff(path: &str, old: &[Value], new: &[Value], painter: &Painter) -> Vec<String> {
    let mut lines = vec![format!("  {path}:")];

    // Item order is driven by the new list, then any remaining old-only items.
    let mut ordered: Vec<&Value> = Vec::new();
    for item in new.iter().chain(old.iter()) {
        if !ordered.iter().any(|seen| *seen == item) {
            ordered.push(item);
        }
    }

    let mut rendered: Vec<String> = Vec::new();
    for item in ordered {
        let text = compact(item);
        let in_old = old.contains(item);
        let in_new = new.contains(item);
        let line = if in_old && !in_new {
            painter.paint(RED, &format!("-    {text},"))
        } else if !in_old && in_new {
            painter.paint(GREEN, &format!("+    {text},"))
        } else {
            format!("     {text},")
        };
        rendered.push(line);
    }

    // Trailing comma comes off the last item.
    if let Some(last) = rendered.last_mut() {
        if let Some(pos) = last.rfind(',') {
            last.remove(pos);
        }
    }

    lines.extend(rendered);
    lines
}

fn is_terminal(value: &Value) -> bool {
    !value.is_object() && !value.is_array()
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

struct Painter {
    enabled: bool,
}

impl Painter {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Canonical sorted-key, compact JSON encoding, used for hashing.
pub fn canonical_json(value: &Value) -> String {
    fn sort(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut out = Map::new();
                for key in keys {
                    if let Some(child) = map.get(key) {
                        out.insert(key.clone(), sort(child));
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    serde_json::to_string(&sort(value)).unwrap_or_default()
}

/// Single-slot memo over rendered diffs, keyed by a content hash of the
/// canonical encoding of both inputs.
///
/// Owned by the caller; holds at most one cached result and is not
/// synchronized, so share it across threads behind a mutex or not at all.
#[derive(Debug, Default)]
pub struct DiffCache {
    slot: Option<([u8; 32], String)>,
}

impl DiffCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the diff of a schema pair, reusing the cached text when the
    /// same pair (and colour setting) was rendered last.
    pub fn render(&mut self, old: &Value, new: &Value, color: bool) -> String {
        let key = pair_digest(old, new, color);
        if let Some((cached_key, text)) = &self.slot {
            if *cached_key == key {
                return text.clone();
            }
        }
        let text = diff_schemas(old, new).render(color);
        self.slot = Some((key, text.clone()));
        text
    }

    /// Drop the cached result.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

fn pair_digest(old: &Value, new: &Value, color: bool) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([u8::from(color)]);
    // Separators keep (a|b) distinct from (ab|empty).
    hasher.update([0u8]);
    hasher.update(canonical_json(old).as_bytes());
    hasher.update([1u8]);
    hasher.update(canonical_json(new).as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_documents_yield_empty_diff() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        assert!(diff_schemas(&schema, &schema).is_empty());
    }

    #[test]
    fn type_change_is_one_replace_entry() {
        let diff = diff_schemas(&json!({"type": "integer"}), &json!({"type": "string"}));
        assert_eq!(diff.entries.len(), 1);
        let entry = &diff.entries[0];
        assert_eq!(entry.kind(), ChangeKind::Replaced);
        assert_eq!(entry.display_path(), ".type");
        assert_eq!(
            diff.render(false),
            "r .type: \"integer\" -> \"string\""
        );
    }

    #[test]
    fn added_property_is_categorized_added() {
        let old = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let new = json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer"},
                "b": {"type": "string"}
            }
        });
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries.len(), 1);
        assert_eq!(diff.entries[0].kind(), ChangeKind::Added);
        assert_eq!(diff.entries[0].display_path(), "b");
        assert_eq!(diff.render(false), "+ b: {\"type\":\"string\"}");
    }

    #[test]
    fn removed_property_is_categorized_removed() {
        let old = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
        let new = json!({"type": "object", "properties": {}});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries.len(), 1);
        assert_eq!(diff.entries[0].kind(), ChangeKind::Removed);
        assert_eq!(diff.entries[0].display_path(), "a");
    }

    #[test]
    fn nested_paths_elide_structural_segments() {
        let old = json!({
            "properties": {"foo": {"properties": {"bar": {"type": "integer"}}}}
        });
        let new = json!({
            "properties": {"foo": {"properties": {"bar": {"type": "string"}}}}
        });
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries[0].display_path(), "foo.bar.type");
    }

    #[test]
    fn items_segments_are_elided() {
        let old = json!({"items": {"type": "integer"}});
        let new = json!({"items": {"type": "string"}});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries[0].display_path(), ".type");
    }

    #[test]
    fn property_named_type_renders_bracketed() {
        let old = json!({"properties": {"type": {"type": "integer"}}});
        let new = json!({"properties": {"type": {"type": "string"}}});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries[0].display_path(), "[\"type\"].type");
    }

    #[test]
    fn other_keywords_render_bracketed() {
        let old = json!({"additionalProperties": false});
        let new = json!({"additionalProperties": true});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries[0].display_path(), "[\"additionalProperties\"]");
    }

    #[test]
    fn required_list_renders_with_item_markers() {
        let old = json!({"required": ["a", "b"]});
        let new = json!({"required": ["a", "c"]});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries.len(), 1);
        let report = diff.render(false);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "  .required:",
                "     \"a\",",
                "+    \"c\",",
                "-    \"b\""
            ]
        );
    }

    #[test]
    fn required_added_from_absent_marks_all_items() {
        let old = json!({"type": "object"});
        let new = json!({"type": "object", "required": ["a"]});
        let diff = diff_schemas(&old, &new);
        assert_eq!(diff.entries[0].kind(), ChangeKind::Added);
        let report = diff.render(false);
        assert!(report.contains("  .required:"));
        assert!(report.contains("+    \"a\""));
    }

    #[test]
    fn colored_output_wraps_markers() {
        let diff = diff_schemas(&json!({"type": "integer"}), &json!({"type": "string"}));
        let report = diff.render(true);
        assert!(report.starts_with("\x1b[36mr .type:"));
        assert!(report.ends_with("\x1b[0m"));
    }

    #[test]
    fn structure_replacing_scalar_renders_both_blocks() {
        let old = json!({"x": true});
        let new = json!({"x": {"type": "string"}});
        let diff = diff_schemas(&old, &new);
        let report = diff.render(false);
        assert!(report.contains("- [\"x\"]:"));
        assert!(report.contains("+ [\"x\"]:"));
        assert!(report.contains("  true"));
    }

    #[test]
    fn canonical_json_sorts_keys_recursively() {
        let value = json!({"b": {"d": 1, "c": 2}, "a": [{"z": 1, "y": 2}]});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":[{"y":2,"z":1}],"b":{"c":2,"d":1}}"#
        );
    }

    #[test]
    fn canonicalization_ignores_key_order() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn cache_returns_same_text_for_same_pair() {
        let old = json!({"type": "integer"});
        let new = json!({"type": "string"});
        let mut cache = DiffCache::new();
        let first = cache.render(&old, &new, false);
        let second = cache.render(&old, &new, false);
        assert_eq!(first, second);
        assert_eq!(first, diff_schemas(&old, &new).render(false));
    }

    #[test]
    fn cache_recomputes_after_invalidate_and_new_pair() {
        let mut cache = DiffCache::new();
        let a = json!({"type": "integer"});
        let b = json!({"type": "string"});
        let c = json!({"type": "boolean"});

        let first = cache.render(&a, &b, false);
        cache.invalidate();
        assert_eq!(cache.render(&a, &b, false), first);

        let other = cache.render(&a, &c, false);
        assert_ne!(other, first);
    }
}
