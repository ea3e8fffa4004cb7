//! The in-memory schema representation and the recursive merge over it.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::InferError;
use crate::format::StringFormat;
use crate::types::Kind;

/// A node in an inferred schema tree.
///
/// Invariants:
/// - `type_names` is never empty.
/// - `required` is always a subset of `properties` keys.
/// - `format` is set only when `type_names` is exactly `{string}`.
///
/// Ordered collections make structural equality independent of insertion
/// order, so merged trees compare equal regardless of observation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    /// The set of primitive kinds observed at this location.
    pub type_names: BTreeSet<Kind>,
    /// Child schemas per property name; non-empty only for object nodes.
    pub properties: BTreeMap<String, SchemaNode>,
    /// Unified element schema; present only for arrays observed non-empty.
    pub items: Option<Box<SchemaNode>>,
    /// Property names present in every merged observation of this node.
    pub required: BTreeSet<String>,
    /// Unambiguous detected string format, if any.
    pub format: Option<StringFormat>,
}

impl SchemaNode {
    /// Create a leaf node for a single kind.
    pub fn of_kind(kind: Kind) -> Self {
        let mut type_names = BTreeSet::new();
        type_names.insert(kind);
        Self {
            type_names,
            properties: BTreeMap::new(),
            items: None,
            required: BTreeSet::new(),
            format: None,
        }
    }
}

/// Merge two schema nodes into their union.
///
/// Commutative, associative, and idempotent, so a left-fold over any
/// sequence of observations yields the same tree regardless of order.
///
/// - `type_names` is the union of both sides.
/// - Object properties are unioned; shared keys merge recursively, keys on
///   one side only are carried over unchanged. `required` is recomputed as
///   the intersection of both sides' `required` sets, which is how
///   optionality emerges across repeated observations.
/// - Array `items` unify into a single element schema.
/// - `format` survives only when both sides agree and the merged node is
///   still purely a string.
///
/// # Errors
///
/// Returns [`InferError::MalformedNode`] when either operand violates a
/// `SchemaNode` invariant. This is an internal-invariant violation and is
/// never silently repaired.
pub fn merge(a: &SchemaNode, b: &SchemaNode) -> Result<SchemaNode, InferError> {
    check_well_formed(a)?;
    check_well_formed(b)?;

    let mut merged = SchemaNode {
        type_names: a.type_names.union(&b.type_names).copied().collect(),
        properties: BTreeMap::new(),
        items: None,
        required: BTreeSet::new(),
        format: None,
    };

    if merged.type_names.contains(&Kind::Object) {
        let keys: BTreeSet<&String> = a.properties.keys().chain(b.properties.keys()).collect();
        for key in keys {
            let child = match (a.properties.get(key), b.properties.get(key)) {
                (Some(pa), Some(pb)) => merge(pa, pb)?,
                (Some(pa), None) => pa.clone(),
                (None, Some(pb)) => pb.clone(),
                (None, None) => unreachable!("key comes from one of the two maps"),
            };
            merged.properties.insert(key.clone(), child);
        }
        merged.required = a.required.intersection(&b.required).cloned().collect();
    }

    if merged.type_names.contains(&Kind::Array) {
        merged.items = match (&a.items, &b.items) {
            (Some(ia), Some(ib)) => Some(Box::new(merge(ia, ib)?)),
            (Some(ia), None) => Some(ia.clone()),
            (None, Some(ib)) => Some(ib.clone()),
            (None, None) => None,
        };
    }

    if merged.type_names.len() == 1
        && merged.type_names.contains(&Kind::String)
        && a.format == b.format
    {
        merged.format = a.format;
    }

    Ok(merged)
}

fn check_well_formed(node: &SchemaNode) -> Result<(), InferError> {
    if node.type_names.is_empty() {
        return Err(InferError::MalformedNode {
            reason: "type_names must not be empty".into(),
        });
    }
    if let Some(key) = node
        .required
        .iter()
        .find(|k| !node.properties.contains_key(*k))
    {
        return Err(InferError::MalformedNode {
            reason: format!("required key \"{}\" is not in properties", key),
        });
    }
    if node.format.is_some()
        && !(node.type_names.len() == 1 && node.type_names.contains(&Kind::String))
    {
        return Err(InferError::MalformedNode {
            reason: "format is only valid on a pure string node".into(),
        });
    }
    Ok(())
}
