//! Named-destination resolution.
//!
//! A catalog can store named destinations in two places: a legacy flat
//! `Dests` dictionary keyed by PDF names, and the `Names` → `Dests` name
//! tree keyed by PDF strings. [`named_destinations`] merges both into a
//! single text-keyed map of destination arrays.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object};

use crate::document::resolve;
use crate::error::{CatalogError, Limits};
use crate::name_tree;
use crate::text::decode_name;

/// Build the merged name → destination-array map for a catalog.
///
/// The flat `Dests` dictionary is read first, then the `Names` → `Dests`
/// name tree is flattened and overlaid on top, so a tree entry wins when
/// both sources define the same name. The precedence matches the behavior
/// PDF consumers have come to rely on and is deliberately not reordered.
///
/// Values that do not coerce to a destination array (see
/// [`coerce_to_destination`]) are dropped without error.
///
/// # Errors
///
/// Propagates name-tree traversal failures (cycles, depth limit, key
/// decoding).
pub(crate) fn named_destinations(
    graph: &Document,
    catalog_dict: &Dictionary,
    limits: &Limits,
) -> Result<HashMap<String, Vec<Object>>, CatalogError> {
    let mut merged = HashMap::new();

    if let Some(dests) = entry_dictionary(graph, catalog_dict, b"Dests") {
        for (key, value) in dests.iter() {
            if let Some(array) = coerce_to_destination(graph, value) {
                merged.insert(decode_name(key), array);
            }
        }
    }

    let tree_root = entry_dictionary(graph, catalog_dict, b"Names")
        .and_then(|names| entry_dictionary(graph, names, b"Dests"));
    if let Some(tree_root) = tree_root {
        let mut items = HashMap::new();
        let mut visited = HashSet::new();
        // A carry left over after the last leaf has no value to pair with
        // and is dropped here.
        name_tree::flatten(graph, tree_root, &mut items, None, 0, limits, &mut visited)?;
        for (key, value) in items {
            if let Some(array) = coerce_to_destination(graph, &value) {
                merged.insert(key, array);
            }
        }
    }

    Ok(merged)
}

/// Apply the destination array-coercion rule to one value.
///
/// An array is used as-is. A dictionary is accepted only when it holds an
/// array under `D`. Anything else is rejected with `None`; the caller
/// drops the entry. Indirect references are resolved before the type test.
pub(crate) fn coerce_to_destination(graph: &Document, value: &Object) -> Option<Vec<Object>> {
    match resolve(graph, value) {
        Object::Array(array) => Some(array.clone()),
        Object::Dictionary(dict) => match dict.get(b"D").map(|d| resolve(graph, d)) {
            Ok(Object::Array(array)) => Some(array.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Look up `key` on a dictionary and resolve it to a dictionary.
fn entry_dictionary<'a>(
    graph: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .map(|obj| resolve(graph, obj))
        .and_then(|obj| obj.as_dict().ok())
}
