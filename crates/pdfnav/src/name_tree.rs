//! Name-tree flattening.
//!
//! A PDF name tree maps text keys to arbitrary objects through nested
//! dictionaries: leaves carry a `Names` array of alternating key/value
//! slots, internal nodes carry a `Kids` array of child dictionaries. A
//! malformed or boundary-aligned document may split a key from its value
//! across sibling leaves — the key then dangles at the end of one `Names`
//! array and its value is the first slot of the next leaf. The flattener
//! recombines such pairs by threading a *carry* (the pending key) through
//! the traversal instead of dropping or rejecting the dangling key.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::resolve;
use crate::error::{CatalogError, Limits};
use crate::text::decode_text_string;

/// Flatten a name-tree node into `items`, returning the carry left over
/// after this subtree.
///
/// `carry` is a key read earlier whose value has not been found yet; when
/// set, the first slot encountered in the next leaf is consumed as its
/// value. A key read at the end of an odd-length `Names` array becomes the
/// returned carry. A dictionary with neither `Names` nor `Kids` passes the
/// carry through untouched.
///
/// Key slots that are not strings are skipped together with their value
/// slot; values are stored as-is with indirect references resolved.
///
/// # Errors
///
/// Fails on a revisited kid (cycle), on nesting deeper than
/// `limits.max_name_tree_depth`, and on a key that does not decode.
pub(crate) fn flatten(
    graph: &Document,
    node: &Dictionary,
    items: &mut HashMap<String, Object>,
    carry: Option<String>,
    depth: usize,
    limits: &Limits,
    visited: &mut HashSet<ObjectId>,
) -> Result<Option<String>, CatalogError> {
    if depth >= limits.max_name_tree_depth {
        return Err(Limits::exceeded(
            "max_name_tree_depth",
            limits.max_name_tree_depth,
        ));
    }

    let mut carry = carry;

    let entry_array = |key: &[u8]| {
        node.get(key)
            .ok()
            .map(|obj| resolve(graph, obj))
            .and_then(|obj| obj.as_array().ok())
    };

    if let Some(names) = entry_array(b"Names") {
        let mut k = 0;
        while k < names.len() {
            if let Some(key) = carry.take() {
                // The pending key's value spilled into this leaf.
                items.insert(key, resolve(graph, &names[k]).clone());
                k += 1;
                continue;
            }
            let key = match resolve(graph, &names[k]) {
                Object::String(bytes, _) => decode_text_string(bytes)?,
                _ => {
                    // Not a usable key; skip the pair.
                    k += 2;
                    continue;
                }
            };
            if k + 1 < names.len() {
                items.insert(key, resolve(graph, &names[k + 1]).clone());
                k += 2;
            } else {
                // Odd-length array: the value lives in the next sibling leaf.
                return Ok(Some(key));
            }
        }
        return Ok(carry);
    }

    if let Some(kids) = entry_array(b"Kids") {
        for kid in kids {
            if let Object::Reference(id) = kid {
                if !visited.insert(*id) {
                    return Err(CatalogError::NameTreeCycle(*id));
                }
            }
            let Object::Dictionary(kid) = resolve(graph, kid) else {
                continue;
            };
            carry = flatten(graph, kid, items, carry, depth + 1, limits, visited)?;
        }
        return Ok(carry);
    }

    Ok(carry)
}
