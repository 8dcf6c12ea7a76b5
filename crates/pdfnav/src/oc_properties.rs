//! Optional-content (layer) properties.
//!
//! The catalog's `OCProperties` dictionary configures optional-content
//! groups. This layer only materializes a working copy on demand; the
//! document close sequence writes a touched copy back into the catalog
//! dictionary.

use lopdf::{Dictionary, Object};

/// In-memory working copy of the catalog's `OCProperties` dictionary.
///
/// Once materialized through the catalog accessor, low-level edits go
/// through [`dictionary_mut`](OcProperties::dictionary_mut); the copy is
/// written back to the catalog dictionary when the document closes.
#[derive(Debug, Clone, PartialEq)]
pub struct OcProperties {
    dict: Dictionary,
}

impl OcProperties {
    pub(crate) fn new(dict: Dictionary) -> Self {
        OcProperties { dict }
    }

    pub(crate) fn empty() -> Self {
        OcProperties {
            dict: Dictionary::new(),
        }
    }

    /// The working dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Mutable access to the working dictionary.
    pub fn dictionary_mut(&mut self) -> &mut Dictionary {
        &mut self.dict
    }

    /// Set one entry on the working dictionary.
    pub fn set(&mut self, key: &str, value: Object) {
        self.dict.set(key, value);
    }
}
