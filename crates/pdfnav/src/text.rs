//! PDF text-string decoding.
//!
//! PDF text strings are either UTF-16BE with a leading BOM or bytes in a
//! Latin-1-compatible encoding. Keys and titles run through
//! [`decode_text_string`]; PDF name objects, which are plain byte
//! sequences, go through [`decode_name`].

use crate::error::CatalogError;

/// Decode a PDF text string.
///
/// A UTF-16BE BOM (`0xFE 0xFF`) selects UTF-16BE decoding via
/// [`encoding_rs`]; otherwise the bytes are tried as UTF-8 and fall back
/// to a byte-wise Latin-1 interpretation, which cannot fail.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedText`] when the BOM is present but the
/// remaining bytes are not well-formed UTF-16BE (odd length or unpaired
/// surrogates). Titles and name-tree keys must decode; dropping characters
/// here would silently corrupt lookup keys.
pub(crate) fn decode_text_string(bytes: &[u8]) -> Result<String, CatalogError> {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let (text, had_errors) = encoding_rs::UTF_16BE.decode_without_bom_handling(&bytes[2..]);
        if had_errors {
            return Err(CatalogError::MalformedText);
        }
        Ok(text.into_owned())
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decode a PDF name object's bytes to text, lossily.
pub(crate) fn decode_name(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
