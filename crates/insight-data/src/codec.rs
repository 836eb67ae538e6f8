//! Canonical JSON encoding of structured values
//!
//! Every conversion in this crate goes through the same exchange text, so a
//! value serialized here can be decoded into any type whose shape overlaps.

use crate::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Serialize a value to compact exchange text.
///
/// Output is deterministic for a given type: struct fields appear in
/// declaration order.
///
/// # Errors
///
/// Returns [`Error::Encode`] for values JSON cannot represent, such as maps
/// keyed by non-string types.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Encode {
        message: e.to_string(),
    })
}

/// Serialize a value to indented exchange text, for files meant to be read.
pub fn serialize_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Encode {
        message: e.to_string(),
    })
}

/// Deserialize exchange text into `T`.
///
/// `None`, an empty string, or whitespace-only input yields `T::default()`.
/// Unknown fields are ignored. Missing fields fall back to their defaults
/// only when `T` opts in with `#[serde(default)]`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the text is not well-formed JSON or its shape
/// cannot be coerced into `T`.
pub fn deserialize<T: DeserializeOwned + Default>(text: Option<&str>) -> Result<T> {
    match text {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(text).map_err(Error::decode::<T>)
        }
        _ => Ok(T::default()),
    }
}
