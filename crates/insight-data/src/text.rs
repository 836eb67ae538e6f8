//! Small string helpers

use crate::codec::{deserialize, serialize};
use crate::{Error, Result};
use base64::prelude::*;
use serde::{Serialize, de::DeserializeOwned};

/// Compare two strings, ignoring case.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Encode a value as exchange text, then Base64 the UTF-8 bytes.
pub fn to_base64<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let text = serialize(value)?;
    Ok(BASE64_STANDARD.encode(text.as_bytes()))
}

/// Reverse of [`to_base64`].
pub fn from_base64<T: DeserializeOwned + Default>(encoded: &str) -> Result<T> {
    let bytes = BASE64_STANDARD.decode(encoded.trim())?;
    let text = String::from_utf8(bytes).map_err(Error::decode::<T>)?;
    deserialize(Some(&text))
}
