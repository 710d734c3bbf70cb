//! Codec Module
//!
//! Converts typed values to and from the JSON text kept in the store.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Serializes a value into its stored text form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Deserializes stored text back into a typed value.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

/// Reads a stored value as a counter.
///
/// Returns None when the text is not an integer; callers reset such values.
pub fn parse_counter(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
