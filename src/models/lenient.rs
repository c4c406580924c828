//! Deserializers for fields whose JSON type depends on the load that
//! produced the document. Identifiers, UPCs and nutrient numbers appear as
//! strings in some documents and as integers in others, and any of them may
//! be `null`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A string or a number, rendered as a string. `null` is the empty string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string_or_number(deserializer)?.unwrap_or_default())
}

/// As [`string_or_number`], with `null` kept as `None`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Null => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// An integer stored either as a number or as a numeric string. `null` and
/// the empty string are zero.
pub fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("expected an integer, got {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {s:?}"))),
        Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!(
            "expected integer or string, got {other}"
        ))),
    }
}
