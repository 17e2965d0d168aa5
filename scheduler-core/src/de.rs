//! Lenient deserializers for fields the API sends with varying JSON types.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

/// Accept `"42"`, `42` or `null`; blank strings become `None`.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value
        .map(StringOrNumber::into_string)
        .filter(|s| !s.trim().is_empty()))
}

/// Accept a semester index as `2` or `"2"`.
pub fn u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Int(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Float(f) => Err(serde::de::Error::custom(format!(
            "expected an integer, got {f}"
        ))),
    }
}

/// Blank strings are treated the same as a missing value.
pub fn opt_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
