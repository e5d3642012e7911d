//! Query string encoding for list and lookup options.
//!
//! Option structs are plain `Serialize` types. Their fields are walked in
//! declaration order: scalars become `key=value`, sequences become repeated
//! `key[]=value` pairs, and `None` fields are left out. A sequence field may
//! already be named `key[]` so it can sit next to a scalar `key`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, Result};

/// Pagination options shared by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl PageOptions {
    pub fn new(per_page: u32, page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            page: Some(page),
        }
    }
}

/// The id filter of `show_many` endpoints, rendered as a comma-joined list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShowMany {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<String>,
}

impl ShowMany {
    pub fn ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            ids: Some(join_ids(ids)),
            external_ids: None,
        }
    }

    pub fn external_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            ids: None,
            external_ids: Some(join_ids(ids)),
        }
    }
}

/// Append the encoded `opts` to `path`.
///
/// `None` yields the bare path.
pub fn add_options<T: Serialize>(path: &str, opts: Option<&T>) -> Result<String> {
    let Some(opts) = opts else {
        return Ok(path.to_string());
    };

    let query = encode(opts)?;
    if query.is_empty() {
        return Ok(path.to_string());
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}", path, separator, query))
}

/// Encode `opts` as a percent-encoded query string (without the leading `?`).
pub fn encode<T: Serialize>(opts: &T) -> Result<String> {
    let pairs = to_pairs(opts)?;
    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&"))
}

/// Flatten `opts` into ordered key/value pairs.
pub fn to_pairs<T: Serialize>(opts: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(opts)
        .map_err(|e| ApiError::Encoding(format!("cannot serialize options: {}", e)))?;

    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(ApiError::Encoding(format!(
                "options must be a struct or map, got {}",
                kind(&other)
            )))
        }
    };

    let mut pairs = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let array_key = if key.ends_with("[]") {
                    key.clone()
                } else {
                    format!("{}[]", key)
                };
                for item in items {
                    let item = scalar(&key, item)?;
                    pairs.push((array_key.clone(), item));
                }
            }
            other => pairs.push((key.clone(), scalar(&key, other)?)),
        }
    }
    Ok(pairs)
}

/// Join ids into the comma-separated form `show_many` endpoints expect.
pub fn join_ids<I, T>(ids: I) -> String
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn scalar(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ApiError::Encoding(format!(
            "field '{}' has unsupported type {}",
            key,
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
