//! JSON envelope (un)wrapping.
//!
//! Zendesk wraps every payload in an object keyed by the resource name:
//! `{"organization": {...}}` for one record, `{"organizations": [...]}` for
//! many. The key and cardinality are fixed by the call site.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{ApiError, Result};
use super::page::Page;

/// Whether an envelope holds one record or a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A wrapper key paired with its cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    key: &'static str,
    cardinality: Cardinality,
}

impl Envelope {
    /// Envelope around a single object, e.g. `{"job_status": {...}}`.
    pub const fn one(key: &'static str) -> Self {
        Self {
            key,
            cardinality: Cardinality::One,
        }
    }

    /// Envelope around a list, e.g. `{"job_statuses": [...]}`.
    pub const fn many(key: &'static str) -> Self {
        Self {
            key,
            cardinality: Cardinality::Many,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Wrap a request payload under this envelope's key.
    pub fn wrap<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Value> {
        let value = serde_json::to_value(payload).map_err(|e| {
            ApiError::Encoding(format!("cannot serialize '{}' payload: {}", self.key, e))
        })?;

        let mut envelope = Map::new();
        envelope.insert(self.key.to_string(), value);
        Ok(Value::Object(envelope))
    }

    /// Decode the payload under this envelope's key.
    ///
    /// For [`Cardinality::Many`] `T` is normally a `Vec`.
    pub fn unwrap<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T> {
        let mut document = self.parse(body)?;
        let payload = self.take_payload(&mut document)?;
        self.deserialize(payload)
    }

    /// Decode a list payload together with the inline pagination fields.
    pub fn unwrap_page<T: DeserializeOwned>(&self, body: &[u8]) -> Result<(Vec<T>, Page)> {
        let mut document = self.parse(body)?;
        let payload = self.take_payload(&mut document)?;
        let items = self.deserialize(payload)?;

        let page = serde_json::from_value(Value::Object(document))
            .map_err(|e| ApiError::Decode(format!("invalid pagination fields: {}", e)))?;
        Ok((items, page))
    }

    fn parse(&self, body: &[u8]) -> Result<Map<String, Value>> {
        let document: Value = serde_json::from_slice(body).map_err(|e| {
            ApiError::Decode(format!("'{}' response is not valid JSON: {}", self.key, e))
        })?;

        match document {
            Value::Object(map) => Ok(map),
            _ => Err(ApiError::Decode(format!(
                "expected a JSON object wrapping '{}'",
                self.key
            ))),
        }
    }

    fn take_payload(&self, document: &mut Map<String, Value>) -> Result<Value> {
        let payload = document
            .remove(self.key)
            .ok_or_else(|| ApiError::Decode(format!("missing '{}' key", self.key)))?;

        let shape_ok = match self.cardinality {
            Cardinality::One => payload.is_object(),
            Cardinality::Many => payload.is_array(),
        };
        if !shape_ok {
            let expected = match self.cardinality {
                Cardinality::One => "an object",
                Cardinality::Many => "an array",
            };
            return Err(ApiError::Decode(format!(
                "expected '{}' to be {}",
                self.key, expected
            )));
        }
        Ok(payload)
    }

    fn deserialize<T: DeserializeOwned>(&self, payload: Value) -> Result<T> {
        serde_json::from_value(payload)
            .map_err(|e| ApiError::Decode(format!("invalid '{}' payload: {}", self.key, e)))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Thing {
        id: i64,
        name: String,
    }

    const THING: Envelope = Envelope::one("thing");
    const THINGS: Envelope = Envelope::many("things");

    #[test]
    fn test_wrap_uses_fixed_key() {
        let wrapped = THING
            .wrap(&Thing {
                id: 1,
                name: "a".to_string(),
            })
            .unwrap();
        assert_eq!(wrapped, json!({"thing": {"id": 1, "name": "a"}}));
    }

    #[test]
    fn test_unwrap_one() {
        let thing: Thing = THING
            .unwrap(br#"{"thing": {"id": 3, "name": "x"}}"#)
            .unwrap();
        assert_eq!(thing.id, 3);
    }

    #[test]
    fn test_unwrap_many() {
        let things: Vec<Thing> = THINGS
            .unwrap(br#"{"things": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}"#)
            .unwrap();
        assert_eq!(things.len(), 2);
    }

    #[test]
    fn test_missing_key_is_decode_error() {
        let err = THING.unwrap::<Thing>(br#"{"other": {}}"#).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("missing 'thing' key"));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = THINGS
            .unwrap::<Vec<Thing>>(br#"{"things": {"id": 1, "name": "a"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("to be an array"));

        let err = THING.unwrap::<Thing>(br#"{"thing": []}"#).unwrap_err();
        assert!(err.to_string().contains("to be an object"));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = THING.unwrap::<Thing>(b"<html>").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_top_level_array_is_decode_error() {
        let err = THINGS.unwrap::<Vec<Thing>>(b"[]").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_unwrap_page_reads_inline_cursor() {
        let body = json!({
            "things": [{"id": 1, "name": "a"}],
            "next_page": "https://acme.zendesk.com/api/v2/things.json?page=2",
            "previous_page": null,
            "count": 2
        })
        .to_string();
        let (things, page): (Vec<Thing>, Page) = THINGS.unwrap_page(body.as_bytes()).unwrap();
        assert_eq!(things.len(), 1);
        assert!(page.has_next());
        assert_eq!(page.count(), Some(2));
    }

    #[test]
    fn test_unwrap_page_without_cursor_fields() {
        let (things, page): (Vec<Thing>, Page) =
            THINGS.unwrap_page(br#"{"things": []}"#).unwrap();
        assert!(things.is_empty());
        assert!(!page.has_next());
        assert_eq!(page.count(), None);
    }
}
