//! Schema-less request bodies.
//!
//! A [`BodyMap`] is assembled per call with whatever shape the endpoint
//! expects, then encoded either as JSON or as a multipart form. Keys are kept
//! sorted so encoding is deterministic.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::ser::{Error as _, Serialize, SerializeMap as _, SerializeSeq as _, Serializer};
use std::collections::BTreeMap;
use weapi_types::{Result, WeError};

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content: Bytes,
    pub content_type: Option<String>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            content_type: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Any value a [`BodyMap`] entry can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    Scalar(Scalar),
    List(Vec<BodyValue>),
    Nested(BodyMap),
    /// Only encodable as a multipart part.
    File(FilePart),
}

/// An ordered string-keyed request body. Last write wins per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyMap {
    entries: BTreeMap<String, BodyValue>,
}

impl BodyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<BodyValue>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Stores a sub-map built by `build`.
    ///
    /// ```
    /// # use weapi_client::BodyMap;
    /// let mut body = BodyMap::new();
    /// body.set("action_name", "QR_LIMIT_SCENE")
    ///     .set_nested("action_info", |info| {
    ///         info.set_nested("scene", |scene| {
    ///             scene.set("scene_id", 42);
    ///         });
    ///     });
    /// ```
    pub fn set_nested(
        &mut self,
        key: impl Into<String>,
        build: impl FnOnce(&mut BodyMap),
    ) -> &mut Self {
        let mut nested = BodyMap::new();
        build(&mut nested);
        self.entries.insert(key.into(), BodyValue::Nested(nested));
        self
    }

    pub fn set_file(&mut self, key: impl Into<String>, file: FilePart) -> &mut Self {
        self.entries.insert(key.into(), BodyValue::File(file));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BodyValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<BodyValue> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry, at any depth, is a file part.
    #[must_use]
    pub fn has_files(&self) -> bool {
        self.entries.values().any(BodyValue::has_files)
    }

    /// Encodes the map as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Validation`] if the map contains a file part.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| WeError::Validation(e.to_string()))
    }

    /// Encodes the map as JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Validation`] if the map contains a file part.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| WeError::Validation(e.to_string()))
    }

    /// Builds a multipart form: files become file parts, scalars text fields,
    /// nested maps and lists JSON-encoded text fields.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Validation`] if a file sits below the top level or
    /// a part carries an invalid content type.
    pub fn to_multipart(&self) -> Result<Form> {
        let mut form = Form::new();
        for (key, value) in &self.entries {
            form = match value {
                BodyValue::File(file) => {
                    let mut part =
                        Part::bytes(file.content.to_vec()).file_name(file.file_name.clone());
                    if let Some(ct) = &file.content_type {
                        part = part.mime_str(ct).map_err(|e| {
                            WeError::Validation(format!("invalid content type for `{key}`: {e}"))
                        })?;
                    }
                    form.part(key.clone(), part)
                }
                BodyValue::Scalar(Scalar::Text(s)) => form.text(key.clone(), s.clone()),
                other => {
                    let text = serde_json::to_string(other)
                        .map_err(|e| WeError::Validation(format!("field `{key}`: {e}")))?;
                    form.text(key.clone(), text)
                }
            };
        }
        Ok(form)
    }
}

impl BodyValue {
    fn has_files(&self) -> bool {
        match self {
            Self::File(_) => true,
            Self::Scalar(_) => false,
            Self::List(items) => items.iter().any(Self::has_files),
            Self::Nested(map) => map.has_files(),
        }
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for BodyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(s) => s.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Nested(map) => map.serialize(serializer),
            Self::File(file) => Err(S::Error::custom(format!(
                "file part `{}` cannot be JSON-encoded; use a multipart upload",
                file.file_name
            ))),
        }
    }
}

impl Serialize for BodyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

impl From<Scalar> for BodyValue {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for BodyValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for BodyValue {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::Text(s))
    }
}

impl From<&String> for BodyValue {
    fn from(s: &String) -> Self {
        Self::Scalar(Scalar::Text(s.clone()))
    }
}

impl From<bool> for BodyValue {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i32> for BodyValue {
    fn from(i: i32) -> Self {
        Self::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<u32> for BodyValue {
    fn from(i: u32) -> Self {
        Self::Scalar(Scalar::Int(i64::from(i)))
    }
}

impl From<i64> for BodyValue {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for BodyValue {
    fn from(f: f64) -> Self {
        Self::Scalar(Scalar::Float(f))
    }
}

impl From<BodyMap> for BodyValue {
    fn from(m: BodyMap) -> Self {
        Self::Nested(m)
    }
}

impl From<FilePart> for BodyValue {
    fn from(f: FilePart) -> Self {
        Self::File(f)
    }
}

impl<T: Into<BodyValue>> From<Vec<T>> for BodyValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for BodyValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Scalar(Scalar::Int(i)),
                None => Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Self::Scalar(Scalar::Text(s)),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(obj) => {
                let mut map = BodyMap::new();
                for (k, v) in obj {
                    map.set(k, v);
                }
                Self::Nested(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_and_nesting() {
        let mut body = BodyMap::new();
        body.set("expire_seconds", 604_800)
            .set("action_name", "QR_STR_SCENE")
            .set_nested("action_info", |info| {
                info.set_nested("scene", |scene| {
                    scene.set("scene_str", "promo");
                });
            });
        assert_eq!(
            body.to_json().unwrap(),
            json!({
                "expire_seconds": 604_800,
                "action_name": "QR_STR_SCENE",
                "action_info": {"scene": {"scene_str": "promo"}}
            })
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut body = BodyMap::new();
        body.set("force_refresh", false).set("force_refresh", true);
        assert_eq!(body.len(), 1);
        assert_eq!(body.to_json().unwrap(), json!({"force_refresh": true}));
    }

    #[test]
    fn test_serialization_is_sorted() {
        let mut a = BodyMap::new();
        a.set("secret", "s").set("appid", "wx").set("grant_type", "client_credential");
        let mut b = BodyMap::new();
        b.set("grant_type", "client_credential").set("appid", "wx").set("secret", "s");
        let bytes = a.to_json_bytes().unwrap();
        assert_eq!(bytes, b.to_json_bytes().unwrap());
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"appid":"wx","grant_type":"client_credential","secret":"s"}"#
        );
    }

    #[test]
    fn test_lists() {
        let mut body = BodyMap::new();
        body.set("openid_list", vec!["o1", "o2"])
            .set("tagid_list", vec![1, 2, 3]);
        assert_eq!(
            body.to_json().unwrap(),
            json!({"openid_list": ["o1", "o2"], "tagid_list": [1, 2, 3]})
        );
    }

    #[test]
    fn test_from_json_value() {
        let mut body = BodyMap::new();
        body.set("button", json!([{"type": "click", "name": "Today", "key": "V1001"}]));
        body.set("score", json!(1.5));
        body.set("none", json!(null));
        assert_eq!(
            body.to_json().unwrap(),
            json!({
                "button": [{"type": "click", "name": "Today", "key": "V1001"}],
                "score": 1.5,
                "none": null
            })
        );
    }

    #[test]
    fn test_file_rejected_in_json() {
        let mut body = BodyMap::new();
        body.set_file("media", FilePart::new("a.jpg", vec![0xff, 0xd8]));
        assert!(body.has_files());
        let err = body.to_json().unwrap_err();
        match err {
            WeError::Validation(msg) => assert!(msg.contains("a.jpg")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_file_detected() {
        let mut body = BodyMap::new();
        body.set_nested("description", |d| {
            d.set_file("thumb", FilePart::new("t.png", vec![1]));
        });
        assert!(body.has_files());
        assert!(body.to_json_bytes().is_err());
    }

    #[test]
    fn test_multipart_builds() {
        let mut body = BodyMap::new();
        body.set_file(
            "media",
            FilePart::new("a.jpg", vec![0xff, 0xd8]).with_content_type("image/jpeg"),
        );
        body.set("type", "image");
        body.set_nested("description", |d| {
            d.set("title", "t");
        });
        let form = body.to_multipart().unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_multipart_bad_content_type() {
        let mut body = BodyMap::new();
        body.set_file(
            "media",
            FilePart::new("a.bin", vec![0]).with_content_type("not a mime"),
        );
        assert!(matches!(
            body.to_multipart(),
            Err(WeError::Validation(_))
        ));
    }

    #[test]
    fn test_remove_and_get() {
        let mut body = BodyMap::new();
        body.set("code", "abc");
        assert_eq!(
            body.get("code"),
            Some(&BodyValue::Scalar(Scalar::Text("abc".into())))
        );
        assert!(body.remove("code").is_some());
        assert!(body.is_empty());
    }
}
