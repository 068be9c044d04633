//! The `{errcode, errmsg}` envelope carried by every platform response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimal response shape used to classify a body before decoding it fully.
///
/// `errcode == 0` (or absent) means business success regardless of HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

impl ResponseEnvelope {
    /// Reads the envelope out of an arbitrary JSON body.
    ///
    /// Returns `None` for anything but a JSON object. Within an object the
    /// fields are read leniently: `errcode` may be a number or a numeric
    /// string, and a missing, null or non-string `errmsg` reads as empty.
    /// An `errcode` that is present but unreadable reads as `-1`.
    #[must_use]
    pub fn from_value(body: &Value) -> Option<Self> {
        let obj = body.as_object()?;
        let errcode = match obj.get("errcode") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(-1),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(-1),
            Some(Value::Null) | None => 0,
            Some(_) => -1,
        };
        let errmsg = obj
            .get("errmsg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { errcode, errmsg })
    }

    /// Same as [`from_value`](Self::from_value) on raw bytes; bodies that are
    /// not JSON read as `None`.
    #[must_use]
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        Self::from_value(&value)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errcode == 0
    }
}
