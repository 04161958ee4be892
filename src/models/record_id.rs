//! Record identifiers
//!
//! Every backend hands out ids as opaque strings. The memory and table
//! backends use decimal row numbers, the document backend uses document keys.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque entity id, serialized as a JSON string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric row id, when the id is one
    pub fn as_i64(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        Ok(RecordId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RecordId, E> {
        Ok(RecordId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        Ok(RecordId(v.to_string()))
    }
}

// Clients send ids both as `"3"` and `3`
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_string_and_number() {
        let a: RecordId = serde_json::from_str("\"12\"").unwrap();
        let b: RecordId = serde_json::from_str("12").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_i64(), Some(12));
    }

    #[test]
    fn test_serializes_as_string() {
        let id = RecordId::from(5);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"5\"");
    }

    #[test]
    fn test_non_numeric_id() {
        let id = RecordId::new("65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(id.as_i64(), None);
    }
}
