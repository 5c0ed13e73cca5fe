//! Typed work class identifier.

use std::fmt;
use std::str::FromStr;

use crate::WorkloadError;

/// Maximum identifier length in bytes.
const MAX_TYPE_ID_LEN: usize = 64;

/// Identifier of one request category (e.g. `type1`, `chat-long`).
///
/// Identifiers are stable across a run and are used as mapping keys for
/// per-type requirements, so they are compared and ordered as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(String);

impl TypeId {
    /// Parses an identifier.
    ///
    /// Accepts 1 to 64 bytes of ASCII alphanumerics, `_`, `-` and `.`.
    pub fn parse(s: &str) -> Result<Self, WorkloadError> {
        if s.is_empty() {
            return Err(WorkloadError::InvalidTypeId {
                value: String::new(),
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_TYPE_ID_LEN {
            return Err(WorkloadError::InvalidTypeId {
                value: s.to_string(),
                reason: "must be at most 64 bytes",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            return Err(WorkloadError::InvalidTypeId {
                value: s.to_string(),
                reason: "only ASCII alphanumerics, '_', '-' and '.' are allowed",
            });
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeId {
    type Err = WorkloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for TypeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TypeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        let id = TypeId::parse("type1").unwrap();
        assert_eq!(id.to_string(), "type1");
        let parsed: TypeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_type_id_empty() {
        let result: Result<TypeId, _> = "".parse();
        assert!(matches!(
            result.unwrap_err(),
            WorkloadError::InvalidTypeId { .. }
        ));
    }

    #[test]
    fn test_type_id_too_long() {
        let long = "a".repeat(65);
        assert!(TypeId::parse(&long).is_err());
        assert!(TypeId::parse(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_type_id_rejects_whitespace() {
        assert!(TypeId::parse("type 1").is_err());
        assert!(TypeId::parse("chat-long.v2_a").is_ok());
    }

    #[test]
    fn test_type_id_json_roundtrip() {
        let id = TypeId::parse("chat-long").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"chat-long\"");
        let parsed: TypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_type_id_json_rejects_invalid() {
        let result: Result<TypeId, _> = serde_json::from_str("\"bad id\"");
        assert!(result.is_err());
    }
}
