//! Document identifier type
//!
//! Every stored document, whatever its collection, is keyed by one opaque
//! [`Identifier`]: twelve bytes rendered as 24 lowercase hex characters.
//! The first four bytes are the big-endian creation second, the remaining
//! eight are random.

use super::errors::MedrecordError;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ID_LEN: usize = 12;

/// Opaque document identifier
///
/// # Examples
///
/// ```
/// use medrecord::domain::ids::Identifier;
/// use std::str::FromStr;
///
/// let id = Identifier::from_str("65228f30a1b2c3d4e5f60718").unwrap();
/// assert_eq!(id.to_string(), "65228f30a1b2c3d4e5f60718");
/// assert!(Identifier::from_str("not-an-id").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; ID_LEN]);

impl Identifier {
    /// Generates a fresh identifier stamped with the current time
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_LEN];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        let tail: [u8; 8] = rand::random();
        bytes[4..].copy_from_slice(&tail);
        Self(bytes)
    }

    /// Parses a hex identifier
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` unless the input is exactly 24 hex chars.
    pub fn parse(hex_str: &str) -> Result<Self, MedrecordError> {
        let trimmed = hex_str.trim();
        if trimmed.len() != ID_LEN * 2 {
            return Err(MedrecordError::InvalidIdentifier(format!(
                "expected {} hex characters, got '{}'",
                ID_LEN * 2,
                hex_str
            )));
        }
        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(trimmed, &mut bytes)
            .map_err(|e| MedrecordError::InvalidIdentifier(format!("'{hex_str}': {e}")))?;
        Ok(Self(bytes))
    }

    /// Parses an optional wire identifier where the empty string means absent
    pub fn parse_optional(hex_str: &str) -> Result<Option<Self>, MedrecordError> {
        if hex_str.is_empty() {
            Ok(None)
        } else {
            Self::parse(hex_str).map(Some)
        }
    }

    /// Returns the lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation second embedded in the identifier
    pub fn timestamp_seconds(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Identifier {
    type Err = MedrecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Identifier::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Renders an optional identifier for the wire, empty when unset
pub fn optional_hex(id: Option<&Identifier>) -> String {
    id.map(Identifier::to_hex).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique_and_valid_hex() {
        let a = Identifier::generate();
        let b = Identifier::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 24);
        assert_eq!(Identifier::parse(&a.to_hex()).unwrap(), a);
    }

    #[test]
    fn test_generate_embeds_creation_second() {
        let before = Utc::now().timestamp() as u32;
        let id = Identifier::generate();
        assert!(id.timestamp_seconds() >= before);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Identifier::parse("abc"),
            Err(MedrecordError::InvalidIdentifier(_))
        ));
        assert!(Identifier::parse("zz228f30a1b2c3d4e5f60718").is_err());
        assert!(Identifier::parse("").is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(Identifier::parse_optional("").unwrap(), None);
        assert!(Identifier::parse_optional("65228f30a1b2c3d4e5f60718")
            .unwrap()
            .is_some());
        assert!(Identifier::parse_optional("nope").is_err());
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let id = Identifier::parse("65228F30A1B2C3D4E5F60718").unwrap();
        assert_eq!(id.to_string(), "65228f30a1b2c3d4e5f60718");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let id = Identifier::parse("65228f30a1b2c3d4e5f60718").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65228f30a1b2c3d4e5f60718\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<Identifier>("\"bad\"").is_err());
    }
}
