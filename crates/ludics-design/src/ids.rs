//! Identifier types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 16-byte design identifier (truncated Blake3 hash).
///
/// Derived from the inputs that define a design, so compiling the same move
/// log twice yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DesignId(pub [u8; 16]);

impl DesignId {
    /// Create an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Derive an id from an ordered list of parts.
    pub fn derive(parts: &[&str]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\x1f");
        }
        let hash = hasher.finalize();
        let mut out = [0u8; 16];
        out.copy_from_slice(&hash.as_bytes()[..16]);
        Self(out)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 16 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DesignId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DesignId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// An act identifier: the owning design plus the act's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActId {
    pub design: DesignId,
    pub index: u32,
}

impl ActId {
    pub const fn new(design: DesignId, index: u32) -> Self {
        Self { design, index }
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short design prefix keeps traces readable.
        write!(f, "{}#{}", &self.design.to_hex()[..8], self.index)
    }
}

/// A dialogue (deliberation) identifier, assigned by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DialogueId(pub String);

impl DialogueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialogueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A participant label such as `"Proponent"` or `"Opponent"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DialogueId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DialogueId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let a = DesignId::derive(&["d1", "Proponent"]);
        let b = DesignId::derive(&["d1", "Proponent"]);
        assert_eq!(a, b);
        assert_ne!(a, DesignId::derive(&["d1", "Opponent"]));
    }

    #[test]
    fn derive_separates_parts() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(DesignId::derive(&["ab", "c"]), DesignId::derive(&["a", "bc"]));
    }

    #[test]
    fn hex_roundtrip_and_length_check() {
        let id = DesignId::derive(&["x"]);
        assert_eq!(DesignId::from_hex(&id.to_hex()).unwrap(), id);
        assert!(DesignId::from_hex("abcd").is_err());
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = DesignId::from_bytes([0xab; 16]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(16)));

        let participant: ParticipantId = serde_json::from_str("\"Opponent\"").unwrap();
        assert_eq!(participant.as_str(), "Opponent");
    }

    #[test]
    fn act_id_display_is_short() {
        let act = ActId::new(DesignId::from_bytes([0x01; 16]), 3);
        assert_eq!(act.to_string(), "01010101#3");
    }
}
