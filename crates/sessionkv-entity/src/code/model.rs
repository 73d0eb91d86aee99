//! Authorization code record model.

use serde::{Deserialize, Serialize};

use sessionkv_core::traits::Record;

/// Table holding authorization code records.
pub const AUTHORIZATION_CODE_TABLE: &str = "authorization_code";

/// Index under which every code record is also reachable by its code, so
/// that a redemption query can observe duplicates.
pub const CODE_INDEX: &str = "code";

/// A single-use authorization code and the serialized authentication it
/// restores on redemption. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCodeRecord {
    /// The code value handed to the client.
    pub code: String,
    /// Opaque serialized authentication context (base64 in the document).
    #[serde(with = "payload")]
    pub authentication: Vec<u8>,
}

impl AuthorizationCodeRecord {
    /// Pair a code with its serialized authentication.
    pub fn new(code: impl Into<String>, authentication: Vec<u8>) -> Self {
        Self {
            code: code.into(),
            authentication,
        }
    }
}

impl Record for AuthorizationCodeRecord {
    const TABLE: &'static str = AUTHORIZATION_CODE_TABLE;

    fn primary_key(&self) -> &str {
        &self.code
    }
}

mod payload {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
