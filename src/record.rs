//! Resolved customer record – the engine's only input.
//!
//! Records arrive fully joined from the data-access layer. When read from
//! JSON, image fields carry the already-converted PNG/JPEG bytes as plain
//! base64 or as a `data:<mime>;base64,<data>` URI.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, Result};

/// Account role; decides the role-specific fields and document slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Customer,
    Veterinarian,
    Petshop,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Veterinarian => "Veterinarian",
            Role::Petshop => "Pet Shop",
        }
    }
}

/// One entry of the customer's address book.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Recipient name shown as the item heading.
    pub name: String,
    pub phone: String,
    /// Free-text landmark / delivery note.
    #[serde(default)]
    pub detail: String,
    /// Free-text street address.
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub registered_at: Option<String>,
    /// Veterinarian association membership number.
    #[serde(default)]
    pub kta_number: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
    #[serde(default, with = "base64_bytes")]
    pub identity_document: Option<Vec<u8>>,
    /// KTA card for veterinarians, storefront photo for pet shops.
    #[serde(default, with = "base64_bytes")]
    pub secondary_document: Option<Vec<u8>>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl CustomerRecord {
    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    /// Reject records the document cannot identify.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DocumentError::Record("record id is empty".to_string()));
        }
        if self.full_name.trim().is_empty() {
            return Err(DocumentError::Record(format!(
                "record {} has no full name",
                self.id
            )));
        }
        Ok(())
    }
}

/// Decode plain base64 or a `data:<mime>;base64,<data>` URI.
pub fn decode_image_field(src: &str) -> std::result::Result<Vec<u8>, String> {
    let src = src.trim();
    let payload = match src.strip_prefix("data:") {
        Some(rest) => {
            let comma_pos = rest.find(',').ok_or_else(|| {
                "Invalid data URI: missing `,` separator between header and data".to_string()
            })?;
            if !rest[..comma_pos].contains(";base64") {
                return Err("Only base64-encoded data URIs are supported".to_string());
            }
            &rest[comma_pos + 1..]
        }
        None => src,
    };
    BASE64_STD
        .decode(payload.trim())
        .map_err(|e| format!("Base64 decode error: {e}"))
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::decode_image_field;

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&BASE64_STD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Vec<u8>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => decode_image_field(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
