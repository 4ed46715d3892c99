//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Maximum accepted length of a part identifier.
pub const MAX_PART_ID_LEN: usize = 64;

/// Identifier of a catalog part.
///
/// Opaque to the ledger: it is whatever string the catalog assigned (SKU,
/// OEM number, generated UUID). Never empty, never padded with whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartId(String);

impl PartId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::invalid_id("PartId: cannot be empty"));
        }
        if value.trim() != value {
            return Err(DomainError::invalid_id(
                "PartId: leading or trailing whitespace",
            ));
        }
        if value.len() > MAX_PART_ID_LEN {
            return Err(DomainError::invalid_id(format!(
                "PartId: longer than {MAX_PART_ID_LEN} bytes"
            )));
        }
        Ok(Self(value))
    }

    /// Generate a fresh identifier (UUIDv7 text) for parts registered without one.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PartId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PartId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartId> for String {
    fn from(value: PartId) -> Self {
        value.0
    }
}

/// Identifier of a warehouse (integer, assigned by the catalog).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(i64);

impl WarehouseId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for WarehouseId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for WarehouseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| DomainError::invalid_id(format!("WarehouseId: {e}")))
    }
}

/// Identifier of a stock movement (journal entry).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(Uuid);

/// Identifier of a user (actor identity).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered), so journal rows sort by creation.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(MovementId, "MovementId");
impl_uuid_newtype!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_id_rejects_blank_and_padded_values() {
        assert!(PartId::new("").is_err());
        assert!(PartId::new(" P1").is_err());
        assert!(PartId::new("P1 ").is_err());
        assert!(PartId::new("x".repeat(MAX_PART_ID_LEN + 1)).is_err());
        assert_eq!(PartId::new("BRK-PAD-042").unwrap().as_str(), "BRK-PAD-042");
    }

    #[test]
    fn part_id_deserialization_validates() {
        let ok: PartId = serde_json::from_str("\"P1\"").unwrap();
        assert_eq!(ok.as_str(), "P1");
        assert!(serde_json::from_str::<PartId>("\"\"").is_err());
    }

    #[test]
    fn warehouse_id_parses_integers_only() {
        assert_eq!("17".parse::<WarehouseId>().unwrap(), WarehouseId::new(17));
        assert!(matches!(
            "seventeen".parse::<WarehouseId>(),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn generated_part_ids_are_distinct() {
        assert_ne!(PartId::generate(), PartId::generate());
    }
}
