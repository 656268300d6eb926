//! Per-element decoding for inbound batches.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// One element of an inbound JSON array, decoded on its own.
///
/// An element whose shape does not match `T` (wrong JSON type, unknown
/// quantity encoding) is kept as [`Decoded::Invalid`] together with the
/// decoder's message instead of failing the surrounding document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Valid(T),
    Invalid {
        value: serde_json::Value,
        reason: String,
    },
}

impl<T> Decoded<T> {
    /// The decoded element, or a validation error naming why it was rejected.
    pub fn get(&self) -> DomainResult<&T> {
        match self {
            Decoded::Valid(inner) => Ok(inner),
            Decoded::Invalid { reason, .. } => Err(DomainError::validation(reason.clone())),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Decoded::Valid(_))
    }
}

impl<T> From<T> for Decoded<T> {
    fn from(value: T) -> Self {
        Decoded::Valid(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&value) {
            Ok(inner) => Decoded::Valid(inner),
            Err(e) => Decoded::Invalid {
                value,
                reason: e.to_string(),
            },
        })
    }
}

impl<T: Serialize> Serialize for Decoded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Decoded::Valid(inner) => inner.serialize(serializer),
            Decoded::Invalid { value, .. } => value.serialize(serializer),
        }
    }
}
