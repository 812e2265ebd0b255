//! Identifiers for slides and host entities.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};

/// Position of a card in the configured card list.
///
/// Assigned once when the configuration is read and never reused, so it
/// survives slide removal and loop rotation. Rendering order is tracked
/// separately by the slide registry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct LogicalIndex(pub usize);

impl LogicalIndex {
    /// The first configured card.
    pub const FIRST: LogicalIndex = LogicalIndex(0);

    /// Raw index.
    pub fn get(self) -> usize {
        self.0
    }

    /// Absolute distance between two logical indices.
    pub fn distance(self, other: LogicalIndex) -> usize {
        self.0.abs_diff(other.0)
    }
}

impl From<usize> for LogicalIndex {
    fn from(value: usize) -> Self {
        LogicalIndex(value)
    }
}

impl std::fmt::Display for LogicalIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host entity identifier in `domain.object_id` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Check the `domain.object_id` shape.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        match raw.split_once('.') {
            Some((domain, object))
                if !domain.is_empty()
                    && !object.is_empty()
                    && !raw.chars().any(char::is_whitespace) =>
            {
                Ok(EntityId(raw))
            }
            _ => Err(ModelError::InvalidEntityId(raw)),
        }
    }

    /// The numeric control entity a carousel listens to for remote index
    /// requests.
    pub fn input_number(card_id: &str) -> Self {
        EntityId(format!("input_number.{card_id}"))
    }

    /// The full id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the first dot.
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map(|(d, _)| d).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        EntityId::parse(value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_requires_domain_and_object() {
        assert!(EntityId::parse("light.kitchen").is_ok());
        assert!(EntityId::parse("kitchen").is_err());
        assert!(EntityId::parse(".kitchen").is_err());
        assert!(EntityId::parse("light.").is_err());
        assert!(EntityId::parse("light.kit chen").is_err());
    }

    #[test]
    fn input_number_entity_uses_card_id() {
        let id = EntityId::input_number("css-swipe-card-abc");
        assert_eq!(id.as_str(), "input_number.css-swipe-card-abc");
        assert_eq!(id.domain(), "input_number");
    }
}
