//! Configured card entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::ids::LogicalIndex;

/// Card `type` whose content may collapse to nothing depending on host state.
pub const CONDITIONAL_CARD_TYPE: &str = "conditional";

/// Discriminator of a configured card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// `type: conditional`; may render empty and be pruned.
    Conditional,
    /// Any other card type, by name.
    Plain(String),
}

impl CardKind {
    /// Classify a `type` string.
    pub fn from_type(card_type: &str) -> Self {
        if card_type == CONDITIONAL_CARD_TYPE {
            CardKind::Conditional
        } else {
            CardKind::Plain(card_type.to_string())
        }
    }

    /// Whether this is a conditional card.
    pub fn is_conditional(&self) -> bool {
        matches!(self, CardKind::Conditional)
    }

    /// The `type` string as configured.
    pub fn type_name(&self) -> &str {
        match self {
            CardKind::Conditional => CONDITIONAL_CARD_TYPE,
            CardKind::Plain(name) => name,
        }
    }
}

/// One entry of a conditional card's `conditions` list. Only the watched
/// entity matters to the carousel; the rest is evaluated by the child panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Entity whose state changes trigger a rebuild.
    #[serde(default)]
    pub entity: Option<String>,
    /// Everything else, left to the child panel.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

/// One configured card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSpec {
    /// Position in the configured list; never changes.
    pub logical_index: LogicalIndex,
    /// Card discriminator.
    pub kind: CardKind,
    /// Opaque configuration forwarded verbatim to the panel factory.
    pub payload: Value,
    /// Conditions of a conditional card; empty otherwise.
    pub conditions: Vec<Condition>,
}

impl CardSpec {
    /// Interpret the raw card object at `index` of the configured list.
    pub fn from_value(index: usize, payload: Value) -> Result<Self> {
        let object = payload.as_object().ok_or_else(|| ModelError::InvalidCard {
            index,
            reason: "card entry must be an object".to_string(),
        })?;

        let card_type = object
            .get("type")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ModelError::InvalidCard {
                index,
                reason: "missing string field `type`".to_string(),
            })?;
        let kind = CardKind::from_type(card_type);

        let conditions = match object.get("conditions") {
            Some(Value::Array(items)) if kind.is_conditional() => items
                .iter()
                .map(|item| {
                    serde_json::from_value::<Condition>(item.clone()).map_err(
                        |err| ModelError::InvalidCard {
                            index,
                            reason: format!("malformed condition: {err}"),
                        },
                    )
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) if kind.is_conditional() && !other.is_null() => {
                return Err(ModelError::InvalidCard {
                    index,
                    reason: "`conditions` must be a list".to_string(),
                });
            }
            _ => Vec::new(),
        };

        Ok(Self {
            logical_index: LogicalIndex(index),
            kind,
            payload,
            conditions,
        })
    }

    /// Whether the card may be pruned.
    pub fn is_conditional(&self) -> bool {
        self.kind.is_conditional()
    }

    /// Entities referenced by this card's conditions, if it is conditional.
    pub fn condition_entities(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .filter_map(|condition| condition.entity.as_deref())
    }
}
