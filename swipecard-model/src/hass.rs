//! Snapshot of the host's shared application state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State of a single host entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityState {
    /// Raw state string.
    pub state: String,
    /// Entity attributes, uninterpreted.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    /// State without attributes.
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    /// Parse the state as a float the way the host's numeric inputs report
    /// it ("3", "3.0"). Non-numeric states yield `None`.
    pub fn numeric(&self) -> Option<f64> {
        self.state.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Immutable application-state snapshot. A new snapshot is delivered on
/// every host update; the carousel diffs consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HassState {
    /// Entities by id.
    #[serde(default)]
    pub states: HashMap<String, EntityState>,
}

impl HassState {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one entity.
    pub fn with_entity(
        mut self,
        entity_id: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        self.states
            .insert(entity_id.into(), EntityState::new(state));
        self
    }

    /// Entity by id.
    pub fn entity(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }

    /// Raw `state` string of an entity.
    pub fn state_of(&self, entity_id: &str) -> Option<&str> {
        self.states.get(entity_id).map(|s| s.state.as_str())
    }
}
