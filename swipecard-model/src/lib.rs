//! Core data model definitions shared across the swipe carousel crates.
#![allow(missing_docs)]

pub mod card;
pub mod error;
pub mod hass;
pub mod ids;
pub mod orientation;

pub use card::{CONDITIONAL_CARD_TYPE, CardKind, CardSpec, Condition};
pub use error::{ModelError, Result as ModelResult};
pub use hass::{EntityState, HassState};
pub use ids::{EntityId, LogicalIndex};
pub use orientation::{Axis, Orientation};
