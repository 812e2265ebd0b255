//! Configuration errors.

use swipecard_model::ModelError;
use thiserror::Error;

/// Reasons a carousel configuration is rejected at setup time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `cards` is absent or null.
    #[error("You need to define cards")]
    MissingCards,

    /// `cards` has the wrong JSON type.
    #[error("`cards` must be a list, got {0}")]
    CardsNotList(&'static str),

    /// A card entry could not be read.
    #[error("invalid card at position {index}: {reason}")]
    InvalidCard { index: usize, reason: String },

    /// `template` names no known orientation.
    #[error("unknown template {0:?}; expected slider-horizontal or slider-vertical")]
    InvalidTemplate(String),

    /// A length is not usable in a style declaration.
    #[error("invalid dimension for `{field}`: {value:?}")]
    InvalidDimension { field: &'static str, value: String },

    /// A field has an out-of-range or contradictory value.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The configuration root is not a mapping.
    #[error("configuration root must be an object")]
    NotAnObject,

    /// Malformed JSON, or a field of the wrong type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML.
    #[error("TOML error: {0}")]
    Toml(String),
}

impl From<ModelError> for ConfigError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidCard { index, reason } => {
                ConfigError::InvalidCard { index, reason }
            }
            ModelError::InvalidEntityId(id) => ConfigError::InvalidField {
                field: "cardId",
                reason: format!("derived entity id {id:?} is malformed"),
            },
        }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
