//! Model errors.

use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A card entry could not be interpreted.
    InvalidCard { index: usize, reason: String },
    /// An entity id did not have the `domain.object_id` shape.
    InvalidEntityId(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidCard { index, reason } => {
                write!(f, "invalid card at position {index}: {reason}")
            }
            ModelError::InvalidEntityId(id) => {
                write!(f, "invalid entity id: {id:?}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Result alias for model constructors.
pub type Result<T> = std::result::Result<T, ModelError>;
