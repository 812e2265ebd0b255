//! Carousel errors.

use swipecard_config::ConfigError;
use swipecard_model::LogicalIndex;
use thiserror::Error;

/// Failures surfaced by the carousel state machine and its runtime.
#[derive(Error, Debug)]
pub enum CarouselError {
    /// The configuration was rejected; nothing was rendered.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The host could not build a panel. The render is abandoned.
    #[error("Failed to create panel for card {index}: {reason}")]
    PanelCreation { index: LogicalIndex, reason: String },

    /// No configuration has been applied yet.
    #[error("Carousel has no configuration")]
    NotConfigured,

    /// Events after teardown are refused until a new configuration arrives.
    #[error("Carousel was torn down")]
    TornDown,
}

/// Result alias for carousel operations.
pub type Result<T> = std::result::Result<T, CarouselError>;
