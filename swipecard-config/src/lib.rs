//! Configuration library for the swipe carousel.
//!
//! The dashboard hands the carousel a loosely typed card configuration. This
//! crate validates it once, fills in defaults, and produces an immutable
//! [`CarouselConfig`]. A new configuration always means a full rebuild of the
//! widget, so nothing here supports patching.

pub mod dimension;
pub mod error;
pub mod loader;
pub mod models;
pub mod style;

pub use dimension::Dimension;
pub use error::ConfigError;
pub use models::{CarouselConfig, HeightMode, TimingConfig};
pub use style::{NavigationGlyphs, custom_style_block};
