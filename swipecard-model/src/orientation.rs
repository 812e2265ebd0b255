//! Track orientation and measurement axes.

use serde::{Deserialize, Serialize};

/// Direction the slide track scrolls in. Fixed once configured.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `slider-horizontal`.
    #[default]
    Horizontal,
    /// `slider-vertical`.
    Vertical,
}

/// Measurement axis derived from an orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Widths and `scrollLeft`.
    X,
    /// Heights and `scrollTop`.
    Y,
}

impl Orientation {
    /// Template name of a horizontal track.
    pub const HORIZONTAL_TEMPLATE: &'static str = "slider-horizontal";
    /// Template name of a vertical track.
    pub const VERTICAL_TEMPLATE: &'static str = "slider-vertical";

    /// Axis slides are measured along.
    pub fn axis(self) -> Axis {
        match self {
            Orientation::Horizontal => Axis::X,
            Orientation::Vertical => Axis::Y,
        }
    }

    /// Whether the track scrolls sideways.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::Horizontal)
    }

    /// Track class name used by the dashboard markup.
    pub fn template(self) -> &'static str {
        match self {
            Orientation::Horizontal => Self::HORIZONTAL_TEMPLATE,
            Orientation::Vertical => Self::VERTICAL_TEMPLATE,
        }
    }

    /// Accepts both the template names and the bare orientation words.
    pub fn from_template(raw: &str) -> Option<Self> {
        match raw.trim() {
            Self::HORIZONTAL_TEMPLATE | "horizontal" => {
                Some(Orientation::Horizontal)
            }
            Self::VERTICAL_TEMPLATE | "vertical" => Some(Orientation::Vertical),
            _ => None,
        }
    }
}
