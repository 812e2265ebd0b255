//! Track, slide and card heights.

use swipecard_config::{CarouselConfig, Dimension, HeightMode};
use swipecard_model::Orientation;

/// A height to assign to an element.
#[derive(Debug, Clone, PartialEq)]
pub enum HeightValue {
    /// Leave whatever the stylesheet says.
    Unset,
    /// Let the element keep its own content height.
    Native,
    /// Absolute pixel height.
    Px(f32),
    /// Any other CSS length, passed through.
    Css(Dimension),
}

impl From<&Dimension> for HeightValue {
    fn from(value: &Dimension) -> Self {
        match value {
            Dimension::Px(px) => HeightValue::Px(*px),
            other => HeightValue::Css(other.clone()),
        }
    }
}

/// Vertical overflow of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalOverflow {
    /// Leave the stylesheet's value.
    Unchanged,
    /// Clip content taller than the track.
    Hidden,
    /// Scroll content taller than the track.
    Auto,
}

/// Heights to apply in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingPlan {
    /// Scroll container.
    pub track: HeightValue,
    /// Every slide wrapper.
    pub slides: HeightValue,
    /// The card element inside each slide.
    pub cards: HeightValue,
    /// Overflow of the scroll container.
    pub vertical_overflow: VerticalOverflow,
}

/// How heights are derived for the active configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SizingMode {
    /// Everything sized to the tallest visible card; re-measured whenever
    /// card content changes size.
    AutoHeight,
    /// Configured height on track and slides; cards keep their own height.
    FixedHeight(Dimension),
    /// Horizontal: lock the track to the configured height and hide
    /// vertical overflow. Vertical: track sized to the configured height or
    /// the tallest card, vertical scrolling enabled.
    ManualDefault {
        orientation: Orientation,
        height: Option<Dimension>,
    },
}

/// Turns the active [`SizingMode`] and a measurement into a [`SizingPlan`].
#[derive(Debug, Clone)]
pub struct SizingEngine {
    mode: SizingMode,
    fallback_px: f32,
}

impl SizingEngine {
    /// Engine for `mode`. `fallback_px` replaces a zero measurement.
    pub fn new(mode: SizingMode, fallback_px: f32) -> Self {
        Self { mode, fallback_px }
    }

    /// Pick the mode from the configured height mode and orientation.
    pub fn for_config(config: &CarouselConfig) -> Self {
        let mode = match (config.height_mode, &config.height) {
            (HeightMode::Auto, _) => SizingMode::AutoHeight,
            (HeightMode::Fixed, Some(height)) => SizingMode::FixedHeight(height.clone()),
            (HeightMode::Fixed, None) | (HeightMode::Manual, _) => {
                SizingMode::ManualDefault {
                    orientation: config.orientation,
                    height: config.height.clone(),
                }
            }
        };
        Self::new(mode, config.timing.fallback_card_height_px)
    }

    /// Active mode.
    pub fn mode(&self) -> &SizingMode {
        &self.mode
    }

    /// Re-measure on content size changes.
    pub fn is_reactive(&self) -> bool {
        matches!(self.mode, SizingMode::AutoHeight)
    }

    /// Whether [`plan`](Self::plan) needs the tallest card height.
    pub fn needs_measurement(&self) -> bool {
        match &self.mode {
            SizingMode::AutoHeight => true,
            SizingMode::FixedHeight(_) => false,
            SizingMode::ManualDefault {
                orientation,
                height,
            } => !orientation.is_horizontal() && height.is_none(),
        }
    }

    /// Tallest card height, falling back when nothing measured above zero.
    pub fn resolve_measured(&self, tallest: f32) -> f32 {
        if tallest > 0.0 { tallest } else { self.fallback_px }
    }

    /// Heights for the current mode. `tallest` is the measured tallest card,
    /// required only when [`needs_measurement`](Self::needs_measurement).
    pub fn plan(&self, tallest: Option<f32>) -> SizingPlan {
        let measured = || HeightValue::Px(self.resolve_measured(tallest.unwrap_or(0.0)));
        match &self.mode {
            SizingMode::AutoHeight => SizingPlan {
                track: measured(),
                slides: measured(),
                cards: measured(),
                vertical_overflow: VerticalOverflow::Unchanged,
            },
            SizingMode::FixedHeight(height) => SizingPlan {
                track: height.into(),
                slides: height.into(),
                cards: HeightValue::Native,
                vertical_overflow: VerticalOverflow::Unchanged,
            },
            SizingMode::ManualDefault {
                orientation: Orientation::Horizontal,
                height,
            } => {
                let locked = height.as_ref().map_or(HeightValue::Unset, HeightValue::from);
                SizingPlan {
                    track: locked.clone(),
                    slides: HeightValue::Unset,
                    cards: locked,
                    vertical_overflow: VerticalOverflow::Hidden,
                }
            }
            SizingMode::ManualDefault {
                orientation: Orientation::Vertical,
                height,
            } => SizingPlan {
                track: height.as_ref().map_or_else(measured, HeightValue::from),
                slides: HeightValue::Unset,
                cards: HeightValue::Native,
                vertical_overflow: VerticalOverflow::Auto,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_height_uses_tallest_card_everywhere() {
        let engine = SizingEngine::new(SizingMode::AutoHeight, 140.0);
        assert!(engine.is_reactive());
        assert!(engine.needs_measurement());

        let plan = engine.plan(Some(212.0));
        assert_eq!(plan.track, HeightValue::Px(212.0));
        assert_eq!(plan.slides, HeightValue::Px(212.0));
        assert_eq!(plan.cards, HeightValue::Px(212.0));

        assert_eq!(engine.plan(Some(0.0)).track, HeightValue::Px(140.0));
    }

    #[test]
    fn fixed_height_keeps_native_cards() {
        let engine = SizingEngine::new(
            SizingMode::FixedHeight(Dimension::Css("40vh".into())),
            140.0,
        );
        assert!(!engine.is_reactive());
        assert!(!engine.needs_measurement());

        let plan = engine.plan(None);
        assert_eq!(plan.track, HeightValue::Css(Dimension::Css("40vh".into())));
        assert_eq!(plan.cards, HeightValue::Native);
    }

    #[test]
    fn manual_horizontal_locks_track_and_hides_overflow() {
        let engine = SizingEngine::new(
            SizingMode::ManualDefault {
                orientation: Orientation::Horizontal,
                height: Some(Dimension::Px(300.0)),
            },
            140.0,
        );
        assert!(!engine.needs_measurement());
        let plan = engine.plan(None);
        assert_eq!(plan.track, HeightValue::Px(300.0));
        assert_eq!(plan.cards, HeightValue::Px(300.0));
        assert_eq!(plan.vertical_overflow, VerticalOverflow::Hidden);
    }

    #[test]
    fn manual_vertical_measures_only_without_height() {
        let measured = SizingEngine::new(
            SizingMode::ManualDefault {
                orientation: Orientation::Vertical,
                height: None,
            },
            140.0,
        );
        assert!(measured.needs_measurement());
        let plan = measured.plan(Some(180.0));
        assert_eq!(plan.track, HeightValue::Px(180.0));
        assert_eq!(plan.cards, HeightValue::Native);
        assert_eq!(plan.vertical_overflow, VerticalOverflow::Auto);

        let configured = SizingEngine::new(
            SizingMode::ManualDefault {
                orientation: Orientation::Vertical,
                height: Some(Dimension::Px(250.0)),
            },
            140.0,
        );
        assert!(!configured.needs_measurement());
        assert_eq!(configured.plan(None).track, HeightValue::Px(250.0));
    }
}
