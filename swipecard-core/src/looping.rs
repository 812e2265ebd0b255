//! Loop illusion: relocate boundary slides after a scroll settles so the
//! track appears circular.
//!
//! Only settle events trigger a relocation; reordering mid-gesture would be
//! visible. The relocation and the compensating offset change happen in one
//! synchronous pass with smoothing disabled. The caller restores smoothing
//! on the next animation frame.

use swipecard_model::LogicalIndex;
use tracing::{debug, info};

use crate::host::{SlidePlacement, Surface};
use crate::registry::SlideRegistry;
use crate::translator::ScrollTranslator;

/// Fewest visible slides for which looping makes sense.
pub const MIN_LOOP_SLIDES: usize = 3;

/// Outcome of a settle event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopTransition {
    /// Nothing moved.
    None,
    /// Settled on the last slide; the first slide moved to the end.
    FirstToEnd {
        slide: LogicalIndex,
        extent: f32,
        offset_before: f32,
        offset_after: f32,
    },
    /// Settled on the first slide; the last slide moved to the start.
    LastToStart {
        slide: LogicalIndex,
        extent: f32,
        offset_before: f32,
        offset_after: f32,
    },
}

impl LoopTransition {
    /// Whether a slide was moved.
    pub fn relocated(&self) -> bool {
        !matches!(self, LoopTransition::None)
    }
}

/// Whether looping applies to a configuration with `visible` slides.
pub fn loop_eligible(configured: bool, visible: usize) -> bool {
    configured && visible >= MIN_LOOP_SLIDES
}

/// Arms looping for a visible slide count and relocates boundary slides on
/// settle.
#[derive(Debug, Default)]
pub struct LoopEngine {
    armed: bool,
}

impl LoopEngine {
    /// Disarmed engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down and re-arm for the current visible slide count. Returns
    /// whether the engine is armed afterwards.
    pub fn setup(&mut self, configured: bool, visible: usize) -> bool {
        self.teardown();
        self.armed = loop_eligible(configured, visible);
        if self.armed {
            info!(visible, "loop engine armed");
        }
        self.armed
    }

    /// Stop reacting to settle events.
    pub fn teardown(&mut self) {
        self.armed = false;
    }

    /// Whether settle events are acted on.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// React to a settled scroll. Does nothing unless armed.
    pub fn on_settled<P, S>(
        &self,
        registry: &mut SlideRegistry<P>,
        surface: &mut S,
        translator: &ScrollTranslator,
    ) -> LoopTransition
    where
        S: Surface + ?Sized,
    {
        if !self.armed || registry.len() < MIN_LOOP_SLIDES {
            return LoopTransition::None;
        }
        let axis = translator.axis();
        let offset_before = surface.scroll_offset(axis);
        let Some(position) =
            translator.position_for_offset(registry.order(), &*surface, offset_before)
        else {
            return LoopTransition::None;
        };
        let last_position = registry.len() - 1;

        let transition = if position == last_position {
            let Some(first) = registry.first() else {
                return LoopTransition::None;
            };
            let extent = surface.slide_extent(first, axis);
            let offset_after = (offset_before - extent).max(0.0);

            surface.set_smooth_scrolling(false);
            registry.rotate_first_to_end();
            surface.relocate_slide(first, SlidePlacement::End);
            surface.flush_layout();
            surface.set_scroll_offset(axis, offset_after);

            LoopTransition::FirstToEnd {
                slide: first,
                extent,
                offset_before,
                offset_after,
            }
        } else if position == 0 {
            let Some(last) = registry.last() else {
                return LoopTransition::None;
            };
            let extent = surface.slide_extent(last, axis);
            let offset_after = offset_before + extent;

            surface.set_smooth_scrolling(false);
            registry.rotate_last_to_start();
            surface.relocate_slide(last, SlidePlacement::Start);
            surface.flush_layout();
            surface.set_scroll_offset(axis, offset_after);

            LoopTransition::LastToStart {
                slide: last,
                extent,
                offset_before,
                offset_after,
            }
        } else {
            LoopTransition::None
        };

        if transition.relocated() {
            debug!(?transition, order = ?registry.order(), "loop relocation");
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_needs_three_slides_and_opt_in() {
        assert!(!loop_eligible(true, 2));
        assert!(loop_eligible(true, 3));
        assert!(!loop_eligible(false, 10));
    }

    #[test]
    fn setup_rearms_from_scratch() {
        let mut engine = LoopEngine::new();
        assert!(engine.setup(true, 4));
        assert!(engine.is_armed());
        assert!(!engine.setup(true, 2));
        assert!(!engine.is_armed());
        engine.setup(true, 5);
        engine.teardown();
        assert!(!engine.is_armed());
    }
}
