//! Scroll offset ↔ logical index conversion over slides of unequal size.

use swipecard_model::{Axis, LogicalIndex};

use crate::host::LayoutMetrics;

/// Converts between logical indices and scroll offsets along one axis.
///
/// Extents are read from the layout on every call; reflow between calls is
/// expected.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTranslator {
    axis: Axis,
}

impl ScrollTranslator {
    /// Translator measuring along `axis`.
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    /// Measurement axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Offset at which `target` starts: the summed extent of every slide
    /// rendered before it. `None` when the slide is not rendered.
    pub fn offset_for_logical_index<L: LayoutMetrics + ?Sized>(
        &self,
        order: &[LogicalIndex],
        layout: &L,
        target: LogicalIndex,
    ) -> Option<f32> {
        let mut offset = 0.0;
        for slide in order {
            if *slide == target {
                return Some(offset);
            }
            offset += layout.slide_extent(*slide, self.axis);
        }
        None
    }

    /// Rendering position of the slide considered current at `offset`.
    ///
    /// A slide becomes current once the offset is before its midpoint,
    /// so the index does not flicker exactly at a slide boundary. Offsets
    /// past the last midpoint resolve to the last slide.
    pub fn position_for_offset<L: LayoutMetrics + ?Sized>(
        &self,
        order: &[LogicalIndex],
        layout: &L,
        offset: f32,
    ) -> Option<usize> {
        let mut accumulated = 0.0;
        for (position, slide) in order.iter().enumerate() {
            let extent = layout.slide_extent(*slide, self.axis);
            if offset < accumulated + extent / 2.0 {
                return Some(position);
            }
            accumulated += extent;
        }
        order.len().checked_sub(1)
    }

    /// Logical index of the slide whose midpoint range contains `offset`.
    pub fn index_for_offset<L: LayoutMetrics + ?Sized>(
        &self,
        order: &[LogicalIndex],
        layout: &L,
        offset: f32,
    ) -> Option<LogicalIndex> {
        self.position_for_offset(order, layout, offset)
            .map(|position| order[position])
    }
}
