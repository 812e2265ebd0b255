//! Post-render detection of conditional cards that rendered nothing.
//!
//! Child panels do not expose a reliable "I am empty" contract, and each
//! implementation signals a hidden state differently. Detection is therefore
//! an ordered list of heuristics; a slide is empty as soon as one of them
//! fires. When no signal is available the slide is kept.

use std::fmt;

use swipecard_model::LogicalIndex;
use tracing::debug;

use crate::host::{InnerContent, SlideMeasurement, Surface};
use crate::registry::SlideRegistry;

/// One heuristic signal. Not authoritative.
pub trait EmptyDetector: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn is_empty(&self, measured: &SlideMeasurement, threshold_px: f32) -> bool;
}

/// The panel's internal conditional wrapper is computed-hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenConditionalWrapper;

impl EmptyDetector for HiddenConditionalWrapper {
    fn name(&self) -> &'static str {
        "hidden-wrapper"
    }

    fn is_empty(&self, measured: &SlideMeasurement, _threshold_px: f32) -> bool {
        measured.wrapper_hidden == Some(true)
    }
}

/// The card element renders below the threshold height.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollapsedExtent;

impl EmptyDetector for CollapsedExtent {
    fn name(&self) -> &'static str {
        "collapsed-extent"
    }

    fn is_empty(&self, measured: &SlideMeasurement, threshold_px: f32) -> bool {
        measured.extent < threshold_px
    }
}

/// The card element has no rendered children.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRenderedChildren;

impl EmptyDetector for NoRenderedChildren {
    fn name(&self) -> &'static str {
        "no-children"
    }

    fn is_empty(&self, measured: &SlideMeasurement, _threshold_px: f32) -> bool {
        measured.child_count == 0
    }
}

/// The panel's encapsulated subtree is empty or collapsed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollapsedInnerContent;

impl EmptyDetector for CollapsedInnerContent {
    fn name(&self) -> &'static str {
        "collapsed-inner-content"
    }

    fn is_empty(&self, measured: &SlideMeasurement, threshold_px: f32) -> bool {
        match measured.inner {
            InnerContent::Absent => false,
            InnerContent::Empty => true,
            InnerContent::Extent(extent) => extent < threshold_px,
        }
    }
}

/// Classifies conditional slides and reports the ones to prune.
#[derive(Debug)]
pub struct Reconciler {
    detectors: Vec<Box<dyn EmptyDetector>>,
    threshold_px: f32,
}

impl Reconciler {
    /// Detector-less reconciler; never prunes anything until detectors are
    /// added.
    pub fn new(threshold_px: f32) -> Self {
        Self {
            detectors: Vec::new(),
            threshold_px,
        }
    }

    /// The four standard signals, cheapest first.
    pub fn with_default_detectors(threshold_px: f32) -> Self {
        Self::new(threshold_px)
            .with_detector(HiddenConditionalWrapper)
            .with_detector(CollapsedExtent)
            .with_detector(NoRenderedChildren)
            .with_detector(CollapsedInnerContent)
    }

    /// Append a detector, tried after the existing ones.
    pub fn with_detector(mut self, detector: impl EmptyDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Extent below which a slide counts as collapsed.
    pub fn threshold_px(&self) -> f32 {
        self.threshold_px
    }

    /// Change the collapse threshold.
    pub fn set_threshold_px(&mut self, threshold_px: f32) {
        self.threshold_px = threshold_px;
    }

    /// Name of the first detector that considers the slide empty.
    pub fn classify(&self, measured: &SlideMeasurement) -> Option<&'static str> {
        self.detectors
            .iter()
            .find(|detector| detector.is_empty(measured, self.threshold_px))
            .map(|detector| detector.name())
    }

    /// Conditional slides that currently look empty, in rendering order.
    /// Plain cards are never inspected.
    pub fn find_empty<P, S>(
        &self,
        registry: &SlideRegistry<P>,
        surface: &S,
    ) -> Vec<LogicalIndex>
    where
        S: Surface + ?Sized,
    {
        registry
            .visible()
            .filter(|slide| slide.is_conditional())
            .filter_map(|slide| {
                let index = slide.logical_index();
                let measured = surface.measure_slide(index);
                let detector = self.classify(&measured)?;
                debug!(logical_index = %index, detector, ?measured, "conditional card looks empty");
                Some(index)
            })
            .collect()
    }
}
