//! Seams between the carousel engine and its host.
//!
//! The engine never touches a DOM directly. The host implements these traits
//! over whatever it renders into; the engine decides what happens and the
//! host reports measurements and scroll events back.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use swipecard_config::NavigationGlyphs;
use swipecard_model::{Axis, CardSpec, EntityId, HassState, LogicalIndex};

use crate::navigation::PaginationBullet;
use crate::sizing::SizingPlan;

/// Receives the shared application state pushed down from the host.
pub trait StateSink {
    fn set_state(&mut self, state: &Arc<HassState>);
}

/// A child panel instance created by the host for one card.
pub trait ChildPanel: StateSink {
    /// Height hint in dashboard rows, for panels that can report one.
    fn size_hint(&self) -> Option<f32> {
        None
    }

    /// Whether the panel finished its first render and can be measured.
    fn is_rendered(&self) -> bool {
        true
    }
}

/// Creates child panels from card configuration.
pub trait PanelFactory {
    type Panel: ChildPanel;

    fn create_panel(&mut self, spec: &CardSpec) -> anyhow::Result<Self::Panel>;
}

/// Where a relocated slide goes in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlidePlacement {
    /// Before every other slide.
    Start,
    /// After every other slide.
    End,
}

/// What a panel's own encapsulated subtree looks like, if it has one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InnerContent {
    /// The panel exposes no encapsulated subtree.
    #[default]
    Absent,
    /// The subtree exists but has no elements.
    Empty,
    /// Extent of the first element in the subtree.
    Extent(f32),
}

/// Raw signals about a rendered slide, gathered by the host for the empty
/// card classifier. Any of them may be missing or misleading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlideMeasurement {
    /// Computed visibility of the panel's internal conditional wrapper, when
    /// one was found.
    pub wrapper_hidden: Option<bool>,
    /// Rendered height of the card element.
    pub extent: f32,
    /// Number of rendered child elements of the card element.
    pub child_count: usize,
    /// Shape of the panel's encapsulated subtree.
    pub inner: InnerContent,
}

/// Read-only layout measurements. Never cached by the engine: content can
/// reflow between any two calls.
pub trait LayoutMetrics {
    /// Along-axis extent of a mounted slide. Unmounted slides measure 0.
    fn slide_extent(&self, slide: LogicalIndex, axis: Axis) -> f32;
}

/// The rendered track the carousel drives.
///
/// Optional parts of the widget (pagination, navigation buttons, custom
/// style) have default no-op implementations so hosts without them need not
/// care.
pub trait Surface: LayoutMetrics {
    type Panel;

    /// Remove every mounted slide.
    fn clear(&mut self);
    /// Append a slide wrapping `panel` at the end of the track.
    fn mount_slide(&mut self, slide: LogicalIndex, panel: &mut Self::Panel);
    fn unmount_slide(&mut self, slide: LogicalIndex);
    /// Move an already mounted slide to the start or end of the track.
    fn relocate_slide(&mut self, slide: LogicalIndex, placement: SlidePlacement);

    fn scroll_offset(&self, axis: Axis) -> f32;
    /// Jump to `offset` immediately, honouring the current smoothing mode.
    fn set_scroll_offset(&mut self, axis: Axis, offset: f32);
    /// Start a smooth scroll to `offset`. Completion is reported back as a
    /// settle event. A new call supersedes one still in flight.
    fn scroll_to(&mut self, axis: Axis, offset: f32);
    fn set_smooth_scrolling(&mut self, enabled: bool);
    /// Force a synchronous layout pass.
    fn flush_layout(&mut self);

    fn measure_slide(&self, slide: LogicalIndex) -> SlideMeasurement;
    /// Rendered height of the card element inside a slide.
    fn card_height(&self, slide: LogicalIndex) -> f32;
    fn apply_sizing(&mut self, plan: &SizingPlan);

    /// Start reporting content size changes of the given slides.
    fn observe_content_size(&mut self, slides: &[LogicalIndex]);
    fn disconnect_content_observer(&mut self);

    fn render_pagination(&mut self, _bullets: &[PaginationBullet]) {}
    fn render_navigation(&mut self, _glyphs: &NavigationGlyphs) {}
    fn apply_custom_style(&mut self, _block: &str) {}
}

/// A host service invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    /// Service domain, e.g. `input_number`.
    pub domain: String,
    /// Service name within the domain.
    pub service: String,
    /// Payload, including the target `entity_id`.
    pub data: Value,
}

impl ServiceCall {
    /// Reset a numeric control entity to its neutral value.
    pub fn reset_input_number(entity: &EntityId) -> Self {
        Self {
            domain: "input_number".to_string(),
            service: "set_value".to_string(),
            data: json!({ "entity_id": entity.as_str(), "value": 0 }),
        }
    }
}

/// Asynchronous host services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostServices: Send + Sync {
    async fn call_service(&self, call: ServiceCall) -> anyhow::Result<()>;
}
