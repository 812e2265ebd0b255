//! In-memory host for carousel integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Value, json};
use swipecard_config::{CarouselConfig, NavigationGlyphs};
use swipecard_core::{
    ChildPanel, InnerContent, LayoutMetrics, ManualScheduler, PaginationBullet, PanelFactory,
    SizingPlan, SlidePlacement, SlideMeasurement, StateSink, Surface, SwipeCarousel,
};
use swipecard_model::{Axis, CardSpec, HassState, LogicalIndex};

pub const SLIDE_EXTENT: f32 = 300.0;
pub const CARD_HEIGHT: f32 = 120.0;

pub type TestCarousel = SwipeCarousel<FakeFactory, FakeSurface, ManualScheduler>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug)]
pub struct FakePanel {
    pub logical_index: LogicalIndex,
    pub card_type: String,
    pub rendered: bool,
    pub size_hint: Option<f32>,
    pub state_updates: usize,
}

impl StateSink for FakePanel {
    fn set_state(&mut self, _state: &Arc<HassState>) {
        self.state_updates += 1;
    }
}

impl ChildPanel for FakePanel {
    fn size_hint(&self) -> Option<f32> {
        self.size_hint
    }

    fn is_rendered(&self) -> bool {
        self.rendered
    }
}

#[derive(Debug, Default)]
pub struct FakeFactory {
    pub created: usize,
    pub fail_at: Option<LogicalIndex>,
    pub pending_render: HashSet<LogicalIndex>,
    pub size_hints: HashMap<LogicalIndex, f32>,
}

impl PanelFactory for FakeFactory {
    type Panel = FakePanel;

    fn create_panel(&mut self, spec: &CardSpec) -> anyhow::Result<FakePanel> {
        if self.fail_at == Some(spec.logical_index) {
            anyhow::bail!("unknown card type {}", spec.kind.type_name());
        }
        self.created += 1;
        Ok(FakePanel {
            logical_index: spec.logical_index,
            card_type: spec.kind.type_name().to_string(),
            rendered: !self.pending_render.contains(&spec.logical_index),
            size_hint: self.size_hints.get(&spec.logical_index).copied(),
            state_updates: 0,
        })
    }
}

/// A track laid out in memory. Programmatic scrolls land immediately;
/// settle events are delivered by the test.
#[derive(Debug)]
pub struct FakeSurface {
    pub order: Vec<LogicalIndex>,
    pub extents: HashMap<LogicalIndex, f32>,
    pub card_heights: HashMap<LogicalIndex, f32>,
    pub empty: HashSet<LogicalIndex>,
    pub offset: f32,
    pub smooth: bool,
    pub scroll_targets: Vec<f32>,
    pub relocations: Vec<(LogicalIndex, SlidePlacement)>,
    pub flushes: usize,
    pub sizing: Vec<SizingPlan>,
    pub observed: Option<Vec<LogicalIndex>>,
    pub bullets: Vec<PaginationBullet>,
    pub pagination_renders: usize,
    pub glyphs: Option<NavigationGlyphs>,
    pub style: Option<String>,
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            extents: HashMap::new(),
            card_heights: HashMap::new(),
            empty: HashSet::new(),
            offset: 0.0,
            smooth: true,
            scroll_targets: Vec::new(),
            relocations: Vec::new(),
            flushes: 0,
            sizing: Vec::new(),
            observed: None,
            bullets: Vec::new(),
            pagination_renders: 0,
            glyphs: None,
            style: None,
        }
    }
}

impl FakeSurface {
    /// Make a conditional slide render nothing.
    pub fn with_empty(mut self, index: usize) -> Self {
        self.empty.insert(LogicalIndex(index));
        self
    }

    pub fn with_extent(mut self, index: usize, extent: f32) -> Self {
        self.extents.insert(LogicalIndex(index), extent);
        self
    }

    pub fn with_card_height(mut self, index: usize, height: f32) -> Self {
        self.card_heights.insert(LogicalIndex(index), height);
        self
    }

    pub fn active_bullets(&self) -> Vec<LogicalIndex> {
        self.bullets
            .iter()
            .filter(|bullet| bullet.active)
            .map(|bullet| bullet.logical_index)
            .collect()
    }

    pub fn last_sizing(&self) -> Option<&SizingPlan> {
        self.sizing.last()
    }
}

impl LayoutMetrics for FakeSurface {
    fn slide_extent(&self, slide: LogicalIndex, _axis: Axis) -> f32 {
        if !self.order.contains(&slide) {
            return 0.0;
        }
        self.extents.get(&slide).copied().unwrap_or(SLIDE_EXTENT)
    }
}

impl Surface for FakeSurface {
    type Panel = FakePanel;

    fn clear(&mut self) {
        self.order.clear();
        self.offset = 0.0;
    }

    fn mount_slide(&mut self, slide: LogicalIndex, panel: &mut FakePanel) {
        assert_eq!(panel.logical_index, slide);
        self.order.push(slide);
    }

    fn unmount_slide(&mut self, slide: LogicalIndex) {
        self.order.retain(|mounted| *mounted != slide);
    }

    fn relocate_slide(&mut self, slide: LogicalIndex, placement: SlidePlacement) {
        self.order.retain(|mounted| *mounted != slide);
        match placement {
            SlidePlacement::Start => self.order.insert(0, slide),
            SlidePlacement::End => self.order.push(slide),
        }
        self.relocations.push((slide, placement));
    }

    fn scroll_offset(&self, _axis: Axis) -> f32 {
        self.offset
    }

    fn set_scroll_offset(&mut self, _axis: Axis, offset: f32) {
        self.offset = offset;
    }

    fn scroll_to(&mut self, _axis: Axis, offset: f32) {
        self.scroll_targets.push(offset);
        self.offset = offset;
    }

    fn set_smooth_scrolling(&mut self, enabled: bool) {
        self.smooth = enabled;
    }

    fn flush_layout(&mut self) {
        self.flushes += 1;
    }

    fn measure_slide(&self, slide: LogicalIndex) -> SlideMeasurement {
        if self.empty.contains(&slide) {
            return SlideMeasurement {
                wrapper_hidden: Some(true),
                extent: 0.0,
                child_count: 0,
                inner: InnerContent::Empty,
            };
        }
        SlideMeasurement {
            wrapper_hidden: Some(false),
            extent: self.card_height(slide),
            child_count: 1,
            inner: InnerContent::Absent,
        }
    }

    fn card_height(&self, slide: LogicalIndex) -> f32 {
        if !self.order.contains(&slide) {
            return 0.0;
        }
        self.card_heights.get(&slide).copied().unwrap_or(CARD_HEIGHT)
    }

    fn apply_sizing(&mut self, plan: &SizingPlan) {
        self.sizing.push(plan.clone());
    }

    fn observe_content_size(&mut self, slides: &[LogicalIndex]) {
        self.observed = Some(slides.to_vec());
    }

    fn disconnect_content_observer(&mut self) {
        self.observed = None;
    }

    fn render_pagination(&mut self, bullets: &[PaginationBullet]) {
        self.bullets = bullets.to_vec();
        self.pagination_renders += 1;
    }

    fn render_navigation(&mut self, glyphs: &NavigationGlyphs) {
        self.glyphs = Some(glyphs.clone());
    }

    fn apply_custom_style(&mut self, block: &str) {
        self.style = Some(block.to_string());
    }
}

pub fn tiles(count: usize) -> Vec<Value> {
    (0..count).map(|_| json!({ "type": "tile" })).collect()
}

pub fn conditional(entity: &str) -> Value {
    json!({
        "type": "conditional",
        "conditions": [{ "entity": entity, "state": "on" }],
        "card": { "type": "tile" }
    })
}

pub fn config(value: Value) -> CarouselConfig {
    CarouselConfig::from_value(value).expect("valid test configuration")
}

pub fn carousel_with(
    factory: FakeFactory,
    surface: FakeSurface,
    value: Value,
) -> TestCarousel {
    init_tracing();
    let mut carousel = SwipeCarousel::new(factory, surface, ManualScheduler::new());
    carousel
        .set_config(config(value))
        .expect("carousel renders");
    carousel
}

pub fn carousel(value: Value) -> TestCarousel {
    carousel_with(FakeFactory::default(), FakeSurface::default(), value)
}

pub fn indices(values: &[usize]) -> Vec<LogicalIndex> {
    values.iter().copied().map(LogicalIndex).collect()
}
