//! The carousel state machine.
//!
//! [`SwipeCarousel`] owns the slide registry and the engines around it and
//! reacts to discrete events: configuration, state snapshots, scroll and
//! settle notifications, clicks and timer expiries. Every handler runs to
//! completion; work that has to wait (panel layout, scroll animation, grace
//! periods) is resumed by the matching completion event.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use swipecard_config::{CarouselConfig, NavigationGlyphs, TimingConfig, custom_style_block};
use swipecard_model::{EntityId, EntityState, HassState, LogicalIndex, Orientation};
use tracing::{debug, error, info, warn};

use crate::error::{CarouselError, Result};
use crate::host::{ChildPanel, PanelFactory, StateSink, Surface};
use crate::looping::LoopEngine;
use crate::navigation::{Direction, Pagination, remote_target, step_target};
use crate::reconciler::Reconciler;
use crate::registry::SlideRegistry;
use crate::scheduler::{ManualScheduler, Scheduler, TimerKind, TimerSlots, TimerToken};
use crate::sizing::SizingEngine;
use crate::translator::ScrollTranslator;

/// Offsets closer than this are treated as already reached.
const SETTLED_EPSILON_PX: f32 = 0.5;

/// Where the carousel currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarouselState {
    /// Slide the carousel is on.
    pub current_index: LogicalIndex,
    /// Scroll axis of the track.
    pub orientation: Orientation,
    /// Looping is configured and enough slides are visible.
    pub loop_enabled: bool,
}

impl Default for CarouselState {
    fn default() -> Self {
        Self {
            current_index: LogicalIndex::FIRST,
            orientation: Orientation::Horizontal,
            loop_enabled: false,
        }
    }
}

/// Side effects the host performs on the carousel's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Set the remote control entity back to 0.
    ResetRemoteSignal { entity_id: EntityId },
}

/// Headless carousel driven by host events.
///
/// `F` builds the panels and `S` renders them. Deferred work goes through
/// the scheduler `T`; its expiries come back through [`on_timer`](Self::on_timer).
pub struct SwipeCarousel<F, S, T>
where
    F: PanelFactory,
{
    factory: F,
    surface: S,
    scheduler: T,
    config: Option<Arc<CarouselConfig>>,
    registry: SlideRegistry<F::Panel>,
    state: CarouselState,
    translator: ScrollTranslator,
    reconciler: Reconciler,
    looping: LoopEngine,
    pagination: Pagination,
    pagination_deferred: bool,
    sizing: Option<SizingEngine>,
    awaiting_layout: bool,
    timers: TimerSlots,
    hass: Option<Arc<HassState>>,
    remote_checked: bool,
    pending_remote_reset: Option<EntityId>,
    navigation_target: Option<LogicalIndex>,
    effects: Vec<Effect>,
    torn_down: bool,
}

impl<F, S, T> fmt::Debug for SwipeCarousel<F, S, T>
where
    F: PanelFactory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeCarousel")
            .field("card_id", &self.config.as_ref().map(|c| c.card_id.as_str()))
            .field("state", &self.state)
            .field("order", &self.registry.order())
            .field("navigation_target", &self.navigation_target)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl<F, S, T> SwipeCarousel<F, S, T>
where
    F: PanelFactory,
    S: Surface<Panel = F::Panel>,
    T: Scheduler,
{
    /// Unconfigured carousel. Nothing renders until a configuration arrives.
    pub fn new(factory: F, surface: S, scheduler: T) -> Self {
        let timing = TimingConfig::default();
        Self {
            factory,
            surface,
            scheduler,
            config: None,
            registry: SlideRegistry::default(),
            state: CarouselState::default(),
            translator: ScrollTranslator::new(Orientation::Horizontal.axis()),
            reconciler: Reconciler::with_default_detectors(timing.empty_threshold_px),
            looping: LoopEngine::new(),
            pagination: Pagination::new(),
            pagination_deferred: false,
            sizing: None,
            awaiting_layout: false,
            timers: TimerSlots::new(),
            hass: None,
            remote_checked: false,
            pending_remote_reset: None,
            navigation_target: None,
            effects: Vec::new(),
            torn_down: false,
        }
    }

    /// Validate a raw configuration and rebuild the widget from it.
    pub fn set_config_value(&mut self, value: Value) -> Result<()> {
        let config = CarouselConfig::from_value(value)?;
        self.set_config(config)
    }

    /// Replace the configuration and rebuild. Any deferred work from the
    /// previous configuration is cancelled first.
    pub fn set_config(&mut self, config: CarouselConfig) -> Result<()> {
        self.timers.cancel_all(&mut self.scheduler);
        self.torn_down = false;
        self.remote_checked = false;

        self.translator = ScrollTranslator::new(config.orientation.axis());
        self.reconciler
            .set_threshold_px(config.timing.empty_threshold_px);
        self.sizing = Some(SizingEngine::for_config(&config));
        self.state.orientation = config.orientation;

        info!(
            card_id = %config.card_id,
            cards = config.cards.len(),
            orientation = config.orientation.template(),
            "carousel configured"
        );
        self.config = Some(Arc::new(config));
        self.render()
    }

    /// Full rebuild from the current configuration.
    pub fn render(&mut self) -> Result<()> {
        if self.torn_down {
            return Err(CarouselError::TornDown);
        }
        let config = self.config.clone().ok_or(CarouselError::NotConfigured)?;
        let axis = self.translator.axis();

        self.timers.cancel_all(&mut self.scheduler);
        self.looping.teardown();
        self.state.loop_enabled = false;
        self.surface.disconnect_content_observer();
        self.surface.clear();
        self.pagination.clear();
        self.surface.render_pagination(self.pagination.bullets());
        self.pending_remote_reset = None;
        self.navigation_target = None;
        self.registry = SlideRegistry::default();

        let factory = &mut self.factory;
        let built = SlideRegistry::build(&config.cards, |spec| {
            factory
                .create_panel(spec)
                .map_err(|err| CarouselError::PanelCreation {
                    index: spec.logical_index,
                    reason: format!("{err:#}"),
                })
        });
        self.registry = match built {
            Ok(registry) => registry,
            Err(err) => {
                error!(card_id = %config.card_id, error = %err, "failed to build slides");
                return Err(err);
            }
        };

        if let Some(hass) = &self.hass {
            for panel in self.registry.panels_mut() {
                panel.set_state(hass);
            }
        }
        let order = self.registry.order().to_vec();
        for index in &order {
            if let Some(slide) = self.registry.get_mut(*index) {
                self.surface.mount_slide(*index, slide.panel_mut());
            }
        }
        self.surface.set_smooth_scrolling(true);
        self.surface.set_scroll_offset(axis, 0.0);
        self.state.current_index = self.registry.first().unwrap_or(LogicalIndex::FIRST);

        let style = custom_style_block(&config.card_id, &config.custom_css);
        if !style.is_empty() {
            self.surface.apply_custom_style(&style);
        }
        if config.navigation {
            self.surface
                .render_navigation(&NavigationGlyphs::for_config(&config));
        }

        // Conditional cards may still disappear; wait for the sweep.
        self.pagination_deferred = config.pagination && config.has_conditional_cards();
        if config.pagination && !self.pagination_deferred {
            self.rebuild_pagination();
        }

        self.update_sizing();
        self.rearm_autoplay();
        self.timers.arm(
            &mut self.scheduler,
            TimerKind::Reconcile,
            config.timing.reconcile_grace(),
        );

        info!(
            card_id = %config.card_id,
            visible = self.registry.len(),
            loop_configured = config.loop_enabled,
            "carousel rendered"
        );

        // A rebuild drops any pending reset, so a request still present in
        // the latest snapshot is acted on again.
        if let Some(hass) = self.hass.clone() {
            self.check_remote_entity(&hass);
        }
        Ok(())
    }

    /// One reconciliation sweep: prune conditional slides that rendered
    /// empty. Returns the removed logical indices; running it again without
    /// a re-render removes nothing.
    ///
    /// An armed loop is re-checked against the new slide count. Arming
    /// itself waits for the sweep scheduled by [`render`](Self::render).
    pub fn reconcile(&mut self) -> Vec<LogicalIndex> {
        if self.torn_down {
            return Vec::new();
        }
        let Some(config) = self.config.clone() else {
            return Vec::new();
        };

        let empty = self.reconciler.find_empty(&self.registry, &self.surface);
        if empty.is_empty() {
            debug!(card_id = %config.card_id, "no empty conditional cards");
            return empty;
        }

        let removed = self
            .registry
            .remove_slides(|slide| empty.contains(&slide.logical_index()));
        for index in &removed {
            self.surface.unmount_slide(*index);
        }
        self.surface.flush_layout();

        if !self.registry.contains(self.state.current_index) {
            self.state.current_index = self.registry.first().unwrap_or(LogicalIndex::FIRST);
        }
        self.reset_scroll_instantly();
        self.sync_current_from_offset();

        self.rebuild_pagination();
        if self.looping.is_armed() {
            self.setup_loop(&config);
        }
        if self.sizing.as_ref().is_some_and(SizingEngine::needs_measurement) {
            self.update_sizing();
        }
        self.highlight_pagination();

        info!(
            card_id = %config.card_id,
            removed = ?removed,
            visible = self.registry.len(),
            "pruned empty conditional cards"
        );
        removed
    }

    /// Scroll position changed.
    pub fn on_scroll(&mut self) {
        if self.torn_down {
            return;
        }
        self.sync_current_from_offset();
        self.rearm_autoplay();
    }

    /// Scroll came to rest.
    pub fn on_scroll_settled(&mut self) {
        if self.torn_down {
            return;
        }
        let transition =
            self.looping
                .on_settled(&mut self.registry, &mut self.surface, &self.translator);
        if transition.relocated() {
            self.timers.arm(
                &mut self.scheduler,
                TimerKind::RestoreSmoothing,
                Duration::ZERO,
            );
        }
        self.sync_current_from_offset();
        self.navigation_target = None;
        self.issue_remote_reset();
    }

    /// Some card changed its rendered size.
    pub fn on_content_resized(&mut self) {
        if self.torn_down || !self.sizing.as_ref().is_some_and(SizingEngine::is_reactive) {
            return;
        }
        self.update_sizing();
    }

    /// A panel finished its first render.
    pub fn on_panel_rendered(&mut self, index: LogicalIndex) {
        if self.torn_down || !self.awaiting_layout {
            return;
        }
        debug!(logical_index = %index, "panel rendered");
        if self.all_panels_rendered() {
            self.update_sizing();
        }
    }

    /// A pagination indicator was clicked.
    pub fn on_pagination_click(&mut self, index: LogicalIndex) -> bool {
        self.navigate_to(index)
    }

    /// Step to the previous or next visible slide, wrapping when looping.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(target) = step_target(
            self.registry.order(),
            self.state.current_index,
            direction,
            self.state.loop_enabled,
        ) else {
            return false;
        };
        if target == self.state.current_index {
            debug!(?direction, current = %target, "already at the boundary");
            self.rearm_autoplay();
            return false;
        }
        self.navigate_to(target)
    }

    /// Touch or pointer interaction that did not navigate.
    pub fn on_user_interaction(&mut self) {
        if !self.torn_down {
            self.rearm_autoplay();
        }
    }

    /// Scroll to `target`. Every navigation goes through here; a new call
    /// supersedes a scroll still in flight.
    pub fn navigate_to(&mut self, target: LogicalIndex) -> bool {
        if self.torn_down {
            return false;
        }
        let axis = self.translator.axis();
        let Some(offset) =
            self.translator
                .offset_for_logical_index(self.registry.order(), &self.surface, target)
        else {
            debug!(slide = %target, "navigation target is not visible");
            return false;
        };

        if let Some(previous) = self.navigation_target.replace(target)
            && previous != target
        {
            debug!(previous = %previous, slide = %target, "superseding navigation in flight");
        }
        let from = self.surface.scroll_offset(axis);
        self.surface.scroll_to(axis, offset);
        self.state.current_index = target;
        self.highlight_pagination();
        self.rearm_autoplay();
        debug!(slide = %target, from, offset, "navigating");

        // No movement means no settle event will follow.
        if (offset - from).abs() < SETTLED_EPSILON_PX {
            self.navigation_target = None;
            self.issue_remote_reset();
        }
        true
    }

    /// New host state snapshot.
    pub fn set_hass(&mut self, hass: Arc<HassState>) {
        if self.torn_down {
            return;
        }
        let previous = self.hass.replace(Arc::clone(&hass));
        for panel in self.registry.panels_mut() {
            panel.set_state(&hass);
        }
        let Some(config) = self.config.clone() else {
            return;
        };

        if !self.remote_checked {
            self.check_remote_entity(&hass);
        } else if let Some(previous) = &previous {
            let remote = config.remote_entity();
            let before = previous.entity(remote.as_str());
            let after = hass.entity(remote.as_str());
            if before != after {
                self.on_remote_state_changed(after.cloned());
            }
        }

        if let Some(previous) = &previous {
            let changed = config
                .conditional_entities()
                .into_iter()
                .find(|entity| previous.state_of(entity) != hass.state_of(entity));
            if let Some(entity) = changed {
                debug!(entity = %entity, "conditional entity changed, scheduling rebuild");
                self.timers.arm(
                    &mut self.scheduler,
                    TimerKind::ConditionalDebounce,
                    config.timing.conditional_debounce(),
                );
            }
        }
    }

    /// The remote control entity changed.
    pub fn on_remote_state_changed(&mut self, state: Option<EntityState>) {
        if let Some(signal) = state.as_ref().and_then(EntityState::numeric) {
            self.handle_remote_signal(signal);
        }
    }

    /// Act on a 1-based remote index request. 0 means no request.
    pub fn handle_remote_signal(&mut self, signal: f64) {
        if self.torn_down {
            return;
        }
        let Some(config) = self.config.clone() else {
            return;
        };
        let Some(requested) = remote_target(signal, self.registry.configured_len()) else {
            return;
        };
        let Some(target) = self.registry.nearest_logical(requested) else {
            return;
        };
        info!(
            card_id = %config.card_id,
            signal,
            requested = %requested,
            slide = %target,
            "remote navigation requested"
        );

        self.pending_remote_reset = Some(config.remote_entity());
        if !self.navigate_to(target) {
            self.issue_remote_reset();
            return;
        }
        if self.pending_remote_reset.is_some() {
            self.timers.arm(
                &mut self.scheduler,
                TimerKind::RemoteSettleFallback,
                config.timing.remote_settle_fallback(),
            );
        }
    }

    /// Deliver a timer expiry. Expiries for cancelled or superseded timers
    /// are ignored.
    pub fn on_timer(&mut self, kind: TimerKind, token: TimerToken) -> Result<()> {
        if self.torn_down {
            debug!(%kind, "timer after teardown ignored");
            return Ok(());
        }
        if !self.timers.take_if_current(kind, token) {
            warn!(%kind, ?token, "ignoring stale timer");
            return Ok(());
        }
        match kind {
            TimerKind::Reconcile => {
                self.reconcile();
                if let Some(config) = self.config.clone() {
                    self.setup_loop(&config);
                }
                if self.pagination_deferred {
                    self.rebuild_pagination();
                }
            }
            TimerKind::Autoplay => {
                let target = if self.registry.contains(LogicalIndex::FIRST) {
                    Some(LogicalIndex::FIRST)
                } else {
                    self.registry.lowest_logical()
                };
                if let Some(target) = target {
                    debug!(slide = %target, "autoplay expired");
                    self.navigate_to(target);
                }
            }
            TimerKind::ConditionalDebounce => {
                info!("rebuilding after conditional entity change");
                self.render()?;
            }
            TimerKind::RestoreSmoothing => self.surface.set_smooth_scrolling(true),
            TimerKind::RemoteSettleFallback => {
                debug!("no settle event, resetting remote signal");
                self.navigation_target = None;
                self.issue_remote_reset();
            }
        }
        Ok(())
    }

    /// Release every timer and observer. Later events are ignored until a
    /// new configuration arrives.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.cancel_all(&mut self.scheduler);
        self.surface.disconnect_content_observer();
        self.looping.teardown();
        self.state.loop_enabled = false;
        self.pending_remote_reset = None;
        self.navigation_target = None;
        self.awaiting_layout = false;
        self.torn_down = true;
        info!(
            card_id = ?self.config.as_ref().map(|c| c.card_id.as_str()),
            "carousel torn down"
        );
    }

    /// Height the host should reserve for the widget.
    pub fn card_size(&self) -> f32 {
        let timing = self
            .config
            .as_ref()
            .map(|config| config.timing.clone())
            .unwrap_or_default();
        let tallest = self
            .registry
            .visible()
            .map(|slide| match slide.panel().size_hint() {
                Some(hint) => hint * timing.size_hint_px_per_unit,
                None => self.surface.card_height(slide.logical_index()),
            })
            .fold(0.0, f32::max);
        if tallest > 0.0 {
            tallest
        } else {
            timing.fallback_card_height_px
        }
    }

    /// Logical index of the current slide.
    pub fn current_index(&self) -> LogicalIndex {
        self.state.current_index
    }

    /// Position and loop state.
    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    /// Active configuration, if any.
    pub fn config(&self) -> Option<&CarouselConfig> {
        self.config.as_deref()
    }

    /// Logical indices in rendering order.
    pub fn visible_order(&self) -> &[LogicalIndex] {
        self.registry.order()
    }

    /// Visible slides and their rendering order.
    pub fn registry(&self) -> &SlideRegistry<F::Panel> {
        &self.registry
    }

    /// Panel of a visible slide.
    pub fn panel_mut(&mut self, index: LogicalIndex) -> Option<&mut F::Panel> {
        self.registry.get_mut(index).map(|slide| slide.panel_mut())
    }

    /// Current indicator set.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Whether settle events relocate slides.
    pub fn is_loop_armed(&self) -> bool {
        self.looping.is_armed()
    }

    /// Set by [`teardown`](Self::teardown) until the next configuration.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Target of a scroll still in flight.
    pub fn navigation_target(&self) -> Option<LogicalIndex> {
        self.navigation_target
    }

    /// A remote request is waiting for its scroll to settle.
    pub fn has_pending_remote_reset(&self) -> bool {
        self.pending_remote_reset.is_some()
    }

    /// Take the effects emitted since the last call.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// The host surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the host surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The timer backend.
    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    /// Mutable access to the timer backend.
    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    fn check_remote_entity(&mut self, hass: &HassState) {
        let Some(entity) = self.config.as_ref().map(|config| config.remote_entity()) else {
            return;
        };
        self.remote_checked = true;
        if let Some(signal) = hass.entity(entity.as_str()).and_then(EntityState::numeric) {
            self.handle_remote_signal(signal);
        }
    }

    fn issue_remote_reset(&mut self) {
        self.timers
            .disarm(&mut self.scheduler, TimerKind::RemoteSettleFallback);
        if let Some(entity_id) = self.pending_remote_reset.take() {
            info!(entity_id = entity_id.as_str(), "resetting remote index signal");
            self.effects.push(Effect::ResetRemoteSignal { entity_id });
        }
    }

    fn sync_current_from_offset(&mut self) {
        let offset = self.surface.scroll_offset(self.translator.axis());
        if let Some(index) =
            self.translator
                .index_for_offset(self.registry.order(), &self.surface, offset)
            && index != self.state.current_index
        {
            debug!(offset, from = %self.state.current_index, to = %index, "current slide changed");
            self.state.current_index = index;
        }
        self.highlight_pagination();
    }

    fn reset_scroll_instantly(&mut self) {
        let axis = self.translator.axis();
        self.surface.set_smooth_scrolling(false);
        self.surface.set_scroll_offset(axis, 0.0);
        self.surface.flush_layout();
        self.timers.arm(
            &mut self.scheduler,
            TimerKind::RestoreSmoothing,
            Duration::ZERO,
        );
    }

    fn setup_loop(&mut self, config: &CarouselConfig) {
        self.state.loop_enabled = self
            .looping
            .setup(config.loop_enabled, self.registry.len());
    }

    fn rearm_autoplay(&mut self) {
        if let Some(delay) = self.config.as_ref().and_then(|config| config.autoplay()) {
            self.timers
                .arm(&mut self.scheduler, TimerKind::Autoplay, delay);
        }
    }

    fn rebuild_pagination(&mut self) {
        self.pagination_deferred = false;
        if !self.config.as_ref().is_some_and(|config| config.pagination) {
            return;
        }
        self.pagination
            .rebuild(self.registry.order(), self.state.current_index);
        self.surface.render_pagination(self.pagination.bullets());
    }

    fn highlight_pagination(&mut self) {
        if self.pagination.highlight(self.state.current_index) {
            self.surface.render_pagination(self.pagination.bullets());
        }
    }

    fn all_panels_rendered(&self) -> bool {
        self.registry
            .visible()
            .all(|slide| slide.panel().is_rendered())
    }

    fn tallest_card(&self) -> f32 {
        self.registry
            .order()
            .iter()
            .map(|index| self.surface.card_height(*index))
            .fold(0.0, f32::max)
    }

    fn update_sizing(&mut self) {
        let Some(sizing) = &self.sizing else {
            return;
        };
        if sizing.is_reactive() {
            self.surface.observe_content_size(self.registry.order());
        }
        let tallest = if sizing.needs_measurement() {
            if !self.all_panels_rendered() {
                debug!("waiting for panels to render before measuring");
                self.awaiting_layout = true;
                return;
            }
            Some(self.tallest_card())
        } else {
            None
        };
        self.awaiting_layout = false;
        let plan = sizing.plan(tallest);
        debug!(?plan, "applying sizing");
        self.surface.apply_sizing(&plan);
    }
}

impl<F, S> SwipeCarousel<F, S, ManualScheduler>
where
    F: PanelFactory,
    S: Surface<Panel = F::Panel>,
{
    /// Advance the virtual clock, delivering every timer that falls due,
    /// including ones scheduled while delivering.
    pub fn advance_time(&mut self, by: Duration) -> Result<()> {
        let deadline = self.scheduler.now() + by;
        while let Some((kind, token)) = self.scheduler.pop_due(deadline) {
            self.on_timer(kind, token)?;
        }
        self.scheduler.advance_clock(deadline);
        Ok(())
    }
}
