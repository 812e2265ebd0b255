//! Tokio driver for a [`SwipeCarousel`].
//!
//! Host glue pushes [`CarouselEvent`]s through a [`CarouselHandle`]; the
//! runtime applies them one at a time, so the state machine never sees two
//! events interleave. Timers are spawned sleeps that post an event back on
//! expiry, and service calls emitted by the state machine run as detached
//! tasks whose failures are only logged.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use swipecard_config::CarouselConfig;
use swipecard_model::{EntityState, HassState, LogicalIndex};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::carousel::{Effect, SwipeCarousel};
use crate::error::{CarouselError, Result};
use crate::host::{HostServices, PanelFactory, ServiceCall, Surface};
use crate::navigation::Direction;
use crate::scheduler::{Scheduler, TimerKind, TimerToken};

/// Everything that can happen to a carousel.
#[derive(Debug)]
pub enum CarouselEvent {
    /// Validated configuration.
    Configure(Box<CarouselConfig>),
    /// Raw dashboard configuration, validated on arrival.
    ConfigureRaw(Value),
    /// New host state snapshot.
    HassUpdated(Arc<HassState>),
    /// Direct notification for the remote control entity.
    RemoteStateChanged(Option<EntityState>),
    /// The track scrolled.
    Scrolled,
    /// The track came to rest.
    ScrollSettled,
    /// A card changed its rendered size.
    ContentResized,
    /// A panel finished its first render.
    PanelRendered(LogicalIndex),
    /// A pagination indicator was clicked.
    PaginationClicked(LogicalIndex),
    /// Prev/next control pressed.
    Navigate(Direction),
    /// Touch or pointer input that did not navigate.
    UserInteraction,
    /// Sent by [`TokioScheduler`] when a sleep completes.
    TimerFired { kind: TimerKind, token: TimerToken },
    /// The widget was detached.
    Teardown,
}

/// Scheduler backed by spawned `tokio::time::sleep` tasks.
///
/// Holds only a weak sender so pending timers do not keep the event
/// channel open once every handle is gone.
#[derive(Debug)]
pub struct TokioScheduler {
    events: mpsc::WeakUnboundedSender<CarouselEvent>,
    next_token: u64,
    tasks: HashMap<TimerToken, AbortHandle>,
}

impl TokioScheduler {
    /// Scheduler posting expiries to `events`.
    pub fn new(events: &mpsc::UnboundedSender<CarouselEvent>) -> Self {
        Self {
            events: events.downgrade(),
            next_token: 0,
            tasks: HashMap::new(),
        }
    }

    /// Forget a timer whose expiry was delivered.
    pub fn complete(&mut self, token: TimerToken) {
        self.tasks.remove(&token);
    }

    /// Timers still sleeping.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(events) = events.upgrade() {
                let _ = events.send(CarouselEvent::TimerFired { kind, token });
            }
        });
        self.tasks.insert(token, task.abort_handle());
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(task) = self.tasks.remove(&token) {
            task.abort();
        }
    }
}

/// Cloneable sender used by host glue.
#[derive(Debug, Clone)]
pub struct CarouselHandle {
    events: mpsc::UnboundedSender<CarouselEvent>,
}

impl CarouselHandle {
    /// Queue an event. Fails once the runtime has stopped.
    pub fn send(&self, event: CarouselEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| CarouselError::TornDown)
    }

    /// Apply a validated configuration.
    pub fn configure(&self, config: CarouselConfig) -> Result<()> {
        self.send(CarouselEvent::Configure(Box::new(config)))
    }

    /// Apply a dashboard configuration object.
    pub fn configure_raw(&self, value: Value) -> Result<()> {
        self.send(CarouselEvent::ConfigureRaw(value))
    }

    /// Forward a host state snapshot.
    pub fn set_hass(&self, hass: Arc<HassState>) -> Result<()> {
        self.send(CarouselEvent::HassUpdated(hass))
    }

    /// The track scrolled.
    pub fn scrolled(&self) -> Result<()> {
        self.send(CarouselEvent::Scrolled)
    }

    /// The track came to rest.
    pub fn scroll_settled(&self) -> Result<()> {
        self.send(CarouselEvent::ScrollSettled)
    }

    /// Prev/next control pressed.
    pub fn navigate(&self, direction: Direction) -> Result<()> {
        self.send(CarouselEvent::Navigate(direction))
    }

    /// Pagination indicator pressed.
    pub fn pagination_clicked(&self, index: LogicalIndex) -> Result<()> {
        self.send(CarouselEvent::PaginationClicked(index))
    }

    /// Detach the widget.
    pub fn teardown(&self) -> Result<()> {
        self.send(CarouselEvent::Teardown)
    }
}

/// Drives one carousel from an event channel, one event at a time, and
/// performs the service calls it asks for.
pub struct CarouselRuntime<F, S>
where
    F: PanelFactory,
{
    carousel: SwipeCarousel<F, S, TokioScheduler>,
    events: mpsc::UnboundedReceiver<CarouselEvent>,
    services: Arc<dyn HostServices>,
    calls: JoinSet<()>,
}

impl<F, S> fmt::Debug for CarouselRuntime<F, S>
where
    F: PanelFactory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarouselRuntime")
            .field("carousel", &self.carousel)
            .field("in_flight_calls", &self.calls.len())
            .finish_non_exhaustive()
    }
}

impl<F, S> CarouselRuntime<F, S>
where
    F: PanelFactory,
    S: Surface<Panel = F::Panel>,
{
    /// Runtime plus the handle host glue sends events through.
    pub fn new(factory: F, surface: S, services: Arc<dyn HostServices>) -> (Self, CarouselHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = TokioScheduler::new(&tx);
        let runtime = Self {
            carousel: SwipeCarousel::new(factory, surface, scheduler),
            events: rx,
            services,
            calls: JoinSet::new(),
        };
        (runtime, CarouselHandle { events: tx })
    }

    /// The carousel being driven.
    pub fn carousel(&self) -> &SwipeCarousel<F, S, TokioScheduler> {
        &self.carousel
    }

    /// Process events until teardown or until every handle is dropped.
    /// Returns the carousel for inspection; fails on a configuration or
    /// render error, after tearing down.
    pub async fn run(mut self) -> Result<SwipeCarousel<F, S, TokioScheduler>> {
        info!("carousel runtime started");
        while let Some(event) = self.events.recv().await {
            let stop = matches!(event, CarouselEvent::Teardown);
            if let Err(err) = self.dispatch(event) {
                error!(error = %err, "carousel event failed");
                self.carousel.teardown();
                self.finish_calls().await;
                return Err(err);
            }
            self.perform_effects();
            self.reap_calls();
            if stop {
                break;
            }
        }
        self.carousel.teardown();
        self.finish_calls().await;
        info!("carousel runtime stopped");
        Ok(self.carousel)
    }

    fn dispatch(&mut self, event: CarouselEvent) -> Result<()> {
        debug!(?event, "carousel event");
        match event {
            CarouselEvent::Configure(config) => return self.carousel.set_config(*config),
            CarouselEvent::ConfigureRaw(value) => return self.carousel.set_config_value(value),
            CarouselEvent::HassUpdated(hass) => self.carousel.set_hass(hass),
            CarouselEvent::RemoteStateChanged(state) => {
                self.carousel.on_remote_state_changed(state)
            }
            CarouselEvent::Scrolled => self.carousel.on_scroll(),
            CarouselEvent::ScrollSettled => self.carousel.on_scroll_settled(),
            CarouselEvent::ContentResized => self.carousel.on_content_resized(),
            CarouselEvent::PanelRendered(index) => self.carousel.on_panel_rendered(index),
            CarouselEvent::PaginationClicked(index) => {
                self.carousel.on_pagination_click(index);
            }
            CarouselEvent::Navigate(direction) => {
                self.carousel.navigate(direction);
            }
            CarouselEvent::UserInteraction => self.carousel.on_user_interaction(),
            CarouselEvent::TimerFired { kind, token } => {
                self.carousel.scheduler_mut().complete(token);
                return self.carousel.on_timer(kind, token);
            }
            CarouselEvent::Teardown => self.carousel.teardown(),
        }
        Ok(())
    }

    fn perform_effects(&mut self) {
        for effect in self.carousel.drain_effects() {
            match effect {
                Effect::ResetRemoteSignal { entity_id } => {
                    let services = Arc::clone(&self.services);
                    let call = ServiceCall::reset_input_number(&entity_id);
                    self.calls.spawn(async move {
                        if let Err(err) = services.call_service(call).await {
                            error!(
                                entity_id = entity_id.as_str(),
                                error = %err,
                                "failed to reset remote index signal"
                            );
                        }
                    });
                }
            }
        }
    }

    fn reap_calls(&mut self) {
        while let Some(joined) = self.calls.try_join_next() {
            if let Err(err) = joined {
                warn!(error = %err, "service call task failed");
            }
        }
    }

    async fn finish_calls(&mut self) {
        while let Some(joined) = self.calls.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "service call task failed");
            }
        }
    }
}
