//! # Swipecard Core
//!
//! Headless engine for a scroll-snap carousel that hosts arbitrary child
//! panels ("cards") along one axis.
//!
//! ## Overview
//!
//! The engine keeps four views of "where are we" consistent:
//!
//! - the configured card list, addressed by [`LogicalIndex`](swipecard_model::LogicalIndex)
//! - the rendered slide order, which shrinks when empty conditional cards are
//!   pruned and rotates under the loop illusion
//! - the scroll offset reported by the host
//! - the current index used by pagination, autoplay and remote control
//!
//! ## Architecture
//!
//! - [`registry`]: slide arena and rendering order
//! - [`translator`]: offset ↔ logical index conversion
//! - [`reconciler`]: heuristic empty-card detection for conditional cards
//! - [`looping`]: boundary slide relocation after settle events
//! - [`navigation`]: pagination, prev/next stepping, remote requests
//! - [`sizing`]: track and card heights
//! - [`scheduler`]: timer abstraction with a virtual clock for tests
//! - [`host`]: traits the embedding host implements
//! - [`carousel`]: the [`SwipeCarousel`] state machine
//! - [`runtime`]: a tokio event loop driving one carousel
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use swipecard_core::{CarouselRuntime, HostServices, PanelFactory, Surface};
//!
//! async fn attach<F, S>(factory: F, surface: S, services: Arc<dyn HostServices>)
//! where
//!     F: PanelFactory,
//!     S: Surface<Panel = F::Panel>,
//! {
//!     let (runtime, handle) = CarouselRuntime::new(factory, surface, services);
//!     handle
//!         .configure_raw(serde_json::json!({ "cards": [{ "type": "tile" }] }))
//!         .ok();
//!     let _ = runtime.run().await;
//! }
//! ```

pub mod carousel;
pub mod error;
pub mod host;
pub mod looping;
pub mod navigation;
pub mod reconciler;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod sizing;
pub mod translator;

pub use carousel::{CarouselState, Effect, SwipeCarousel};
pub use error::{CarouselError, Result};
pub use host::{
    ChildPanel, HostServices, InnerContent, LayoutMetrics, PanelFactory, ServiceCall,
    SlidePlacement, SlideMeasurement, StateSink, Surface,
};
pub use looping::{LoopEngine, LoopTransition, MIN_LOOP_SLIDES};
pub use navigation::{Direction, Pagination, PaginationBullet};
pub use reconciler::{EmptyDetector, Reconciler};
pub use registry::{Slide, SlideRegistry};
pub use runtime::{CarouselEvent, CarouselHandle, CarouselRuntime, TokioScheduler};
pub use scheduler::{ManualScheduler, Scheduler, TimerKind, TimerSlots, TimerToken};
pub use sizing::{HeightValue, SizingEngine, SizingMode, SizingPlan, VerticalOverflow};
pub use translator::ScrollTranslator;
