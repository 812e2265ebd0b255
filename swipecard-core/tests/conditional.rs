mod support;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use support::{
    FakeFactory, FakeSurface, carousel_with, conditional, config, indices, init_tracing, tiles,
};
use swipecard_config::ConfigError;
use swipecard_core::{CarouselError, ManualScheduler, SwipeCarousel, TimerKind};
use swipecard_model::{HassState, LogicalIndex};

const GRACE: Duration = Duration::from_millis(300);

fn door_deck() -> Value {
    json!({
        "cards": [
            { "type": "tile" },
            { "type": "tile" },
            conditional("binary_sensor.door"),
            { "type": "tile" }
        ],
        "pagination": true
    })
}

fn door(state: &str) -> Arc<HassState> {
    Arc::new(HassState::new().with_entity("binary_sensor.door", state))
}

#[test]
fn empty_conditional_card_is_pruned_after_the_grace_period() {
    let mut carousel =
        carousel_with(FakeFactory::default(), FakeSurface::default().with_empty(2), door_deck());
    assert_eq!(carousel.visible_order().len(), 4);

    carousel.navigate_to(LogicalIndex(2));
    assert_eq!(carousel.current_index(), LogicalIndex(2));

    carousel.advance_time(GRACE - Duration::from_millis(1)).unwrap();
    assert_eq!(carousel.visible_order().len(), 4);

    carousel.advance_time(Duration::from_millis(1)).unwrap();
    assert_eq!(carousel.visible_order(), indices(&[0, 1, 3]).as_slice());
    assert_eq!(carousel.surface().order, indices(&[0, 1, 3]));
    assert_eq!(carousel.current_index(), LogicalIndex(0));

    let keyed: Vec<_> = carousel
        .pagination()
        .bullets()
        .iter()
        .map(|bullet| bullet.logical_index)
        .collect();
    assert_eq!(keyed, indices(&[0, 1, 3]));
    assert_eq!(carousel.surface().active_bullets(), indices(&[0]));

    // Instant reset, smoothing back on the next frame.
    assert_eq!(carousel.surface().offset, 0.0);
    assert!(carousel.surface().smooth);
}

#[test]
fn reconciliation_is_a_fixed_point() {
    let mut carousel =
        carousel_with(FakeFactory::default(), FakeSurface::default().with_empty(2), door_deck());

    assert_eq!(carousel.reconcile(), indices(&[2]));
    let once = carousel.visible_order().to_vec();
    assert!(carousel.reconcile().is_empty());
    assert_eq!(carousel.visible_order(), once.as_slice());

    // The scheduled sweep finds nothing left to do.
    carousel.advance_time(GRACE).unwrap();
    assert_eq!(carousel.visible_order(), once.as_slice());
}

#[test]
fn plain_cards_are_never_pruned() {
    let mut carousel = carousel_with(
        FakeFactory::default(),
        FakeSurface::default().with_empty(1),
        door_deck(),
    );

    carousel.advance_time(GRACE).unwrap();
    assert_eq!(carousel.visible_order().len(), 4);
}

#[test]
fn new_configuration_supersedes_a_pending_sweep() {
    let mut carousel =
        carousel_with(FakeFactory::default(), FakeSurface::default().with_empty(2), door_deck());

    carousel.advance_time(Duration::from_millis(100)).unwrap();
    carousel.set_config(config(door_deck())).unwrap();

    // The first sweep would have run at 300ms.
    carousel.advance_time(Duration::from_millis(250)).unwrap();
    assert_eq!(carousel.visible_order().len(), 4);

    carousel.advance_time(Duration::from_millis(50)).unwrap();
    assert_eq!(carousel.visible_order(), indices(&[0, 1, 3]).as_slice());
}

#[test]
fn conditional_entity_change_rebuilds_after_debounce() {
    let mut carousel = carousel_with(
        FakeFactory::default(),
        FakeSurface::default().with_empty(2),
        door_deck(),
    );
    carousel.set_hass(door("off"));
    carousel.advance_time(GRACE).unwrap();
    assert_eq!(carousel.visible_order().len(), 3);

    carousel.surface_mut().empty.clear();
    carousel.set_hass(door("on"));
    assert!(carousel.scheduler().is_pending(TimerKind::ConditionalDebounce));

    carousel.advance_time(Duration::from_millis(60)).unwrap();
    carousel.set_hass(door("unavailable"));
    carousel.advance_time(Duration::from_millis(60)).unwrap();
    assert_eq!(carousel.visible_order().len(), 3);

    carousel.advance_time(Duration::from_millis(40)).unwrap();
    assert_eq!(carousel.visible_order(), indices(&[0, 1, 2, 3]).as_slice());
    assert_eq!(carousel.surface().order, indices(&[0, 1, 2, 3]));

    // Rebuilt panels get the latest state.
    let panel = carousel.registry().get(LogicalIndex(2)).unwrap().panel();
    assert_eq!(panel.state_updates, 1);

    carousel.advance_time(GRACE).unwrap();
    assert_eq!(carousel.visible_order().len(), 4);
}

#[test]
fn unrelated_entity_changes_do_not_rebuild() {
    let mut carousel = carousel_with(FakeFactory::default(), FakeSurface::default(), door_deck());
    carousel.set_hass(door("on"));

    let next = HassState::new()
        .with_entity("binary_sensor.door", "on")
        .with_entity("sensor.temperature", "21.5");
    carousel.set_hass(Arc::new(next));

    assert!(!carousel.scheduler().is_pending(TimerKind::ConditionalDebounce));
    let panel = carousel.registry().get(LogicalIndex(0)).unwrap().panel();
    assert_eq!(panel.state_updates, 2);
}

#[test]
fn panel_creation_failure_aborts_the_render() {
    init_tracing();
    let factory = FakeFactory {
        fail_at: Some(LogicalIndex(1)),
        ..FakeFactory::default()
    };
    let mut carousel = SwipeCarousel::new(factory, FakeSurface::default(), ManualScheduler::new());

    let err = carousel.set_config(config(json!({ "cards": tiles(3) }))).unwrap_err();
    match err {
        CarouselError::PanelCreation { index, reason } => {
            assert_eq!(index, LogicalIndex(1));
            assert!(reason.contains("tile"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(carousel.visible_order().is_empty());
}

#[test]
fn missing_cards_fail_loudly() {
    init_tracing();
    let mut carousel = SwipeCarousel::new(
        FakeFactory::default(),
        FakeSurface::default(),
        ManualScheduler::new(),
    );

    let err = carousel
        .set_config_value(json!({ "type": "custom:css-swipe-card" }))
        .unwrap_err();
    assert!(matches!(err, CarouselError::Config(ConfigError::MissingCards)));

    let err = carousel.set_config_value(json!({ "cards": "tile" })).unwrap_err();
    assert!(matches!(err, CarouselError::Config(ConfigError::CardsNotList(_))));

    let err = carousel
        .set_config_value(json!({ "cards": tiles(1), "timer": 1e20 }))
        .unwrap_err();
    assert!(matches!(
        err,
        CarouselError::Config(ConfigError::InvalidField { field: "timer", .. })
    ));
    assert!(carousel.visible_order().is_empty());
}
