//! The dashboard configuration schema and its validation.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use swipecard_model::{CardSpec, EntityId, Orientation};
use tracing::debug;

use crate::dimension::Dimension;
use crate::error::{ConfigError, json_type_name};

/// Prefix for generated widget ids.
pub const CARD_ID_PREFIX: &str = "css-swipe-card-";

/// Timing and measurement knobs. The defaults are the values the widget has
/// always shipped with; they are exposed so hosts with slow panels can widen
/// them instead of patching the engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Grace period after render before conditional cards are inspected.
    pub reconcile_grace_ms: u64,
    /// Debounce window for rebuilds triggered by conditional entity changes.
    pub conditional_debounce_ms: u64,
    /// How long a remote index request waits for the scroll to settle before
    /// the control entity is reset anyway.
    pub remote_settle_fallback_ms: u64,
    /// Height reported when no card has a measurable height.
    pub fallback_card_height_px: f32,
    /// Slides rendering smaller than this are considered collapsed.
    pub empty_threshold_px: f32,
    /// Pixels per unit of a panel's size hint.
    pub size_hint_px_per_unit: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reconcile_grace_ms: 300,
            conditional_debounce_ms: 100,
            remote_settle_fallback_ms: 500,
            fallback_card_height_px: 140.0,
            empty_threshold_px: 10.0,
            size_hint_px_per_unit: 50.0,
        }
    }
}

impl TimingConfig {
    /// Delay between render and the reconciliation sweep.
    pub fn reconcile_grace(&self) -> Duration {
        Duration::from_millis(self.reconcile_grace_ms)
    }

    /// Debounce for conditional entity rebuilds.
    pub fn conditional_debounce(&self) -> Duration {
        Duration::from_millis(self.conditional_debounce_ms)
    }

    /// Wait for a settle before resetting the remote signal.
    pub fn remote_settle_fallback(&self) -> Duration {
        Duration::from_millis(self.remote_settle_fallback_ms)
    }
}

/// Longest accepted autoplay countdown.
pub const MAX_TIMER_SECONDS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// How the track and card heights are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightMode {
    /// Size everything to the tallest visible card and re-measure whenever
    /// card content changes size.
    Auto,
    /// Apply the configured `height` to track and slides.
    Fixed,
    /// Orientation-dependent defaults, computed once.
    #[default]
    Manual,
}

/// Validated, immutable carousel configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselConfig {
    /// Widget id; also names the remote `input_number` entity.
    pub card_id: String,
    /// Configured cards in logical order.
    pub cards: Vec<CardSpec>,
    /// From `template` (or `orientation`).
    pub orientation: Orientation,
    /// Kept as written; [`HeightMode`] is what drives sizing.
    pub auto_height: bool,
    /// Resolved sizing mode.
    pub height_mode: HeightMode,
    /// Gap between slides.
    pub card_gap: Dimension,
    /// Autoplay countdown in seconds; `0` disables autoplay.
    pub timer_seconds: f64,
    /// Show pagination indicators.
    pub pagination: bool,
    /// Show prev/next buttons.
    pub navigation: bool,
    /// Icon for the prev button.
    pub navigation_prev: Option<String>,
    /// Icon for the next button.
    pub navigation_next: Option<String>,
    /// Configured `loop`; takes effect with three or more visible slides.
    pub loop_enabled: bool,
    /// Style declarations scoped to the widget.
    pub custom_css: BTreeMap<String, String>,
    /// Track height for fixed and manual sizing.
    pub height: Option<Dimension>,
    /// Track width.
    pub width: Dimension,
    /// Timing and measurement knobs.
    pub timing: TimingConfig,
}

/// A value written either as a number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// The dashboard schema as written, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCarouselConfig {
    #[serde(rename = "cardId", alias = "card_id")]
    card_id: Option<String>,
    cards: Option<Value>,
    template: Option<String>,
    orientation: Option<String>,
    auto_height: Option<bool>,
    height_mode: Option<HeightMode>,
    card_gap: Option<Scalar>,
    timer: Option<Scalar>,
    pagination: Option<bool>,
    navigation: Option<bool>,
    navigation_prev: Option<String>,
    navigation_next: Option<String>,
    #[serde(rename = "loop")]
    loop_enabled: Option<bool>,
    custom_css: Option<BTreeMap<String, Scalar>>,
    height: Option<Scalar>,
    width: Option<Scalar>,
    timing: Option<TimingConfig>,
    /// Keys owned by the host (`type`, `view_layout`, ...).
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl RawCarouselConfig {
    fn validate(self) -> Result<CarouselConfig, ConfigError> {
        let cards = match self.cards {
            None | Some(Value::Null) => return Err(ConfigError::MissingCards),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| CardSpec::from_value(index, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ConfigError::CardsNotList(json_type_name(&other)));
            }
        };

        let orientation = match self.template.or(self.orientation) {
            None => Orientation::default(),
            Some(template) => Orientation::from_template(&template)
                .ok_or(ConfigError::InvalidTemplate(template))?,
        };

        let auto_height = self.auto_height.unwrap_or(false);
        let height = dimension("height", self.height)?;
        let height_mode = match self.height_mode {
            Some(mode) => mode,
            None if auto_height => HeightMode::Auto,
            None => HeightMode::Manual,
        };
        if height_mode == HeightMode::Fixed && height.is_none() {
            return Err(ConfigError::InvalidField {
                field: "height_mode",
                reason: "fixed mode requires `height`".to_string(),
            });
        }

        let timer_seconds = timer_seconds(self.timer)?;

        let custom_css = self
            .custom_css
            .unwrap_or_default()
            .into_iter()
            .map(|(property, value)| (property, value.into_text()))
            .collect();

        let card_id = self
            .card_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_card_id);
        EntityId::parse(format!("input_number.{card_id}"))?;

        if !self.extra.is_empty() {
            debug!(
                card_id = %card_id,
                ignored = ?self.extra.keys().collect::<Vec<_>>(),
                "ignoring unrecognised configuration keys"
            );
        }

        Ok(CarouselConfig {
            card_id,
            cards,
            orientation,
            auto_height,
            height_mode,
            card_gap: dimension("card_gap", self.card_gap)?.unwrap_or(Dimension::ZERO),
            timer_seconds,
            pagination: self.pagination.unwrap_or(false),
            navigation: self.navigation.unwrap_or(false),
            navigation_prev: self.navigation_prev.filter(|icon| !icon.is_empty()),
            navigation_next: self.navigation_next.filter(|icon| !icon.is_empty()),
            loop_enabled: self.loop_enabled.unwrap_or(false),
            custom_css,
            height,
            width: dimension("width", self.width)?.unwrap_or(Dimension::Percent(100.0)),
            timing: self.timing.unwrap_or_default(),
        })
    }
}

impl CarouselConfig {
    /// Validate a configuration object as delivered by the dashboard.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let raw: RawCarouselConfig = serde_json::from_value(value)?;
        raw.validate()
    }

    /// Autoplay countdown, when enabled.
    pub fn autoplay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timer_seconds)
            .ok()
            .filter(|delay| !delay.is_zero())
    }

    /// Whether any card may be pruned.
    pub fn has_conditional_cards(&self) -> bool {
        self.cards.iter().any(CardSpec::is_conditional)
    }

    /// Entity used for remote index control.
    pub fn remote_entity(&self) -> EntityId {
        EntityId::input_number(&self.card_id)
    }

    /// Every entity referenced by a conditional card, deduplicated.
    pub fn conditional_entities(&self) -> Vec<String> {
        let mut entities: Vec<String> = self
            .cards
            .iter()
            .filter(|card| card.is_conditional())
            .flat_map(|card| card.condition_entities().map(str::to_string))
            .collect();
        entities.sort();
        entities.dedup();
        entities
    }
}

fn generate_card_id() -> String {
    let simple = uuid::Uuid::new_v4().simple().to_string();
    format!("{CARD_ID_PREFIX}{}", &simple[..9])
}

fn timer_seconds(raw: Option<Scalar>) -> Result<f64, ConfigError> {
    let seconds = match raw {
        None => return Ok(0.0),
        Some(Scalar::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Scalar::Text(s)) => {
            s.trim().parse::<f64>().map_err(|_| ConfigError::InvalidField {
                field: "timer",
                reason: format!("{s:?} is not a number"),
            })?
        }
    };
    let delay = Duration::try_from_secs_f64(seconds).map_err(|err| {
        ConfigError::InvalidField {
            field: "timer",
            reason: format!("{seconds} is not a usable number of seconds: {err}"),
        }
    })?;
    if delay.as_secs_f64() > MAX_TIMER_SECONDS {
        return Err(ConfigError::InvalidField {
            field: "timer",
            reason: format!("{seconds} exceeds the {MAX_TIMER_SECONDS} second limit"),
        });
    }
    Ok(seconds)
}

fn dimension(
    field: &'static str,
    raw: Option<Scalar>,
) -> Result<Option<Dimension>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let text = raw.into_text();
    Dimension::parse(&text)
        .map(Some)
        .map_err(|_| ConfigError::InvalidDimension { field, value: text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swipecard_model::LogicalIndex;

    fn cards(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({ "type": "markdown", "content": format!("card {i}") }))
                .collect(),
        )
    }

    #[test]
    fn defaults_match_dashboard_schema() {
        let config =
            CarouselConfig::from_value(json!({ "cards": cards(2) })).unwrap();

        assert_eq!(config.orientation, Orientation::Horizontal);
        assert!(!config.auto_height);
        assert_eq!(config.height_mode, HeightMode::Manual);
        assert_eq!(config.card_gap, Dimension::Px(0.0));
        assert_eq!(config.timer_seconds, 0.0);
        assert!(config.autoplay().is_none());
        assert!(!config.pagination && !config.navigation && !config.loop_enabled);
        assert!(config.custom_css.is_empty());
        assert_eq!(config.height, None);
        assert_eq!(config.width, Dimension::Percent(100.0));
        assert_eq!(config.timing, TimingConfig::default());
        assert!(config.card_id.starts_with(CARD_ID_PREFIX));
        assert_eq!(config.card_id.len(), CARD_ID_PREFIX.len() + 9);
        assert_eq!(config.cards[1].logical_index, LogicalIndex(1));
    }

    #[test]
    fn missing_or_malformed_cards_fail_loudly() {
        assert!(matches!(
            CarouselConfig::from_value(json!({ "pagination": true })),
            Err(ConfigError::MissingCards)
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": { "type": "x" } })),
            Err(ConfigError::CardsNotList("an object"))
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": [{ "type": "x" }, 4] })),
            Err(ConfigError::InvalidCard { index: 1, .. })
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!(["cards"])),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn reads_every_option() {
        let config = CarouselConfig::from_value(json!({
            "type": "custom:css-swipe-card",
            "cardId": "living_room",
            "cards": cards(3),
            "template": "slider-vertical",
            "auto_height": true,
            "card_gap": "8px",
            "timer": 5,
            "pagination": true,
            "navigation": true,
            "navigation_prev": "mdi:chevron-up",
            "navigation_next": "",
            "loop": true,
            "custom_css": { "--pagination-bullet-distance": "4px", "z-index": 2 },
            "height": "320px",
            "timing": { "reconcile_grace_ms": 50 }
        }))
        .unwrap();

        assert_eq!(config.card_id, "living_room");
        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.height_mode, HeightMode::Auto);
        assert_eq!(config.card_gap, Dimension::Px(8.0));
        assert_eq!(config.autoplay(), Some(Duration::from_secs(5)));
        assert_eq!(config.navigation_prev.as_deref(), Some("mdi:chevron-up"));
        assert_eq!(config.navigation_next, None);
        assert!(config.loop_enabled);
        assert_eq!(config.custom_css["z-index"], "2");
        assert_eq!(config.height, Some(Dimension::Px(320.0)));
        assert_eq!(config.timing.reconcile_grace_ms, 50);
        assert_eq!(config.timing.conditional_debounce_ms, 100);
        assert_eq!(config.remote_entity().as_str(), "input_number.living_room");
    }

    #[test]
    fn orientation_alias_and_bad_template() {
        let config = CarouselConfig::from_value(
            json!({ "cards": cards(1), "orientation": "vertical" }),
        )
        .unwrap();
        assert_eq!(config.orientation, Orientation::Vertical);

        assert!(matches!(
            CarouselConfig::from_value(
                json!({ "cards": cards(1), "template": "slider-diagonal" })
            ),
            Err(ConfigError::InvalidTemplate(t)) if t == "slider-diagonal"
        ));
    }

    #[test]
    fn rejects_bad_scalars() {
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": cards(1), "timer": -1 })),
            Err(ConfigError::InvalidField { field: "timer", .. })
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": cards(1), "loop": "yes" })),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": cards(1), "height_mode": "tall" })),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            CarouselConfig::from_value(json!({ "cards": cards(1), "height": "1px;x" })),
            Err(ConfigError::InvalidDimension { field: "height", .. })
        ));
        assert!(matches!(
            CarouselConfig::from_value(
                json!({ "cards": cards(1), "height_mode": "fixed" })
            ),
            Err(ConfigError::InvalidField { field: "height_mode", .. })
        ));
    }

    #[test]
    fn collects_conditional_entities() {
        let config = CarouselConfig::from_value(json!({
            "cards": [
                { "type": "markdown" },
                { "type": "conditional", "conditions": [{ "entity": "sun.sun", "state": "above_horizon" }] },
                { "type": "conditional", "conditions": [{ "entity": "sun.sun" }, { "entity": "binary_sensor.door" }] }
            ]
        }))
        .unwrap();

        assert!(config.has_conditional_cards());
        assert_eq!(
            config.conditional_entities(),
            vec!["binary_sensor.door".to_string(), "sun.sun".to_string()]
        );
    }

    #[test]
    fn timer_accepts_text_and_rejects_unusable_durations() {
        let config =
            CarouselConfig::from_value(json!({ "cards": cards(1), "timer": " 2.5 " }))
                .unwrap();
        assert_eq!(config.autoplay(), Some(Duration::from_millis(2500)));

        for timer in [json!(1e20), json!("1e20"), json!(MAX_TIMER_SECONDS + 1.0), json!("soon")] {
            assert!(
                matches!(
                    CarouselConfig::from_value(json!({ "cards": cards(1), "timer": timer.clone() })),
                    Err(ConfigError::InvalidField { field: "timer", .. })
                ),
                "timer {timer} should be rejected"
            );
        }

        let config = CarouselConfig::from_value(
            json!({ "cards": cards(1), "timer": MAX_TIMER_SECONDS }),
        )
        .unwrap();
        assert!(config.autoplay().is_some());
    }

    #[test]
    fn unknown_keys_and_nulls_are_tolerated() {
        let config = CarouselConfig::from_value(json!({
            "type": "custom:css-swipe-card",
            "view_layout": { "position": "main" },
            "cards": cards(1),
            "card_id": "snake",
            "pagination": null,
            "timer": null
        }))
        .unwrap();
        assert_eq!(config.card_id, "snake");
        assert!(!config.pagination);
        assert!(config.autoplay().is_none());
    }
}
