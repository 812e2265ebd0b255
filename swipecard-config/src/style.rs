//! Small pieces of presentation derived from configuration.

use std::collections::BTreeMap;

use swipecard_model::Orientation;

use crate::models::CarouselConfig;

/// Inline style block scoped to one widget instance. Properties and values
/// are emitted verbatim, one rule per entry.
pub fn custom_style_block(card_id: &str, custom_css: &BTreeMap<String, String>) -> String {
    custom_css
        .iter()
        .map(|(property, value)| format!("#{card_id} {{ {property}: {value}; }}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Content of the prev/next buttons: a configured icon, or an
/// orientation-dependent glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationGlyphs {
    /// Configured icon for prev, if any.
    pub prev_icon: Option<String>,
    /// Configured icon for next, if any.
    pub next_icon: Option<String>,
    /// Fallback glyph for prev.
    pub prev_glyph: &'static str,
    /// Fallback glyph for next.
    pub next_glyph: &'static str,
}

impl NavigationGlyphs {
    /// Glyphs for the configured orientation and icons.
    pub fn for_config(config: &CarouselConfig) -> Self {
        let (prev_glyph, next_glyph) = match config.orientation {
            Orientation::Horizontal => ("<", ">"),
            Orientation::Vertical => ("\u{2191}", "\u{2193}"),
        };
        Self {
            prev_icon: config.navigation_prev.clone(),
            next_icon: config.navigation_next.clone(),
            prev_glyph,
            next_glyph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn style_block_is_scoped_to_card() {
        let mut css = BTreeMap::new();
        css.insert("--slides-gap".to_string(), "4px".to_string());
        css.insert("background".to_string(), "none".to_string());

        assert_eq!(
            custom_style_block("deck", &css),
            "#deck { --slides-gap: 4px; }\n#deck { background: none; }"
        );
        assert_eq!(custom_style_block("deck", &BTreeMap::new()), "");
    }

    #[test]
    fn glyphs_follow_orientation() {
        let config = CarouselConfig::from_value(json!({
            "cards": [{ "type": "markdown" }],
            "template": "slider-vertical",
            "navigation_next": "mdi:arrow-down"
        }))
        .unwrap();
        let glyphs = NavigationGlyphs::for_config(&config);
        assert_eq!(glyphs.prev_glyph, "\u{2191}");
        assert_eq!(glyphs.prev_icon, None);
        assert_eq!(glyphs.next_icon.as_deref(), Some("mdi:arrow-down"));
    }
}
