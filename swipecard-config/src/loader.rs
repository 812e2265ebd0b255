//! Reading configurations from text and files.
//!
//! Dashboards deliver configuration as already-parsed objects, but the same
//! schema is accepted from JSON or TOML text so fixtures and the standalone
//! runtime can share it.

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use serde_json::Value;

use crate::error::ConfigError;
use crate::models::CarouselConfig;

impl CarouselConfig {
    /// Parse and validate JSON text.
    pub fn parse_json(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Parse and validate TOML text.
    pub fn parse_toml(raw: &str) -> Result<Self, ConfigError> {
        let value: Value = toml::from_str(raw)
            .map_err(|err| ConfigError::Toml(err.to_string()))?;
        Self::from_value(value)
    }

    /// Parse text of unknown format: TOML first, then JSON. Schema errors
    /// are reported as-is; only syntax errors fall through to the next
    /// format.
    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        match toml::from_str::<Value>(contents) {
            Ok(value) => Self::from_value(value)
                .with_context(|| format!("invalid carousel config {origin}")),
            Err(toml_err) => {
                let value: Value =
                    serde_json::from_str(contents).map_err(|json_err| {
                        anyhow!(
                            "failed to parse carousel config {}: toml error: {}; json error: {}",
                            origin,
                            toml_err,
                            json_err
                        )
                    })?;
                Self::from_value(value)
                    .with_context(|| format!("invalid carousel config {origin}"))
            }
        }
    }

    /// Load a file, choosing the format by extension. Unknown extensions go
    /// through [`parse_from_str`](Self::parse_from_str).
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read carousel config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid carousel config {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                Self::parse_toml(&contents).with_context(|| {
                    format!("invalid carousel config {}", path.display())
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }
}
