//! CSS length values accepted by sizing and gap options.

use std::fmt;
use std::str::FromStr;

/// A CSS length as written in the configuration.
///
/// Pixel and percentage values are parsed so the sizing engine can reason
/// about them; anything else (`auto`, `calc(...)`, `2em`) is kept verbatim and
/// passed through to the style layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// Absolute pixels; a bare number means pixels.
    Px(f32),
    /// Percentage of the container.
    Percent(f32),
    /// Any other CSS length, kept verbatim.
    Css(String),
}

/// Returned when a value cannot be embedded into a style declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDimension;

impl Dimension {
    /// `0px`.
    pub const ZERO: Dimension = Dimension::Px(0.0);

    /// Parse a CSS length, rejecting anything that could escape a declaration.
    pub fn parse(raw: &str) -> Result<Self, InvalidDimension> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.contains([';', '{', '}', '<', '>'])
        {
            return Err(InvalidDimension);
        }

        if let Some(number) = trimmed.strip_suffix("px") {
            return parse_non_negative(number).map(Dimension::Px);
        }
        if let Some(number) = trimmed.strip_suffix('%') {
            return parse_non_negative(number).map(Dimension::Percent);
        }
        // Bare numbers are pixels, as in inline style assignment.
        if let Ok(number) = trimmed.parse::<f32>() {
            return if number.is_finite() && number >= 0.0 {
                Ok(Dimension::Px(number))
            } else {
                Err(InvalidDimension)
            };
        }
        Ok(Dimension::Css(trimmed.to_string()))
    }

    /// Pixel dimension.
    pub fn from_px(px: f32) -> Self {
        Dimension::Px(px.max(0.0))
    }

    /// Pixel value when the dimension is absolute.
    pub fn as_px(&self) -> Option<f32> {
        match self {
            Dimension::Px(px) => Some(*px),
            _ => None,
        }
    }
}

fn parse_non_negative(number: &str) -> Result<f32, InvalidDimension> {
    match number.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(InvalidDimension),
    }
}

impl FromStr for Dimension {
    type Err = InvalidDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::parse(s)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Px(px) => write!(f, "{px}px"),
            Dimension::Percent(pct) => write!(f, "{pct}%"),
            Dimension::Css(raw) => f.write_str(raw),
        }
    }
}
