//! Snapshot wire model: widget snapshots, chart configs, and canvas sizes.
//!
//! These types are the portable, storage-ready form of a dashboard. The same
//! JSON shape is written to the session snapshot store and sent to the remote
//! dashboard API, so field names follow the camelCase wire format.
//!
//! Decoding is lenient where the data is user- or generator-produced: numbers
//! may arrive as strings or be missing entirely, colors may be a single string
//! or an array. Encoding is always canonical.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};

use crate::consts::{A3_HEIGHT, A3_WIDTH, A4_HEIGHT, A4_WIDTH, DEFAULT_FONT_SIZE};

// =============================================================================
// CHART TYPE
// =============================================================================

/// Closed set of chart kinds a widget can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }

    /// Pie charts carry one flat slice list; the others share a label axis.
    #[must_use]
    pub fn is_pie(self) -> bool {
        matches!(self, Self::Pie)
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CHART CONFIG
// =============================================================================

/// A color field that may be encoded as one string or as a per-row array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    One(String),
    Many(Vec<Option<String>>),
}

impl ColorSpec {
    /// Color for row `index`. A single color applies to every row.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&str> {
        let color = match self {
            Self::One(color) => Some(color.as_str()),
            Self::Many(colors) => colors.get(index).and_then(|c| c.as_deref()),
        };
        color.filter(|c| !c.trim().is_empty())
    }
}

/// One `seriesData` entry.
///
/// Axis charts use `name` + `data` + color arrays; pie charts use one entry
/// per slice with `name` + `value` + single colors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::numbers", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<f64>,
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorSpec>,
}

/// Chart configuration as persisted inside a widget snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x_axis_label: String,
    #[serde(default)]
    pub y_axis_label: String,
    #[serde(default = "default_font_size", deserialize_with = "lenient::font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub x_axis_data: Vec<String>,
    #[serde(default)]
    pub series_data: Vec<SeriesEntry>,
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_axis_label: String::new(),
            y_axis_label: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            x_axis_data: Vec::new(),
            series_data: Vec::new(),
        }
    }
}

// =============================================================================
// WIDGET SNAPSHOT
// =============================================================================

/// Serialized, storage-ready form of one chart widget.
///
/// Only `type` and `config` are required on input; a missing `id` or missing
/// geometry is filled in at materialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub config: ChartConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

impl WidgetSnapshot {
    /// Minimal snapshot: type and config only.
    #[must_use]
    pub fn partial(chart_type: ChartType, config: ChartConfig) -> Self {
        Self { id: None, chart_type, config, left: None, top: None, width: None, height: None }
    }
}

// =============================================================================
// CANVAS SIZE
// =============================================================================

/// Rendered canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Canvas-size descriptor. Presets never carry explicit dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasSize {
    #[default]
    A4,
    A3,
    Custom {
        #[serde(deserialize_with = "lenient::dimension")]
        width: u32,
        #[serde(deserialize_with = "lenient::dimension")]
        height: u32,
    },
}

impl CanvasSize {
    /// Pixel dimensions implied by this descriptor.
    #[must_use]
    pub fn pixel_size(self) -> PixelSize {
        match self {
            Self::A4 => PixelSize { width: A4_WIDTH, height: A4_HEIGHT },
            Self::A3 => PixelSize { width: A3_WIDTH, height: A3_HEIGHT },
            Self::Custom { width, height } => PixelSize { width, height },
        }
    }
}

// =============================================================================
// SNAPSHOT SET
// =============================================================================

/// Complete serialized form of one dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSet {
    #[serde(default)]
    pub widgets: Vec<WidgetSnapshot>,
    #[serde(default)]
    pub canvas_size: CanvasSize,
}

// =============================================================================
// PIXEL STRINGS
// =============================================================================

/// Encode a pixel length the way the canvas stores it, e.g. `40.0 -> "40px"`.
#[must_use]
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}

/// Decode a pixel length. Accepts `"40px"`, `"40"`, `" 12.5px "`; reads the
/// leading numeric portion and ignores any unit suffix.
#[must_use]
pub fn parse_px(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let numeric: String = trimmed
        .chars()
        .enumerate()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(_, c)| c)
        .collect();
    match numeric.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Decode the leading run of ASCII digits, e.g. `"600px" -> 600`.
#[must_use]
pub fn parse_leading_int(raw: &str) -> Option<u32> {
    let digits: String = raw.trim().chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

// =============================================================================
// LENIENT DECODERS
// =============================================================================

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::consts::DEFAULT_FONT_SIZE;

    /// Missing, null, or non-numeric values coerce to zero.
    pub(super) fn coerce_f64(value: &Value) -> f64 {
        let parsed = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if parsed.is_finite() { parsed } else { 0.0 }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(super) fn coerce_u32(value: &Value) -> Option<u32> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round().min(f64::from(u32::MAX)) as u32),
            Value::String(s) => super::parse_leading_int(s),
            _ => None,
        }
    }

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Some(coerce_f64(&value)))
    }

    pub(super) fn numbers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(values.unwrap_or_default().iter().map(coerce_f64).collect())
    }

    pub(super) fn font_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(coerce_u32(&value).filter(|v| *v > 0).unwrap_or(DEFAULT_FONT_SIZE))
    }

    pub(super) fn dimension<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        coerce_u32(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid canvas dimension: {value}")))
    }
}
