//! Shared constants for the dashboard editor.

// ── Snapshot store keys ─────────────────────────────────────────

/// Store key holding the serialized widget list.
pub const WIDGET_LIST_KEY: &str = "widgets";

/// Store key holding the serialized canvas-size descriptor.
pub const CANVAS_SIZE_KEY: &str = "canvasSize";

// ── Widget geometry ─────────────────────────────────────────────

/// Fallback left offset in pixels when a snapshot carries no position.
pub const DEFAULT_WIDGET_LEFT: f64 = 20.0;

/// Fallback top offset in pixels when a snapshot carries no position.
pub const DEFAULT_WIDGET_TOP: f64 = 20.0;

/// Fallback widget width in pixels.
pub const DEFAULT_WIDGET_WIDTH: f64 = 200.0;

/// Fallback widget height in pixels.
pub const DEFAULT_WIDGET_HEIGHT: f64 = 150.0;

/// Smallest width a resize gesture may produce.
pub const MIN_WIDGET_WIDTH: f64 = 150.0;

/// Smallest height a resize gesture may produce.
pub const MIN_WIDGET_HEIGHT: f64 = 100.0;

/// Stacking base; the first widget on an empty canvas gets `BASE_Z_INDEX + 1`.
pub const BASE_Z_INDEX: i64 = 10;

// ── Canvas presets ──────────────────────────────────────────────

/// A4 portrait at 72 dpi.
pub const A4_WIDTH: u32 = 595;
pub const A4_HEIGHT: u32 = 842;

/// A3 portrait at 72 dpi.
pub const A3_WIDTH: u32 = 842;
pub const A3_HEIGHT: u32 = 1191;

// ── Chart defaults ──────────────────────────────────────────────

/// Title font size used when a config does not carry one.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Title shown for charts whose config has an empty title.
pub const DEFAULT_CHART_TITLE: &str = "Untitled Chart";

/// Legend label for axis series without a name.
pub const DEFAULT_SERIES_NAME: &str = "Value";

/// Fill colors assigned by index (cycling) when a row has no color.
pub const FILL_PALETTE: [&str; 5] = [
    "rgba(54, 162, 235, 0.7)",
    "rgba(255, 99, 132, 0.7)",
    "rgba(75, 192, 192, 0.7)",
    "rgba(255, 159, 64, 0.7)",
    "rgba(153, 102, 255, 0.7)",
];

/// Stroke colors paired with [`FILL_PALETTE`] entries.
pub const STROKE_PALETTE: [&str; 5] = [
    "rgba(54, 162, 235, 1)",
    "rgba(255, 99, 132, 1)",
    "rgba(75, 192, 192, 1)",
    "rgba(255, 159, 64, 1)",
    "rgba(153, 102, 255, 1)",
];

/// Percentage by which a fill color is darkened to derive its border.
pub const BORDER_DARKEN_PERCENT: u32 = 20;

/// Result of darkening a color string that is neither hex nor `rgb(...)`.
pub const UNKNOWN_COLOR_FALLBACK: &str = "#666666";
