//! Literal defaults applied when a configuration script omits a field.

/// Global origin when `config()` omits `position` (or one of its coordinates).
pub const POSITION_X: f64 = 50.0;
/// See [`POSITION_X`].
pub const POSITION_Y: f64 = 100.0;
/// Global font family.
pub const FONT: &str = "SF Mono";
/// Global font size in points.
pub const FONT_SIZE: f64 = 12.0;
/// Global text color.
pub const COLOR: &str = "#FFFFFF";
/// Seconds between metric refreshes.
pub const UPDATE_INTERVAL: f64 = 1.0;

/// Graph width.
pub const GRAPH_WIDTH: f64 = 200.0;
/// Graph height.
pub const GRAPH_HEIGHT: f64 = 50.0;

/// Bar width.
pub const BAR_WIDTH: f64 = 100.0;
/// Bar height.
pub const BAR_HEIGHT: f64 = 10.0;

/// Horizontal rule length.
pub const HR_WIDTH: f64 = 200.0;
/// Line thickness of a horizontal rule.
pub const HR_HEIGHT: f64 = 1.0;

/// Gauge outer radius.
pub const GAUGE_RADIUS: f64 = 40.0;
/// Gauge arc thickness.
pub const GAUGE_THICKNESS: f64 = 8.0;
/// Degrees, measured counter-clockwise from the positive x axis.
pub const GAUGE_START_ANGLE: f64 = 135.0;
/// See [`GAUGE_START_ANGLE`].
pub const GAUGE_END_ANGLE: f64 = 405.0;

/// Text shadow color.
pub const SHADOW_COLOR: &str = "#000000";
/// Horizontal shadow offset.
pub const SHADOW_OFFSET_X: f64 = 1.0;
/// Vertical shadow offset.
pub const SHADOW_OFFSET_Y: f64 = 1.0;
/// Shadow blur radius.
pub const SHADOW_BLUR: f64 = 2.0;
