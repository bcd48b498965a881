//! Widget model: the typed result of running a configuration script.

use hud_metrics::DateTimeFormats;
use serde::{Deserialize, Serialize};

use crate::{defaults, expand::Capabilities};

/// A point in display coordinates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Construct a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Screen corner that the global `position` is measured from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    /// Measured from the top-left corner.
    #[default]
    TopLeft,
    /// Measured from the top-right corner.
    TopRight,
    /// Measured from the bottom-left corner.
    BottomLeft,
    /// Measured from the bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Parse an anchor name case-insensitively (`topLeft`, `TOPRIGHT`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "topleft" => Some(Self::TopLeft),
            "topright" => Some(Self::TopRight),
            "bottomleft" => Some(Self::BottomLeft),
            "bottomright" => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// Script-facing name of this anchor.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "topLeft",
            Self::TopRight => "topRight",
            Self::BottomLeft => "bottomLeft",
            Self::BottomRight => "bottomRight",
        }
    }

    /// Base point for widget layout on a display of size `bounds`.
    ///
    /// Coordinates are y-up with the origin at the bottom-left corner of the display; `offset`
    /// is measured inward from the anchored corner.
    pub fn origin(self, offset: Point, bounds: Size) -> Point {
        match self {
            Self::TopLeft => Point::new(offset.x, bounds.height - offset.y),
            Self::TopRight => Point::new(bounds.width - offset.x, bounds.height - offset.y),
            Self::BottomLeft => Point::new(offset.x, offset.y),
            Self::BottomRight => Point::new(bounds.width - offset.x, offset.y),
        }
    }
}

/// Root configuration produced by a script.
///
/// `widgets` is in render order: later widgets are drawn on top of earlier ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HudConfig {
    /// Offset of the widget origin from the anchored corner.
    pub position: Point,
    /// Default font family.
    pub font: String,
    /// Default font size in points.
    pub font_size: f64,
    /// Default color spec (hex, `rgb()`/`rgba()` or a color name).
    pub color: String,
    /// Seconds between metric refreshes.
    pub update_interval: f64,
    /// Allow the metrics layer to look up the public IP address.
    pub enable_public_ip: bool,
    /// Allow `${file path="..."}` placeholders.
    pub enable_file_reading: bool,
    /// Allow `${exec command="..."}` placeholders. Commands run with the privileges of the
    /// current user.
    pub enable_shell_commands: bool,
    /// Index of the display to draw on; `0` is the main display.
    pub display_index: usize,
    /// Corner that `position` is measured from.
    pub anchor: Anchor,
    /// strftime pattern for `${date}`.
    pub date_format: Option<String>,
    /// strftime pattern for `${time}`.
    pub time_format: Option<String>,
    /// strftime pattern for `${datetime}`.
    pub datetime_format: Option<String>,
    /// Restrict network throughput metrics to one interface.
    pub network_interface: Option<String>,
    /// Widgets in render order.
    pub widgets: Vec<WidgetSpec>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            position: Point::new(defaults::POSITION_X, defaults::POSITION_Y),
            font: defaults::FONT.to_string(),
            font_size: defaults::FONT_SIZE,
            color: defaults::COLOR.to_string(),
            update_interval: defaults::UPDATE_INTERVAL,
            enable_public_ip: false,
            enable_file_reading: false,
            enable_shell_commands: false,
            display_index: 0,
            anchor: Anchor::TopLeft,
            date_format: None,
            time_format: None,
            datetime_format: None,
            network_interface: None,
            widgets: Vec::new(),
        }
    }
}

impl HudConfig {
    /// Capability flags consumed by the variable expander.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            file_reading: self.enable_file_reading,
            shell_commands: self.enable_shell_commands,
        }
    }

    /// Clock patterns consumed by the date/time collector.
    pub fn datetime_formats(&self) -> DateTimeFormats {
        DateTimeFormats {
            date: self.date_format.clone(),
            time: self.time_format.clone(),
            datetime: self.datetime_format.clone(),
        }
    }
}

/// Drop shadow behind text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// Shadow color.
    pub color: String,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
    /// Blur radius.
    pub blur: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: defaults::SHADOW_COLOR.to_string(),
            offset_x: defaults::SHADOW_OFFSET_X,
            offset_y: defaults::SHADOW_OFFSET_Y,
            blur: defaults::SHADOW_BLUR,
        }
    }
}

/// A line of templated text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextWidget {
    /// Template containing `${...}` placeholders.
    pub text: String,
    /// Offset from the global origin.
    pub position: Point,
    /// Text color; the global color when absent.
    pub color: Option<String>,
    /// Point size; the global size when absent.
    pub font_size: Option<f64>,
    /// Font family; the global font when absent.
    pub font: Option<String>,
    /// Weight name, e.g. `bold`; checked against a fixed list by the validator.
    pub weight: Option<String>,
    /// Render in italics.
    pub italic: bool,
    /// `0.0..=1.0`.
    pub opacity: Option<f64>,
    /// Drop shadow, if any.
    pub shadow: Option<Shadow>,
    /// `left`, `center` or `right`.
    pub align: Option<String>,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Scrolling history graph of one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphWidget {
    /// Variable name sampled each tick, e.g. `cpu.usage`.
    pub source: String,
    /// Offset from the global origin.
    pub position: Point,
    /// Plot area.
    pub size: Size,
    /// Line color.
    pub color: Option<String>,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Horizontal percentage bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarWidget {
    /// Variable name read each tick, e.g. `cpu.usage`.
    pub source: String,
    /// Offset from the global origin.
    pub position: Point,
    /// Bar length.
    pub width: f64,
    /// Bar thickness.
    pub height: f64,
    /// Fill color.
    pub color: Option<String>,
    /// Track color behind the filled portion.
    pub background_color: Option<String>,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Horizontal rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HrWidget {
    /// Offset from the global origin.
    pub position: Point,
    /// Line length.
    pub width: f64,
    /// Line thickness.
    pub height: f64,
    /// Line color.
    pub color: Option<String>,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Circular arc gauge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GaugeWidget {
    /// Variable name read each tick, e.g. `cpu.usage`.
    pub source: String,
    /// Offset from the global origin.
    pub position: Point,
    /// Outer radius.
    pub radius: f64,
    /// Arc thickness.
    pub thickness: f64,
    /// Arc color for the filled portion.
    pub color: Option<String>,
    /// Track color behind the filled portion.
    pub background_color: Option<String>,
    /// Degrees.
    pub start_angle: f64,
    /// Degrees.
    pub end_angle: f64,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Bitmap or symbolic icon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageWidget {
    /// File path (tilde allowed) or a symbolic icon name with the `sf:` prefix.
    pub path: String,
    /// Offset from the global origin.
    pub position: Point,
    /// Draw size; the image's natural size when absent.
    pub size: Option<Size>,
    /// Visibility expression; always shown when absent.
    pub condition: Option<String>,
}

/// Discriminant of [`WidgetSpec`], matching the script's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// `text`
    Text,
    /// `graph`
    Graph,
    /// `bar`
    Bar,
    /// `hr`
    Hr,
    /// `gauge`
    Gauge,
    /// `image`
    Image,
}

impl WidgetKind {
    /// Parse the script `type` field. Matching is exact, as in the script API.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "graph" => Some(Self::Graph),
            "bar" => Some(Self::Bar),
            "hr" => Some(Self::Hr),
            "gauge" => Some(Self::Gauge),
            "image" => Some(Self::Image),
            _ => None,
        }
    }

    /// Script-facing name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Graph => "graph",
            Self::Bar => "bar",
            Self::Hr => "hr",
            Self::Gauge => "gauge",
            Self::Image => "image",
        }
    }
}

/// One renderable element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetSpec {
    /// Templated text.
    Text(TextWidget),
    /// History graph.
    Graph(GraphWidget),
    /// Percentage bar.
    Bar(BarWidget),
    /// Horizontal rule.
    Hr(HrWidget),
    /// Arc gauge.
    Gauge(GaugeWidget),
    /// Image or symbol.
    Image(ImageWidget),
}

impl WidgetSpec {
    /// Variant discriminant.
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Text(_) => WidgetKind::Text,
            Self::Graph(_) => WidgetKind::Graph,
            Self::Bar(_) => WidgetKind::Bar,
            Self::Hr(_) => WidgetKind::Hr,
            Self::Gauge(_) => WidgetKind::Gauge,
            Self::Image(_) => WidgetKind::Image,
        }
    }

    /// Visibility condition, if any.
    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Text(w) => w.condition.as_deref(),
            Self::Graph(w) => w.condition.as_deref(),
            Self::Bar(w) => w.condition.as_deref(),
            Self::Hr(w) => w.condition.as_deref(),
            Self::Gauge(w) => w.condition.as_deref(),
            Self::Image(w) => w.condition.as_deref(),
        }
    }

    /// Offset relative to the global origin.
    pub fn position(&self) -> Point {
        match self {
            Self::Text(w) => w.position,
            Self::Graph(w) => w.position,
            Self::Bar(w) => w.position,
            Self::Hr(w) => w.position,
            Self::Gauge(w) => w.position,
            Self::Image(w) => w.position,
        }
    }

    /// Metric source for data-driven widgets.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Graph(w) => Some(&w.source),
            Self::Bar(w) => Some(&w.source),
            Self::Gauge(w) => Some(&w.source),
            Self::Text(_) | Self::Hr(_) | Self::Image(_) => None,
        }
    }
}
