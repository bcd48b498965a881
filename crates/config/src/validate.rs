//! Validation of a loaded [`HudConfig`].
//!
//! Findings are values, not errors: [`Severity::Error`] means the config should not replace a
//! working one, [`Severity::Warning`] means it will work but probably not as intended. The two
//! host lookups (font availability and image existence) go through [`HostProbe`] so validation
//! can run against a fake host.

use std::{
    collections::BTreeSet,
    fmt, fs,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::{
    BarWidget, GaugeWidget, GraphWidget, HrWidget, HudConfig, ImageWidget, TextWidget, WidgetSpec,
    paths::{expand_tilde, home_dir},
};

/// Prefix marking an image path as a symbolic icon name rather than a file.
pub const SYMBOL_PREFIX: &str = "sf:";

/// Font weights accepted by the text renderer.
pub const VALID_WEIGHTS: &[&str] = &[
    "regular",
    "medium",
    "semibold",
    "bold",
    "heavy",
    "black",
    "light",
    "thin",
    "ultralight",
];

/// Text alignments accepted by the text renderer.
pub const VALID_ALIGNMENTS: &[&str] = &["left", "center", "right"];

/// System families that are always available but do not show up in font directories.
const SYSTEM_FONTS: &[&str] = &[
    "SF Mono",
    "SF Pro",
    "SF Pro Text",
    "SF Pro Display",
    "SF Pro Rounded",
    "SF Compact",
    "SF Compact Text",
    "SF Compact Display",
    "SF Compact Rounded",
    "New York",
    "New York Small",
    "New York Medium",
    "New York Large",
];

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The config is unusable as-is.
    Error,
    /// Usable but surprising.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Field path, e.g. `updateInterval` or `widgets[2].source`.
    pub path: String,
    /// Human-readable description.
    pub message: String,
    /// Whether the finding blocks the config.
    pub severity: Severity,
}

impl ValidationError {
    /// An error-severity finding.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// A warning-severity finding.
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// Whether this finding blocks adoption.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Whether any finding has error severity.
pub fn has_errors(findings: &[ValidationError]) -> bool {
    findings.iter().any(ValidationError::is_error)
}

/// Host lookups the validator needs.
pub trait HostProbe {
    /// Whether a font family can be resolved.
    fn font_available(&self, family: &str) -> bool;
    /// Whether a file exists at `path` (already tilde-expanded).
    fn file_exists(&self, path: &Path) -> bool;
}

/// The real filesystem and installed fonts.
///
/// Font directories are scanned once, on the first font lookup.
#[derive(Debug, Default)]
pub struct SystemProbe {
    /// Normalized font file stems.
    fonts: OnceCell<BTreeSet<String>>,
}

impl SystemProbe {
    /// A probe that has not scanned yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized stems of every font file under the platform font directories.
    fn installed(&self) -> &BTreeSet<String> {
        self.fonts.get_or_init(|| {
            let mut stems = BTreeSet::new();
            for dir in font_dirs() {
                collect_font_stems(&dir, 4, &mut stems);
            }
            stems
        })
    }
}

impl HostProbe for SystemProbe {
    fn font_available(&self, family: &str) -> bool {
        let wanted = normalize_font_name(family);
        !wanted.is_empty() && self.installed().iter().any(|stem| stem.starts_with(&wanted))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Platform font directories.
fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(home) = home_dir() {
        dirs.push(home.join("Library/Fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join(".fonts"));
    }
    dirs
}

/// Add normalized stems of font files under `dir`, descending at most `depth` levels.
fn collect_font_stems(dir: &Path, depth: usize, out: &mut BTreeSet<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 {
                collect_font_stems(&path, depth - 1, out);
            }
            continue;
        }
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc" | "dfont"));
        if is_font && let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            out.insert(normalize_font_name(stem));
        }
    }
}

/// Lowercase with spaces, dashes and underscores removed.
fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `family` should be reported as available.
fn font_ok(family: &str, probe: &dyn HostProbe) -> bool {
    family.is_empty()
        || family == "undefined"
        || SYSTEM_FONTS.contains(&family)
        || probe.font_available(family)
}

/// Check a color spec. Only `#` hex forms are checked; names are resolved at render time.
pub fn validate_color(color: &str, path: &str) -> Option<ValidationError> {
    let hex = color.strip_prefix('#')?;
    if !matches!(hex.chars().count(), 3 | 4 | 6 | 8) {
        return Some(ValidationError::error(
            path,
            "Invalid hex color format. Use #RGB, #RGBA, #RRGGBB, or #RRGGBBAA",
        ));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(ValidationError::error(
            path,
            "Hex color contains invalid characters",
        ));
    }
    None
}

/// Validate global settings, then each widget in order.
pub fn validate(config: &HudConfig, probe: &dyn HostProbe) -> Vec<ValidationError> {
    let mut v = Findings {
        out: Vec::new(),
        probe,
    };
    v.global(config);
    for (i, widget) in config.widgets.iter().enumerate() {
        let prefix = format!("widgets[{i}]");
        match widget {
            WidgetSpec::Text(w) => v.text(&prefix, w),
            WidgetSpec::Graph(w) => v.graph(&prefix, w),
            WidgetSpec::Bar(w) => v.bar(&prefix, w),
            WidgetSpec::Hr(w) => v.hr(&prefix, w),
            WidgetSpec::Gauge(w) => v.gauge(&prefix, w),
            WidgetSpec::Image(w) => v.image(&prefix, w),
        }
    }
    v.out
}

/// Accumulator for one validation pass.
struct Findings<'a> {
    /// Findings in report order.
    out: Vec<ValidationError>,
    /// Host lookups.
    probe: &'a dyn HostProbe,
}

impl Findings<'_> {
    /// Record an error.
    fn error(&mut self, path: String, message: impl Into<String>) {
        self.out.push(ValidationError::error(path, message));
    }

    /// Record a warning.
    fn warning(&mut self, path: String, message: impl Into<String>) {
        self.out.push(ValidationError::warning(path, message));
    }

    /// Check an optional color field.
    fn color(&mut self, color: Option<&str>, path: String) {
        if let Some(finding) = color.and_then(|c| validate_color(c, &path)) {
            self.out.push(finding);
        }
    }

    /// Error unless `value > 0`.
    fn positive(&mut self, value: f64, path: String, message: &str) {
        if value.is_nan() || value <= 0.0 {
            self.error(path, message);
        }
    }

    /// Error if the source variable name is empty.
    fn source(&mut self, source: &str, prefix: &str) {
        if source.trim().is_empty() {
            self.error(format!("{prefix}.source"), "Source variable is required");
        }
    }

    /// Global settings.
    fn global(&mut self, c: &HudConfig) {
        let interval = c.update_interval;
        if interval.is_nan() || interval <= 0.0 {
            self.error("updateInterval".into(), "Must be greater than 0");
        } else if interval < 0.1 {
            self.warning(
                "updateInterval".into(),
                "Very fast update interval (<0.1s) may cause high CPU usage",
            );
        } else if interval > 60.0 {
            self.warning(
                "updateInterval".into(),
                "Update interval >60s may make metrics appear stale",
            );
        }
        self.positive(c.font_size, "fontSize".into(), "Must be greater than 0");
        self.color(Some(c.color.as_str()), "color".into());
        if !font_ok(&c.font, self.probe) {
            self.warning(
                "font".into(),
                format!("Font '{}' not found on system, will use fallback", c.font),
            );
        }
    }

    /// Text widget.
    fn text(&mut self, prefix: &str, w: &TextWidget) {
        if w.text.is_empty() {
            self.warning(format!("{prefix}.text"), "Text content is empty");
        }
        self.color(w.color.as_deref(), format!("{prefix}.color"));
        if let Some(size) = w.font_size {
            self.positive(size, format!("{prefix}.fontSize"), "Must be greater than 0");
        }
        if let Some(font) = &w.font
            && !font_ok(font, self.probe)
        {
            self.warning(
                format!("{prefix}.font"),
                format!("Font '{font}' not found on system"),
            );
        }
        if let Some(weight) = &w.weight {
            let weight = weight.to_lowercase();
            if !VALID_WEIGHTS.contains(&weight.as_str()) {
                self.warning(
                    format!("{prefix}.weight"),
                    format!("Invalid weight '{weight}'. Valid: {}", VALID_WEIGHTS.join(", ")),
                );
            }
        }
        if let Some(align) = &w.align {
            let align = align.to_lowercase();
            if !VALID_ALIGNMENTS.contains(&align.as_str()) {
                self.warning(
                    format!("{prefix}.align"),
                    format!("Invalid alignment '{align}'. Valid: left, center, right"),
                );
            }
        }
        if let Some(opacity) = w.opacity
            && !(0.0..=1.0).contains(&opacity)
        {
            self.error(format!("{prefix}.opacity"), "Opacity must be between 0 and 1");
        }
        if let Some(shadow) = &w.shadow {
            self.color(Some(shadow.color.as_str()), format!("{prefix}.shadow.color"));
        }
    }

    /// Graph widget.
    fn graph(&mut self, prefix: &str, w: &GraphWidget) {
        self.source(&w.source, prefix);
        if !(w.size.width > 0.0 && w.size.height > 0.0) {
            self.error(
                format!("{prefix}.size"),
                "Width and height must be greater than 0",
            );
        }
        self.color(w.color.as_deref(), format!("{prefix}.color"));
    }

    /// Bar widget.
    fn bar(&mut self, prefix: &str, w: &BarWidget) {
        self.source(&w.source, prefix);
        self.positive(w.width, format!("{prefix}.width"), "Width must be greater than 0");
        self.positive(w.height, format!("{prefix}.height"), "Height must be greater than 0");
        self.color(w.color.as_deref(), format!("{prefix}.color"));
        self.color(
            w.background_color.as_deref(),
            format!("{prefix}.backgroundColor"),
        );
    }

    /// Horizontal rule.
    fn hr(&mut self, prefix: &str, w: &HrWidget) {
        self.positive(w.width, format!("{prefix}.width"), "Width must be greater than 0");
        self.positive(w.height, format!("{prefix}.height"), "Height must be greater than 0");
        self.color(w.color.as_deref(), format!("{prefix}.color"));
    }

    /// Gauge widget.
    fn gauge(&mut self, prefix: &str, w: &GaugeWidget) {
        self.source(&w.source, prefix);
        self.positive(w.radius, format!("{prefix}.radius"), "Radius must be greater than 0");
        self.positive(
            w.thickness,
            format!("{prefix}.thickness"),
            "Thickness must be greater than 0",
        );
        if w.thickness > w.radius {
            self.warning(
                format!("{prefix}.thickness"),
                "Thickness should not exceed radius",
            );
        }
        self.color(w.color.as_deref(), format!("{prefix}.color"));
        self.color(
            w.background_color.as_deref(),
            format!("{prefix}.backgroundColor"),
        );
    }

    /// Image widget.
    fn image(&mut self, prefix: &str, w: &ImageWidget) {
        if w.path.is_empty() {
            self.error(format!("{prefix}.path"), "Image path is required");
        } else if !w.path.starts_with(SYMBOL_PREFIX)
            && !self.probe.file_exists(&expand_tilde(&w.path))
        {
            self.warning(
                format!("{prefix}.path"),
                format!("Image file not found: {}", w.path),
            );
        }
        if let Some(size) = w.size
            && !(size.width > 0.0 && size.height > 0.0)
        {
            self.error(
                format!("{prefix}.size"),
                "Width and height must be greater than 0",
            );
        }
    }
}
