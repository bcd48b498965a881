//! One-line text rendering of a widget for `hudkit preview`.

use std::fmt::Write as _;

use hud_config::{Color, Frame, HudConfig, WidgetSpec};

/// Describe widget `index` as it would draw this frame.
pub fn describe(index: usize, widget: &WidgetSpec, config: &HudConfig, frame: &mut Frame<'_>) -> String {
    let visible = frame.condition(widget.condition());
    let pos = widget.position();
    let mut line = format!(
        "[{index}] {:<5} @ ({}, {}) {}",
        widget.kind().as_str(),
        pos.x,
        pos.y,
        if visible { "shown " } else { "hidden" }
    );

    match widget {
        WidgetSpec::Text(w) => {
            let color = w.color.as_deref().unwrap_or(&config.color);
            let _ignored = write!(
                line,
                " {:?} {}",
                frame.expand(&w.text),
                resolved(color, w.opacity)
            );
        }
        WidgetSpec::Graph(w) => {
            let _ignored = write!(line, " {}", source(frame, &w.source));
        }
        WidgetSpec::Bar(w) => {
            let _ignored = write!(line, " {} {}x{}", source(frame, &w.source), w.width, w.height);
        }
        WidgetSpec::Gauge(w) => {
            let _ignored = write!(line, " {} r={}", source(frame, &w.source), w.radius);
        }
        WidgetSpec::Hr(w) => {
            let color = w.color.as_deref().unwrap_or(&config.color);
            let _ignored = write!(line, " {}x{} {}", w.width, w.height, resolved(color, None));
        }
        WidgetSpec::Image(w) => {
            let _ignored = write!(line, " {}", w.path);
        }
    }
    if let Some(cond) = widget.condition() {
        let _ignored = write!(line, "  if {cond}");
    }
    line
}

/// `name=value` for a data widget's source.
fn source(frame: &Frame<'_>, name: &str) -> String {
    match frame.source_value(name) {
        Some(v) => format!("{name}={v}"),
        None => format!("{name}=?"),
    }
}

/// A color spec resolved to hex, or flagged when it does not parse.
fn resolved(spec: &str, opacity: Option<f64>) -> String {
    match Color::parse(spec) {
        Some(c) => c.with_opacity(opacity.unwrap_or(1.0)).to_string(),
        None => format!("{spec}(unresolved)"),
    }
}
