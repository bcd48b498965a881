//! Configuration scripting for the hudkit overlay: the widget model, the script engine that
//! builds it, validation, and per-frame placeholder expansion and condition evaluation.
#![allow(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

use std::path::{Path, PathBuf};

mod color;
mod compat;
mod condition;
pub mod defaults;
mod error;
mod exec;
mod expand;
mod include;
mod loader;
mod options;
pub mod paths;
mod reload;
mod script;
mod types;
mod validate;
mod vars;

#[cfg(test)]
mod test_expand;
#[cfg(test)]
mod test_loader;
#[cfg(test)]
mod test_script;

pub use color::Color;
pub use condition::{ConditionEvaluator, DEFAULT_CONDITION_CACHE, namespace_scope, truthy};
pub use error::Error;
pub use exec::{DEFAULT_TIMEOUT, MAX_OUTPUT_BYTES, ShellRunner, TIMEOUT};
pub use expand::{Capabilities, Expander, Frame};
pub use include::{ACCESS_DENIED, ERROR, FileAccessPolicy, MAX_FILE_BYTES};
pub use loader::{ConfigLoader, LoadedConfig, ReloadOutcome, load_validated};
pub use reload::{DEFAULT_DEBOUNCE, spawn_reload_task};
pub use script::{load_from_path, load_from_str};
pub use types::{
    Anchor, BarWidget, GaugeWidget, GraphWidget, HrWidget, HudConfig, ImageWidget, Point, Shadow,
    Size, TextWidget, WidgetKind, WidgetSpec,
};
pub use validate::{
    HostProbe, SYMBOL_PREFIX, Severity, SystemProbe, VALID_ALIGNMENTS, VALID_WEIGHTS,
    ValidationError, has_errors, validate, validate_color,
};
pub use vars::{VariableDictionary, build_variable_dictionary, format_bytes, format_uptime};

/// Directory holding the user config (`~/.config/hudkit`).
fn config_dir() -> PathBuf {
    let mut p = paths::home_dir().unwrap_or_default();
    p.push(".config");
    p.push("hudkit");
    p
}

/// Determine the preferred user config path (`~/.config/hudkit/config.rhai`).
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.rhai")
}

/// Resolve the effective config path using the default policy.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `~/.config/hudkit/config.rhai` when it exists.
/// 3) Else use `~/.config/hudkit/config.js` when it exists.
/// 4) Else return a clear "no config found" error naming the preferred path.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let preferred = default_config_path();
    if preferred.exists() {
        return Ok(preferred);
    }
    let legacy = config_dir().join("config.js");
    if legacy.exists() {
        return Ok(legacy);
    }

    Err(Error::Read {
        message: format!("No config found. Create {}", preferred.display()),
        path: Some(preferred),
    })
}
