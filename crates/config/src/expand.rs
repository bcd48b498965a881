//! Placeholder expansion and per-frame evaluation.
//!
//! [`Expander`] owns the long-lived pieces (capability flags, the file policy, the shell runner
//! and the condition cache). [`Frame`] is one tick's view: the variable dictionary and the
//! condition scope are built once and shared by every widget drawn that tick.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rhai::Scope;
use tracing::trace;

use hud_metrics::MetricsSnapshot;

use crate::{
    HudConfig,
    condition::{ConditionEvaluator, namespace_scope},
    exec::ShellRunner,
    include::{ERROR, FileAccessPolicy},
    vars::{VariableDictionary, build_variable_dictionary},
};

/// `${...}`; the body is everything up to the first `}`.
static PLACEHOLDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").ok());
/// Body of an exec placeholder.
static EXEC_FORM: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"^exec\s+command="([^"]+)"$"#).ok());
/// Body of a file placeholder.
static FILE_FORM: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"^file\s+path="([^"]+)"$"#).ok());

/// First capture group of `re` in `body`.
fn payload<'t>(re: &Lazy<Option<Regex>>, body: &'t str) -> Option<&'t str> {
    let caps = re.as_ref()?.captures(body)?;
    caps.get(1).map(|m| m.as_str())
}

/// Opt-in placeholder forms. Both are off unless the config enables them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Expand `${file path="..."}`.
    pub file_reading: bool,
    /// Expand `${exec command="..."}`. Commands run with the current user's privileges.
    pub shell_commands: bool,
}

/// Expands placeholders and evaluates conditions for one loaded config.
pub struct Expander {
    /// Enabled opt-in forms.
    capabilities: Capabilities,
    /// Where file placeholders may read.
    files: FileAccessPolicy,
    /// Runs exec placeholders.
    shell: ShellRunner,
    /// Condition AST cache.
    conditions: ConditionEvaluator,
}

impl Expander {
    /// An expander with the default file policy and shell limits.
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            files: FileAccessPolicy::from_env(),
            shell: ShellRunner::default(),
            conditions: ConditionEvaluator::new(),
        }
    }

    /// An expander for the capabilities `config` enables.
    pub fn for_config(config: &HudConfig) -> Self {
        Self::new(config.capabilities())
    }

    /// Replace the file access policy.
    pub fn with_file_policy(mut self, files: FileAccessPolicy) -> Self {
        self.files = files;
        self
    }

    /// Replace the shell runner.
    pub fn with_shell(mut self, shell: ShellRunner) -> Self {
        self.shell = shell;
        self
    }

    /// Enabled opt-in forms.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Start a frame for `metrics`.
    pub fn frame(&self, metrics: &MetricsSnapshot) -> Frame<'_> {
        self.frame_with(build_variable_dictionary(metrics))
    }

    /// Start a frame over an already built dictionary.
    pub fn frame_with(&self, vars: VariableDictionary) -> Frame<'_> {
        Frame {
            expander: self,
            vars,
            scope: None,
        }
    }

    /// Expand `text` against `metrics`. Builds a dictionary per call; prefer [`Self::frame`] when
    /// rendering several widgets.
    pub fn expand_variables(&self, text: &str, metrics: &MetricsSnapshot) -> String {
        if !text.contains("${") {
            return text.to_string();
        }
        self.frame(metrics).expand(text)
    }

    /// Evaluate `condition` against `metrics`. `None` and blank conditions are visible.
    pub fn evaluate_condition(&self, condition: Option<&str>, metrics: &MetricsSnapshot) -> bool {
        if condition.is_none_or(|c| c.trim().is_empty()) {
            return true;
        }
        self.frame(metrics).condition(condition)
    }

    /// Single left-to-right pass over `text`. Substituted values are never rescanned.
    fn expand_with(&self, text: &str, vars: &VariableDictionary) -> String {
        if !text.contains("${") {
            return text.to_string();
        }
        let Some(re) = PLACEHOLDER.as_ref() else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &Captures<'_>| self.resolve(caps, vars))
            .into_owned()
    }

    /// Replacement for one placeholder match.
    fn resolve(&self, caps: &Captures<'_>, vars: &VariableDictionary) -> String {
        let whole = &caps[0];
        let body = &caps[1];
        if self.capabilities.shell_commands && body.starts_with("exec ") {
            return match payload(&EXEC_FORM, body) {
                Some(command) => {
                    trace!("exec placeholder: {}", command);
                    self.shell.run(command)
                }
                None => ERROR.to_string(),
            };
        }
        if self.capabilities.file_reading && body.starts_with("file ") {
            return match payload(&FILE_FORM, body) {
                Some(path) => self.files.read_first_line(path),
                None => ERROR.to_string(),
            };
        }
        match vars.get(body) {
            Some(value) => value.clone(),
            None => whole.to_string(),
        }
    }
}

/// One tick's evaluation context.
pub struct Frame<'a> {
    /// Owning expander.
    expander: &'a Expander,
    /// This tick's variable values.
    vars: VariableDictionary,
    /// Condition scope, built on first use.
    scope: Option<Scope<'static>>,
}

impl Frame<'_> {
    /// This tick's variable dictionary.
    pub fn variables(&self) -> &VariableDictionary {
        &self.vars
    }

    /// Expand every placeholder in `text`.
    pub fn expand(&self, text: &str) -> String {
        self.expander.expand_with(text, &self.vars)
    }

    /// Evaluate a widget condition. Fails open.
    pub fn condition(&mut self, condition: Option<&str>) -> bool {
        if condition.is_none_or(|c| c.trim().is_empty()) {
            return true;
        }
        let vars = &self.vars;
        let scope = self.scope.get_or_insert_with(|| namespace_scope(vars));
        self.expander.conditions.evaluate(condition, scope)
    }

    /// Numeric value of a data widget's `source` variable (`cpu.usage`, `battery.percent`, ...).
    ///
    /// Unit suffixes are ignored, so `memory.used` (`"7.2 GB"`) reads as `7.2`. `None` for
    /// unknown names and non-numeric values.
    pub fn source_value(&self, source: &str) -> Option<f64> {
        let raw = self.vars.get(source.trim())?;
        let number = raw.split_whitespace().next()?;
        number.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}
