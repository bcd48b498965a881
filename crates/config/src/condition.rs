//! Widget visibility conditions.
//!
//! A condition is a Rhai expression such as `battery.percent < 20 && battery.status != "Charging"`
//! evaluated against the variable dictionary. Dotted names become nested maps: `cpu.usage` is
//! reachable as `cpu.usage`, `top.cpu1.name` as `top.cpu1.name`. Numeric-looking values are
//! bound as floats, everything else as strings. Values are bound directly into the scope, so
//! metric content is never parsed as script.
//!
//! Evaluation fails open: a condition that does not compile, errors at runtime, or exceeds the
//! operation limit counts as visible.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::Mutex;
use rhai::{AST, Dynamic, Engine, Map, Scope, module_resolvers::DummyModuleResolver};
use tracing::{trace, warn};

use crate::{compat, vars::VariableDictionary};

/// Default number of distinct condition strings kept compiled.
pub const DEFAULT_CONDITION_CACHE: usize = 256;

/// Compiles and evaluates condition expressions, caching compiled ASTs by source text.
///
/// The cache is sized for one config's widget conditions. When a caller feeds more distinct
/// expressions than the capacity, the cache is emptied and refilled.
pub struct ConditionEvaluator {
    /// Expression-only engine with tight limits.
    engine: Engine,
    /// Compiled conditions; `None` records a compile failure so it is reported once.
    cache: Mutex<HashMap<String, Option<Arc<AST>>>>,
    /// Maximum number of cached expressions.
    capacity: usize,
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionEvaluator {
    /// Create an evaluator with an empty cache of the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CONDITION_CACHE)
    }

    /// Create an evaluator that keeps at most `capacity` compiled expressions.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut engine = Engine::new();
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.set_max_operations(10_000);
        engine.set_max_call_levels(8);
        engine.set_max_expr_depths(64, 32);
        engine.set_max_string_size(4096);
        Self {
            engine,
            cache: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Evaluate `condition` in `scope`. `None` and blank conditions are visible.
    ///
    /// Condition expressions cannot declare variables, and the scope is rewound afterwards, so
    /// one frame's scope serves any number of conditions.
    pub fn evaluate(&self, condition: Option<&str>, scope: &mut Scope<'_>) -> bool {
        let Some(expr) = condition.map(str::trim).filter(|c| !c.is_empty()) else {
            return true;
        };
        let Some(ast) = self.compiled(expr) else {
            return true;
        };
        let len = scope.len();
        let result = self.engine.eval_ast_with_scope::<Dynamic>(scope, &ast);
        scope.rewind(len);
        match result {
            Ok(value) => truthy(&value),
            Err(e) => {
                trace!("condition '{}' failed: {}; showing widget", expr, e);
                true
            }
        }
    }

    /// Compiled AST for `expr`, compiling on first use.
    fn compiled(&self, expr: &str) -> Option<Arc<AST>> {
        if let Some(entry) = self.cache.lock().get(expr) {
            return entry.clone();
        }
        let compiled = match self.engine.compile_expression(compat::normalize(expr)) {
            Ok(ast) => Some(Arc::new(ast)),
            Err(e) => {
                warn!("condition '{}' does not compile ({}); widget stays visible", expr, e);
                None
            }
        };
        let mut cache = self.cache.lock();
        if cache.len() >= self.capacity && !cache.contains_key(expr) {
            trace!("condition cache full ({} entries); clearing", cache.len());
            cache.clear();
        }
        cache.insert(expr.to_string(), compiled.clone());
        compiled
    }

    /// Number of distinct condition strings currently cached.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

/// Coerce a result to visibility: booleans as-is, non-zero numbers, non-empty strings and
/// non-empty collections are true; `()` is false.
pub fn truthy(value: &Dynamic) -> bool {
    if let Ok(b) = value.as_bool() {
        return b;
    }
    if let Ok(i) = value.as_int() {
        return i != 0;
    }
    if let Ok(f) = value.as_float() {
        return f != 0.0 && !f.is_nan();
    }
    if value.is_unit() {
        return false;
    }
    if value.is_string() {
        return value.clone().into_string().is_ok_and(|s| !s.is_empty());
    }
    true
}

/// Tree of dotted variable names.
#[derive(Default)]
struct Node {
    /// Value bound at exactly this name.
    value: Option<Dynamic>,
    /// Values under this name as a dotted prefix.
    children: BTreeMap<String, Node>,
}

impl Node {
    /// Convert to a script value. A name used both as a value and as a prefix binds the prefix.
    fn into_dynamic(self) -> Dynamic {
        if self.children.is_empty() {
            return self.value.unwrap_or(Dynamic::UNIT);
        }
        let map: Map = self
            .children
            .into_iter()
            .map(|(k, v)| (k.into(), v.into_dynamic()))
            .collect();
        Dynamic::from_map(map)
    }
}

/// Build the evaluation scope for one frame.
///
/// Each top-level prefix (`cpu`, `battery`, `top`, ...) and each undotted variable (`time`,
/// `hostname`, ...) becomes a constant.
pub fn namespace_scope(vars: &VariableDictionary) -> Scope<'static> {
    let mut root = Node::default();
    for (key, value) in vars {
        let node = key.split('.').fold(&mut root, |node, part| {
            node.children.entry(part.to_string()).or_default()
        });
        node.value = Some(script_value(value));
    }

    let mut scope = Scope::new();
    for (name, node) in root.children {
        scope.push_constant_dynamic(name, node.into_dynamic());
    }
    scope
}

/// Bind finite numeric strings as floats and everything else as strings.
fn script_value(value: &str) -> Dynamic {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Dynamic::from_float(n),
        _ => Dynamic::from(value.to_string()),
    }
}
