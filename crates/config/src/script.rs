//! Rhai-based configuration script runner and the `config`/`widget` host API.
//!
//! Every load builds a fresh [`Engine`] and builder state, runs the script once and drops both.
//! Nothing registered with or captured by one load is visible to the next.

use std::{
    fs, mem,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use rhai::{
    AST, Dynamic, Engine, EvalAltResult, Module, Position, Scope,
    module_resolvers::DummyModuleResolver,
};
use tracing::{debug, info, warn};

use crate::{
    Anchor, BarWidget, Error, GaugeWidget, GraphWidget, HrWidget, HudConfig, ImageWidget, Point,
    Shadow, Size, TextWidget, WidgetKind, WidgetSpec, compat, defaults, error::excerpt_at,
    options::Options,
};

/// Log target for script `print` and `debug` output.
const SCRIPT_TARGET: &str = "hud_config::script";

#[derive(Clone)]
/// Rhai-exposed handle exported as the global `hud` variable.
struct HudNamespace {
    /// Config under construction for the current load.
    state: Arc<Mutex<HudConfig>>,
}

/// Load and run the configuration script at `path`.
pub fn load_from_path(path: &Path) -> Result<HudConfig, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Run an in-memory configuration script. `path` is used only for error reporting.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<HudConfig, Error> {
    let state = Arc::new(Mutex::new(HudConfig::default()));

    let mut engine = Engine::new();
    configure_engine(&mut engine);
    register_dsl(&mut engine, &state);

    let normalized = compat::normalize(source);
    let ast = compile(&engine, &normalized, source, path)?;
    let mut scope = Scope::new();
    eval(&engine, &mut scope, &ast, source, path)?;

    // The engine holds clones of `state`; take the value rather than unwrapping the Arc.
    let config = mem::take(&mut *lock_unpoisoned(&state));
    debug!("config script produced {} widgets", config.widgets.len());
    Ok(config)
}

/// Apply logging hooks and sandbox limits to a fresh engine.
fn configure_engine(engine: &mut Engine) {
    engine.on_print(|s| info!(target: SCRIPT_TARGET, "{}", s));
    engine.on_debug(|s, src, pos| {
        debug!(target: SCRIPT_TARGET, "{} @ {:?}:{:?}", s, src, pos);
    });

    // Scripts cannot import other files.
    engine.set_module_resolver(DummyModuleResolver::new());

    engine.set_max_operations(200_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(128, 64);
    engine.set_max_string_size(64 * 1024);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(10_000);
}

/// Register `config`, `widget` and the `hud` namespace that carries the same two methods.
fn register_dsl(engine: &mut Engine, state: &Arc<Mutex<HudConfig>>) {
    engine.register_type_with_name::<HudNamespace>("HudNamespace");

    let st = state.clone();
    engine.register_fn("config", move |options: Dynamic| {
        apply_global(&mut lock_unpoisoned(&st), &Options::new(options));
    });
    let st = state.clone();
    engine.register_fn("widget", move |options: Dynamic| {
        push_widget(&st, &Options::new(options));
    });

    engine.register_fn("config", |ns: HudNamespace, options: Dynamic| {
        apply_global(&mut lock_unpoisoned(&ns.state), &Options::new(options));
    });
    engine.register_fn("widget", |ns: HudNamespace, options: Dynamic| {
        push_widget(&ns.state, &Options::new(options));
    });

    let mut module = Module::new();
    module.set_var(
        "hud",
        HudNamespace {
            state: state.clone(),
        },
    );
    engine.register_global_module(module.into());
}

/// Merge the fields present in `opts` into the global settings.
///
/// Absent or wrong-typed fields leave the current value alone, so repeated `config(...)` calls
/// accumulate.
fn apply_global(cfg: &mut HudConfig, opts: &Options) {
    if opts.has("position") {
        cfg.position = opts.point(
            "position",
            Point::new(defaults::POSITION_X, defaults::POSITION_Y),
        );
    }
    if let Some(font) = opts.string("font") {
        cfg.font = font;
    }
    if let Some(size) = opts.number("fontSize") {
        cfg.font_size = size;
    }
    if let Some(color) = opts.string("color") {
        cfg.color = color;
    }
    if let Some(interval) = opts.number("updateInterval") {
        cfg.update_interval = interval;
    }
    if let Some(on) = opts.boolean("enablePublicIP") {
        cfg.enable_public_ip = on;
    }
    if let Some(on) = opts.boolean("enableFileReading") {
        cfg.enable_file_reading = on;
    }
    if let Some(on) = opts.boolean("enableShellCommands") {
        if on {
            info!("config enables shell command placeholders");
        }
        cfg.enable_shell_commands = on;
    }
    if let Some(index) = opts.integer("display") {
        cfg.display_index = match usize::try_from(index) {
            Ok(i) => i,
            Err(_) => {
                warn!("display index {} is negative; using the main display", index);
                0
            }
        };
    }
    if let Some(name) = opts.string("anchor") {
        cfg.anchor = Anchor::parse(&name).unwrap_or_else(|| {
            warn!("unknown anchor '{}'; using topLeft", name);
            Anchor::TopLeft
        });
    }
    if let Some(f) = opts.string("dateFormat") {
        cfg.date_format = Some(f);
    }
    if let Some(f) = opts.string("timeFormat") {
        cfg.time_format = Some(f);
    }
    if let Some(f) = opts.string("datetimeFormat") {
        cfg.datetime_format = Some(f);
    }
    if let Some(iface) = opts.string("networkInterface") {
        cfg.network_interface = Some(iface);
    }
}

/// Parse a widget and append it to the config under construction.
fn push_widget(state: &Arc<Mutex<HudConfig>>, opts: &Options) {
    if let Some(widget) = parse_widget(opts) {
        lock_unpoisoned(state).widgets.push(widget);
    }
}

/// Build a widget from its options, or `None` when the `type` is missing or unknown.
fn parse_widget(opts: &Options) -> Option<WidgetSpec> {
    let Some(type_name) = opts.string("type") else {
        debug!("widget() without a string 'type'; skipped");
        return None;
    };
    let Some(kind) = WidgetKind::parse(&type_name) else {
        warn!("unknown widget type: {}", type_name);
        return None;
    };

    let position = opts.point("position", Point::default());
    let color = opts.string("color");
    let condition = opts.string("condition");

    let widget = match kind {
        WidgetKind::Text => {
            let weight = opts.string("weight").or_else(|| {
                opts.boolean("bold")
                    .unwrap_or(false)
                    .then(|| "bold".to_string())
            });
            WidgetSpec::Text(TextWidget {
                text: opts.text("text"),
                position,
                color,
                font_size: opts.number("fontSize"),
                font: opts.string("font"),
                weight,
                italic: opts.boolean("italic").unwrap_or(false),
                opacity: opts.number("opacity"),
                shadow: opts.nested("shadow").map(|s| parse_shadow(&s)),
                align: opts.string("align"),
                condition,
            })
        }
        WidgetKind::Graph => WidgetSpec::Graph(GraphWidget {
            source: opts.text("source"),
            position,
            size: opts.size(
                "size",
                Size::new(defaults::GRAPH_WIDTH, defaults::GRAPH_HEIGHT),
            ),
            color,
            condition,
        }),
        WidgetKind::Bar => WidgetSpec::Bar(BarWidget {
            source: opts.text("source"),
            position,
            width: opts.number("width").unwrap_or(defaults::BAR_WIDTH),
            height: opts.number("height").unwrap_or(defaults::BAR_HEIGHT),
            color,
            background_color: opts.string("backgroundColor"),
            condition,
        }),
        WidgetKind::Hr => WidgetSpec::Hr(HrWidget {
            position,
            width: opts.number("width").unwrap_or(defaults::HR_WIDTH),
            height: opts.number("height").unwrap_or(defaults::HR_HEIGHT),
            color,
            condition,
        }),
        WidgetKind::Gauge => WidgetSpec::Gauge(GaugeWidget {
            source: opts.text("source"),
            position,
            radius: opts.number("radius").unwrap_or(defaults::GAUGE_RADIUS),
            thickness: opts.number("thickness").unwrap_or(defaults::GAUGE_THICKNESS),
            color,
            background_color: opts.string("backgroundColor"),
            start_angle: opts.number("startAngle").unwrap_or(defaults::GAUGE_START_ANGLE),
            end_angle: opts.number("endAngle").unwrap_or(defaults::GAUGE_END_ANGLE),
            condition,
        }),
        WidgetKind::Image => WidgetSpec::Image(ImageWidget {
            path: opts.text("path"),
            position,
            size: opts.nested("size").map(|s| {
                Size::new(
                    s.number("width").unwrap_or(0.0),
                    s.number("height").unwrap_or(0.0),
                )
            }),
            condition,
        }),
    };
    Some(widget)
}

/// Shadow options; missing fields take the documented defaults.
fn parse_shadow(opts: &Options) -> Shadow {
    let d = Shadow::default();
    Shadow {
        color: opts.string("color").unwrap_or(d.color),
        offset_x: opts.number("offsetX").unwrap_or(d.offset_x),
        offset_y: opts.number("offsetY").unwrap_or(d.offset_y),
        blur: opts.number("blur").unwrap_or(d.blur),
    }
}

/// Compile normalized source. Errors are reported against the user's original text, which
/// has the same line structure.
fn compile(
    engine: &Engine,
    normalized: &str,
    source: &str,
    path: Option<&Path>,
) -> Result<AST, Error> {
    engine.compile(normalized).map_err(|err| {
        let err: EvalAltResult = err.into();
        error_from_rhai(source, &err, path)
    })
}

/// Evaluate a compiled AST in `scope`, converting errors into [`Error::Parse`].
fn eval(
    engine: &Engine,
    scope: &mut Scope,
    ast: &AST,
    source: &str,
    path: Option<&Path>,
) -> Result<(), Error> {
    engine
        .run_ast_with_scope(scope, ast)
        .map_err(|err| error_from_rhai(source, &err, path))
}

/// Lock a mutex and recover the guard even if it is poisoned.
fn lock_unpoisoned<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poison) => poison.into_inner(),
    }
}

/// Convert a Rhai error into a located [`Error::Parse`].
fn error_from_rhai(source: &str, err: &EvalAltResult, path: Option<&Path>) -> Error {
    let (line, col) = pos_to_line_col(err.position()).unwrap_or((1, 1));
    Error::Parse {
        path: path.map(Path::to_path_buf),
        line,
        col,
        message: err.to_string(),
        excerpt: excerpt_at(source, line, col),
    }
}

/// Convert a Rhai `Position` into a 1-based (line, col) pair.
fn pos_to_line_col(pos: Position) -> Option<(usize, usize)> {
    let line = pos.line()?;
    let col = pos.position().unwrap_or(1);
    Some((line.max(1), col.max(1)))
}
