//! Binary entrypoint for the hudkit developer CLI.
use std::{
    fs, io,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use hud_config::{
    Expander, HudConfig, LoadedConfig, SystemProbe, build_variable_dictionary, load_validated,
    resolve_config_path,
};
use hud_metrics::{DateTimeFormats, DateTimeInfo, MetricsSnapshot, SystemInfo};
use logging as logshared;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*};

/// Per-widget preview rendering.
mod preview;

#[derive(Parser, Debug)]
#[command(name = "hudkit", about = "Check and preview hudkit configuration scripts", version)]
/// Command-line interface for the `hudkit` binary.
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,

    /// Logging controls
    #[command(flatten)]
    log: logshared::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.config/hudkit/config.rhai)
        path: Option<PathBuf>,

        /// Dump the parsed configuration as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// Evaluate every widget's condition and text against one metrics snapshot.
    Preview {
        /// Path to configuration file (defaults to ~/.config/hudkit/config.rhai)
        path: Option<PathBuf>,

        /// Read the snapshot from a JSON file instead of the host
        #[arg(long, value_name = "FILE")]
        metrics: Option<PathBuf>,
    },
    /// Print the variable dictionary available to placeholders and conditions.
    Vars {
        /// Read the snapshot from a JSON file instead of the host
        #[arg(long, value_name = "FILE")]
        metrics: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let final_spec = cli.log.spec();
    let env_filter = logshared::env_filter_from_spec(&final_spec);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init()
        .ok();
    debug!("log filter: {}", final_spec);

    let code = match &cli.command {
        Command::Check { path, dump } => {
            let explicit = path.as_deref().or(cli.config.as_deref());
            check(&resolve_or_exit(explicit), *dump)
        }
        Command::Preview { path, metrics } => {
            let explicit = path.as_deref().or(cli.config.as_deref());
            preview(&resolve_or_exit(explicit), metrics.as_deref())
        }
        Command::Vars { metrics } => vars(metrics.as_deref()),
    };
    process::exit(code);
}

/// Resolve the config path or exit with the resolution error.
fn resolve_or_exit(explicit: Option<&Path>) -> PathBuf {
    match resolve_config_path(explicit) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
}

/// Load and validate `path`, or exit with the load error.
fn load_or_exit(path: &Path) -> LoadedConfig {
    match load_validated(path, &SystemProbe::new()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    }
}

/// `hudkit check`.
fn check(path: &Path, dump: bool) -> i32 {
    let loaded = load_or_exit(path);
    for finding in &loaded.diagnostics {
        eprintln!("{finding}");
    }
    if dump {
        match serde_json::to_string_pretty(&loaded.config) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize config: {e}");
                return 1;
            }
        }
    }
    if loaded.has_errors() {
        return 1;
    }
    if !dump {
        println!(
            "OK ({} widgets, {} warnings)",
            loaded.config.widgets.len(),
            loaded.diagnostics.len()
        );
    }
    0
}

/// `hudkit preview`.
fn preview(path: &Path, metrics: Option<&Path>) -> i32 {
    let loaded = load_or_exit(path);
    for finding in &loaded.diagnostics {
        eprintln!("{finding}");
    }
    let Some(snapshot) = snapshot_or_report(metrics, &loaded.config) else {
        return 1;
    };
    let expander = Expander::for_config(&loaded.config);
    let mut frame = expander.frame(&snapshot);
    for (i, widget) in loaded.config.widgets.iter().enumerate() {
        println!("{}", preview::describe(i, widget, &loaded.config, &mut frame));
    }
    0
}

/// `hudkit vars`.
fn vars(metrics: Option<&Path>) -> i32 {
    let Some(snapshot) = snapshot_or_report(metrics, &HudConfig::default()) else {
        return 1;
    };
    for (name, value) in build_variable_dictionary(&snapshot) {
        println!("{name} = {value}");
    }
    0
}

/// Snapshot from `file`, or a host-derived one. Errors are printed.
fn snapshot_or_report(file: Option<&Path>, config: &HudConfig) -> Option<MetricsSnapshot> {
    match file {
        Some(file) => match read_snapshot(file) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("Failed to read metrics from {}: {e}", file.display());
                None
            }
        },
        None => Some(host_snapshot(&config.datetime_formats())),
    }
}

/// Parse a JSON snapshot. Missing fields take their defaults.
fn read_snapshot(file: &Path) -> Result<MetricsSnapshot, String> {
    let text = fs::read_to_string(file).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Host identity and the current time; collector-backed readings stay at their defaults.
fn host_snapshot(formats: &DateTimeFormats) -> MetricsSnapshot {
    MetricsSnapshot {
        system: SystemInfo::from_host(),
        datetime: DateTimeInfo::now(formats),
        ..MetricsSnapshot::default()
    }
}
