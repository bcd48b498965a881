//! Load, validate and hold the active configuration.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    Error, HudConfig,
    script::load_from_path,
    validate::{HostProbe, SystemProbe, ValidationError, has_errors, validate},
};

/// Script extensions accepted by the loader.
const EXTENSIONS: &[&str] = &["rhai", "js"];

/// A parsed configuration with its validation findings.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed configuration, possibly invalid.
    pub config: HudConfig,
    /// Findings in report order.
    pub diagnostics: Vec<ValidationError>,
}

impl LoadedConfig {
    /// Whether any finding is fatal.
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Read, run and validate the script at `path`.
pub fn load_validated(path: &Path, probe: &dyn HostProbe) -> Result<LoadedConfig, Error> {
    check_extension(path)?;
    let config = load_from_path(path)?;
    let diagnostics = validate(&config, probe);
    Ok(LoadedConfig {
        config,
        diagnostics,
    })
}

/// Reject paths that are not config scripts.
fn check_extension(path: &Path) -> Result<(), Error> {
    let ok = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| EXTENSIONS.contains(&ext));
    if ok {
        return Ok(());
    }
    Err(Error::Read {
        path: Some(path.to_path_buf()),
        message: "Unsupported config format (expected a .rhai or .js file)".to_string(),
    })
}

/// What a reload did to the active configuration.
#[derive(Debug, Clone)]
pub enum ReloadOutcome {
    /// The new config is active. Warnings did not block it.
    Applied {
        /// Non-fatal findings.
        warnings: Vec<ValidationError>,
    },
    /// The new config has fatal findings but there was nothing to fall back to, so it is active.
    AdoptedWithErrors {
        /// All findings.
        diagnostics: Vec<ValidationError>,
    },
    /// The new config has fatal findings; the previous config stays active.
    KeptPrevious {
        /// All findings.
        diagnostics: Vec<ValidationError>,
    },
    /// The script could not be read or run. The previous config stays active, or the built-in
    /// defaults when there was none.
    ScriptFailed {
        /// Read or script error.
        error: Error,
        /// Whether the defaults were adopted.
        used_default: bool,
    },
    /// A newer reload finished first; this result was discarded.
    Superseded,
}

impl ReloadOutcome {
    /// Whether the file's contents are now active.
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::AdoptedWithErrors { .. })
    }
}

/// Active config plus the ticket that produced it.
#[derive(Default)]
struct Active {
    /// Current configuration.
    config: Option<Arc<HudConfig>>,
    /// Findings for the current configuration.
    diagnostics: Vec<ValidationError>,
    /// Ticket of the reload that last replaced the state.
    ticket: u64,
}

/// Sole owner of the active configuration.
///
/// Readers take an `Arc` snapshot with [`ConfigLoader::current`]. Reloads parse without holding
/// any lock and swap the result in under a short write lock. Each reload takes a ticket; a result
/// is only installed if no later ticket has been installed already.
pub struct ConfigLoader {
    /// Script path.
    path: PathBuf,
    /// Host lookups used by validation.
    probe: Box<dyn HostProbe + Send + Sync>,
    /// Installed state.
    active: RwLock<Active>,
    /// Last ticket handed out.
    issued: AtomicU64,
}

impl ConfigLoader {
    /// A loader for `path` using the real host for validation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_probe(path, SystemProbe::new())
    }

    /// A loader with a custom validation probe.
    pub fn with_probe(path: impl Into<PathBuf>, probe: impl HostProbe + Send + Sync + 'static) -> Self {
        Self {
            path: path.into(),
            probe: Box::new(probe),
            active: RwLock::new(Active::default()),
            issued: AtomicU64::new(0),
        }
    }

    /// Script path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The active configuration, if any reload has produced one.
    pub fn current(&self) -> Option<Arc<HudConfig>> {
        self.active.read().config.clone()
    }

    /// Findings for the active configuration.
    pub fn diagnostics(&self) -> Vec<ValidationError> {
        self.active.read().diagnostics.clone()
    }

    /// Number of reloads started so far.
    pub fn generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Parse the script again and install the result according to the fallback rules.
    ///
    /// Blocking: runs the script engine on the calling thread.
    pub fn reload(&self) -> ReloadOutcome {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("config reload #{} from {}", ticket, self.path.display());
        let loaded = load_validated(&self.path, self.probe.as_ref());

        let mut active = self.active.write();
        if active.ticket > ticket {
            debug!("config reload #{} superseded by #{}", ticket, active.ticket);
            return ReloadOutcome::Superseded;
        }
        active.ticket = ticket;

        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("{}", e.pretty());
                let used_default = active.config.is_none();
                if used_default {
                    warn!("no previous config; using defaults");
                    active.config = Some(Arc::new(HudConfig::default()));
                    active.diagnostics.clear();
                } else {
                    warn!("keeping previous config");
                }
                return ReloadOutcome::ScriptFailed {
                    error: e,
                    used_default,
                };
            }
        };

        log_findings(&loaded.diagnostics);
        if !loaded.has_errors() {
            info!(
                "config loaded from {} ({} widgets)",
                self.path.display(),
                loaded.config.widgets.len()
            );
            let warnings = loaded.diagnostics.clone();
            install(&mut active, loaded);
            return ReloadOutcome::Applied { warnings };
        }
        if active.config.is_some() {
            warn!("config has errors; keeping previous config");
            return ReloadOutcome::KeptPrevious {
                diagnostics: loaded.diagnostics,
            };
        }
        warn!("config has errors and there is no previous config; using it anyway");
        let diagnostics = loaded.diagnostics.clone();
        install(&mut active, loaded);
        ReloadOutcome::AdoptedWithErrors { diagnostics }
    }
}

/// Replace the active config.
fn install(active: &mut Active, loaded: LoadedConfig) {
    active.config = Some(Arc::new(loaded.config));
    active.diagnostics = loaded.diagnostics;
}

/// Log each finding at its severity.
fn log_findings(findings: &[ValidationError]) {
    for f in findings {
        if f.is_error() {
            error!("config {}: {}", f.path, f.message);
        } else {
            warn!("config {}: {}", f.path, f.message);
        }
    }
}
