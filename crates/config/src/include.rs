//! `${file path="..."}` evaluation.

use std::{
    env, fs,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::paths::{expand_tilde_with, home_dir, normalize_lexically};

/// Returned when a path lies outside the allowed roots.
pub const ACCESS_DENIED: &str = "[access denied]";
/// Returned for unreadable, oversized or non-UTF-8 files and malformed placeholders.
pub const ERROR: &str = "[error]";

/// Largest file that will be read, in bytes.
pub const MAX_FILE_BYTES: u64 = 1024;

/// Directories that `${file ...}` placeholders may read from.
#[derive(Debug, Clone)]
pub struct FileAccessPolicy {
    /// Home directory used for `~` expansion.
    home: Option<PathBuf>,
    /// Allowed directory prefixes, compared component-wise.
    roots: Vec<PathBuf>,
}

impl FileAccessPolicy {
    /// The user's home directory plus the system temp directories.
    pub fn from_env() -> Self {
        let home = home_dir();
        let mut roots: Vec<PathBuf> = home.iter().cloned().collect();
        roots.push(PathBuf::from("/tmp"));
        roots.push(PathBuf::from("/private/tmp"));
        roots.push(env::temp_dir());
        Self { home, roots }
    }

    /// A policy with an explicit home and root list.
    pub fn new(home: Option<PathBuf>, roots: Vec<PathBuf>) -> Self {
        Self { home, roots }
    }

    /// Whether `path` (already absolute and normalized) is under an allowed root.
    fn allows(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| {
            path.starts_with(root)
                || fs::canonicalize(root).is_ok_and(|canon| path.starts_with(canon))
        })
    }

    /// Read the first line of the file at `raw_path`, trimmed.
    ///
    /// Returns [`ACCESS_DENIED`] for paths outside the allowed roots, including paths that only
    /// reach a root through `..` or a symlink, and [`ERROR`] for anything that cannot be read
    /// as at most [`MAX_FILE_BYTES`] of UTF-8.
    pub fn read_first_line(&self, raw_path: &str) -> String {
        let expanded = expand_tilde_with(raw_path, self.home.as_deref());
        if !expanded.is_absolute() {
            debug!("file placeholder path is not absolute: {}", raw_path);
            return ACCESS_DENIED.to_string();
        }
        let normalized = normalize_lexically(&expanded);
        if !self.allows(&normalized) {
            debug!("file placeholder outside allowed roots: {}", normalized.display());
            return ACCESS_DENIED.to_string();
        }

        let real = match fs::canonicalize(&normalized) {
            Ok(p) => p,
            Err(e) => {
                debug!("file placeholder {}: {}", normalized.display(), e);
                return ERROR.to_string();
            }
        };
        if !self.allows(&real) {
            debug!(
                "file placeholder {} resolves outside allowed roots ({})",
                normalized.display(),
                real.display()
            );
            return ACCESS_DENIED.to_string();
        }

        match read_capped(&real) {
            Some(content) => first_line(&content),
            None => ERROR.to_string(),
        }
    }
}

impl Default for FileAccessPolicy {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Read a regular file of at most [`MAX_FILE_BYTES`] as UTF-8.
fn read_capped(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let meta = file.metadata().ok()?;
    if !meta.is_file() || meta.len() > MAX_FILE_BYTES {
        return None;
    }
    // The file may grow between stat and read; read one byte past the cap to notice.
    let mut buf = Vec::with_capacity(MAX_FILE_BYTES as usize);
    file.take(MAX_FILE_BYTES + 1).read_to_end(&mut buf).ok()?;
    if buf.len() as u64 > MAX_FILE_BYTES {
        return None;
    }
    String::from_utf8(buf).ok()
}

/// First line of `text`, with surrounding whitespace removed.
pub fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
