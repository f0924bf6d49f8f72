//! Host path resolution: `~`-relative, absolute and cwd-relative inputs.
//!
//! Pure string/path composition; no filesystem access. A `~` input with no
//! known home directory is an error.

use std::path::{Component, Path, PathBuf};

use crate::errors::{Result, StartupError};

/// Resolve `path` to an absolute path.
///
/// - `~...` replaces the tilde with `home` and joins the remainder
/// - absolute paths are returned unchanged
/// - anything else is joined onto `cwd`
pub fn resolve_path(path: &str, cwd: &Path, home: &Path) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        return join_normalized(home, rest);
    }
    if Path::new(path).is_absolute() {
        return PathBuf::from(path);
    }
    join_normalized(cwd, path)
}

/// Like [`resolve_path`] but uses the current user's home directory.
pub fn resolve_with_home(path: &str, cwd: &Path) -> Result<PathBuf> {
    resolve_with_optional_home(path, cwd, home::home_dir().as_deref())
}

/// A `~` path needs a home directory; other inputs never consult it.
fn resolve_with_optional_home(path: &str, cwd: &Path, home: Option<&Path>) -> Result<PathBuf> {
    match home {
        Some(home) => Ok(resolve_path(path, cwd, home)),
        None if path.starts_with('~') => Err(StartupError::HomeNotFound {
            path: path.to_string(),
        }),
        None => Ok(resolve_path(path, cwd, Path::new("/"))),
    }
}

/// Join `tail` onto `base` and normalize the result lexically.
///
/// A leading separator on `tail` does not discard `base` (unlike `Path::join`);
/// `.` segments and repeated separators are dropped and `..` pops a segment.
pub fn join_normalized(base: &Path, tail: &str) -> PathBuf {
    let trimmed = tail.trim_start_matches('/');
    let joined = if trimmed.is_empty() {
        base.to_path_buf()
    } else {
        base.join(trimmed)
    };
    normalize_lexically(&joined)
}

/// Collapse `.`/`..` and duplicate separators without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
