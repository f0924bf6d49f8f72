//! Error mapping guide:
//! - Library operations return `StartupError`; the binary adds context with anyhow.
//! - Map `RuntimeNotFound` to exit code 127; all others to 1.
//! - Keep message texts stable (tests/UX depend on them).
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, StartupError>;

#[derive(Debug, Error)]
pub enum StartupError {
    /// `init` target already present.
    #[error("{name} is already exists")]
    AlreadyExists { name: String, path: PathBuf },

    /// Config file missing for `prepare`/`run`.
    #[error("Could not find {name}")]
    NotFound { name: String, path: PathBuf },

    #[error("cannot parse {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Mount spec that does not split into exactly two non-empty parts.
    #[error("malformed mount '{spec}': expected 'source:destination'")]
    MalformedMount { spec: String },

    #[error("volume root is not set: pass --volume-root or set VOLUME_ROOT")]
    MissingVolumeRoot,

    #[error("cannot resolve '{path}': home directory is unknown")]
    HomeNotFound { path: String },

    #[error("malformed otherArguments '{arguments}': {reason}")]
    MalformedArguments { arguments: String, reason: String },

    #[error("{command} failed ({}): {}", status_text(.status), .stderr.trim())]
    ExternalProcess {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{0}")]
    RuntimeNotFound(String),

    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl StartupError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StartupError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Map a failure to a process exit code:
/// - 127 when the container runtime cannot be located (command not found)
/// - 1 for all other errors
pub fn exit_code_for(e: &StartupError) -> u8 {
    match e {
        StartupError::RuntimeNotFound(_) => 127,
        _ => 1,
    }
}
