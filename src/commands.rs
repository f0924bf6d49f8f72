//! Top-level operations: `init`, `prepare` and `run`.
//!
//! Each call loads the config afresh; nothing is cached between invocations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::{init_config, load_config};
use crate::docker::{ContainerRuntime, ExecContext};
use crate::errors::{Result, StartupError};
use crate::paths::resolve_with_home;
use crate::prepare::{prepare_mounts, PrepareOutcome};
use crate::run::build_run_arguments;

/// Environment key consulted when no volume root is given explicitly.
pub const VOLUME_ROOT_ENV: &str = "VOLUME_ROOT";

/// Options shared by `prepare` and `run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cwd: PathBuf,
    /// Absolute, `~/...`, or relative to `cwd`.
    pub volume_root: Option<String>,
    pub config_file: Option<String>,
    pub image_name: String,
    /// Environment for docker subprocesses and the `VOLUME_ROOT` fallback.
    pub env: BTreeMap<String, String>,
}

impl RunOptions {
    pub fn new(cwd: impl Into<PathBuf>, image_name: impl Into<String>) -> Self {
        Self {
            cwd: cwd.into(),
            volume_root: None,
            config_file: None,
            image_name: image_name.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn volume_root(mut self, root: impl Into<String>) -> Self {
        self.volume_root = Some(root.into());
        self
    }

    pub fn config_file(mut self, name: impl Into<String>) -> Self {
        self.config_file = Some(name.into());
        self
    }

    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Explicit volume root, else `VOLUME_ROOT` from the env map, resolved to an absolute path.
    pub fn effective_volume_root(&self) -> Result<PathBuf> {
        let raw = self
            .volume_root
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.env
                    .get(VOLUME_ROOT_ENV)
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
            })
            .ok_or(StartupError::MissingVolumeRoot)?;
        resolve_with_home(raw, &self.cwd)
    }

    pub fn exec_context(&self) -> ExecContext {
        ExecContext::new(&self.cwd, self.env.clone())
    }
}

/// Create the config file from the default template; returns its path.
#[instrument(level = "info", skip_all, fields(cwd = %cwd.display()))]
pub fn init(cwd: &Path, config_file: Option<&str>) -> Result<PathBuf> {
    init_config(cwd, config_file)
}

/// Make sure every config-file mount exists on the host, extracting missing ones from the image.
#[instrument(level = "info", skip_all, fields(image = %opts.image_name))]
pub fn prepare(opts: &RunOptions, runtime: &dyn ContainerRuntime) -> Result<Vec<PrepareOutcome>> {
    let volume_root = opts.effective_volume_root()?;
    let cfg = load_config(&opts.cwd, opts.config_file.as_deref())?;
    let mappings = cfg.file_mappings(&volume_root)?;
    debug!(volume_root = %volume_root.display(), count = mappings.len(), "preparing mounts");
    prepare_mounts(&mappings, &opts.image_name, &opts.exec_context(), runtime)
}

/// Launch the container with `docker run`; returns its captured stdout.
#[instrument(level = "info", skip_all, fields(image = %opts.image_name))]
pub fn run(opts: &RunOptions, runtime: &dyn ContainerRuntime) -> Result<String> {
    let volume_root = opts.effective_volume_root()?;
    let cfg = load_config(&opts.cwd, opts.config_file.as_deref())?;
    let args = build_run_arguments(&cfg, &volume_root)?;
    debug!(arguments = %args.to_argument_string(), "assembled docker run arguments");
    let argv = args.docker_args(&opts.image_name)?;
    runtime.docker(&argv, &opts.exec_context())
}
