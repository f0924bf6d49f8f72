//! Container runtime backends: the real docker CLI and a printing dry-run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::errors::{Result, StartupError};
use crate::util::{shell_join, ExecRequest, ExecService};

/// Working directory and environment handed to every docker invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl ExecContext {
    pub fn new(cwd: impl Into<PathBuf>, env: BTreeMap<String, String>) -> Self {
        Self {
            cwd: cwd.into(),
            env,
        }
    }
}

/// Runs `docker <args...>` and yields captured stdout.
///
/// A non-zero exit must surface as an error.
pub trait ContainerRuntime {
    fn docker(&self, args: &[String], ctx: &ExecContext) -> Result<String>;

    /// Create a host directory that is about to be bind-mounted.
    fn ensure_host_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .map_err(|e| StartupError::io(format!("cannot create {}", dir.display()), e))
    }
}

/// `docker` binary invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: PathBuf,
    exec: ExecService,
}

impl DockerCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            exec: ExecService::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if let Some(t) = timeout {
            self.exec = ExecService::with_timeout(t);
        }
        self
    }
}

impl ContainerRuntime for DockerCli {
    fn docker(&self, args: &[String], ctx: &ExecContext) -> Result<String> {
        let request = ExecRequest::new(self.program.as_os_str())
            .args(args)
            .cwd(&ctx.cwd)
            .envs(&ctx.env);
        let out = self.exec.run(request)?;
        if !out.status.success() {
            return Err(StartupError::ExternalProcess {
                command: preview(args),
                status: out.status.code(),
                stderr: out.stderr,
            });
        }
        Ok(out.stdout)
    }
}

/// Prints each command instead of executing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRun;

impl ContainerRuntime for DryRun {
    fn docker(&self, args: &[String], _ctx: &ExecContext) -> Result<String> {
        let use_err = crate::color_enabled_stderr();
        crate::log_info_stderr(use_err, &format!("docker-startup: docker: {}", preview(args)));
        info!("dry-run: docker invocation skipped");
        Ok(String::new())
    }

    fn ensure_host_dir(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Shell-quoted `docker ...` line for previews and error messages.
pub fn preview(args: &[String]) -> String {
    format!("docker {}", shell_join(args))
}
