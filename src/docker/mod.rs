#![allow(clippy::module_name_repetitions)]
//! Docker runtime detection and invocation backends.

pub mod backend;
pub mod runtime;

pub use backend::{preview, ContainerRuntime, DockerCli, DryRun, ExecContext};
pub use runtime::{container_runtime_path, RUNTIME_OVERRIDE_ENV};
