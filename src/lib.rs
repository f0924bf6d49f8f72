//! docker-startup: turn a `startup.yml` into prepared host volumes and a `docker run` invocation.
//!
//! Flow: [`config`] loads the document, [`volume`] maps mount specs under the
//! volume root, then [`prepare`] extracts missing config files from the image
//! and [`run`] assembles the launch arguments. [`commands`] ties them together.

pub mod color;
pub mod commands;
pub mod config;
pub mod docker;
pub mod errors;
pub mod paths;
pub mod prepare;
pub mod run;
pub mod telemetry;
pub mod util;
pub mod volume;

pub use color::{
    color_enabled_stderr, log_error_stderr, log_info_stderr, paint, set_color_mode, ColorMode,
};
pub use commands::{init, prepare, run, RunOptions, VOLUME_ROOT_ENV};
pub use config::{load_config, parse_config, Configuration, DEFAULT_CONFIG_FILE};
pub use docker::{container_runtime_path, ContainerRuntime, DockerCli, DryRun, ExecContext};
pub use errors::{exit_code_for, Result, StartupError};
pub use paths::{resolve_path, resolve_with_home};
pub use prepare::{prepare_mounts, ExtractionPlan, PrepareOutcome};
pub use run::{build_run_arguments, RunArguments};
pub use telemetry::telemetry_init;
pub use util::{shell_escape, shell_join};
pub use volume::{map_volumes, strip_trailing_slash, MountSpec, PathMapping};
