mod cli;

use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use docker_startup::{
    color_enabled_stderr, config::config_file_name, container_runtime_path, exit_code_for,
    log_error_stderr, log_info_stderr, set_color_mode, telemetry_init, ContainerRuntime,
    DockerCli, DryRun, RunOptions, StartupError,
};

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        set_color_mode(mode);
    }
    telemetry_init(cli.verbose);

    let use_err = color_enabled_stderr();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<StartupError>() {
            // StartupError messages already carry their cause.
            Some(se) => {
                log_error_stderr(use_err, &se.to_string());
                ExitCode::from(exit_code_for(se))
            }
            None => {
                log_error_stderr(use_err, &format!("{e:#}"));
                ExitCode::from(1)
            }
        },
    }
}

/// Snapshot of the process environment after `.env` has been applied.
fn capture_env() -> BTreeMap<String, String> {
    let _ = dotenvy::dotenv();
    env::vars().collect()
}

fn select_runtime(cli: &Cli, opts: &RunOptions) -> Result<Box<dyn ContainerRuntime>> {
    if cli.dry_run {
        return Ok(Box::new(DryRun));
    }
    let program = container_runtime_path(&opts.env, &opts.cwd)?;
    Ok(Box::new(
        DockerCli::new(program).with_timeout(cli.timeout.map(Duration::from_secs)),
    ))
}

fn run_options(cli: &Cli, cwd: &Path, image: &str, config_file: Option<&str>) -> RunOptions {
    let mut opts = RunOptions::new(cwd, image).env(capture_env());
    if let Some(root) = &cli.volume_root {
        opts = opts.volume_root(root.clone());
    }
    if let Some(name) = config_file {
        opts = opts.config_file(name);
    }
    opts
}

fn print_verbose(cli: &Cli, opts: &RunOptions) {
    if !cli.verbose {
        return;
    }
    let use_err = color_enabled_stderr();
    if let Ok(root) = opts.effective_volume_root() {
        log_info_stderr(
            use_err,
            &format!("docker-startup: volume root: {}", root.display()),
        );
    }
    log_info_stderr(
        use_err,
        &format!(
            "docker-startup: config file: {}",
            opts.cwd
                .join(config_file_name(opts.config_file.as_deref()))
                .display()
        ),
    );
    log_info_stderr(use_err, &format!("docker-startup: image: {}", opts.image_name));
}

fn dispatch(cli: &Cli) -> Result<()> {
    let cwd = env::current_dir().context("cannot determine working directory")?;

    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .context("cannot print help")?;
        return Ok(());
    };

    match command {
        Command::Init { config_file } => {
            let created = docker_startup::init(&cwd, config_file.as_deref())?;
            println!("Created file:\n{}", created.display());
        }
        Command::Prepare {
            image,
            config_file,
            json,
        } => {
            let opts = run_options(cli, &cwd, image, config_file.as_deref());
            print_verbose(cli, &opts);
            opts.effective_volume_root()?;
            let runtime = select_runtime(cli, &opts)?;
            let outcomes = docker_startup::prepare(&opts, runtime.as_ref())?;
            if *json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcomes)
                        .context("cannot serialize prepare result")?
                );
            } else {
                for outcome in &outcomes {
                    println!("{}", outcome.describe());
                }
            }
        }
        Command::Run { image, config_file } => {
            let opts = run_options(cli, &cwd, image, config_file.as_deref());
            print_verbose(cli, &opts);
            opts.effective_volume_root()?;
            let runtime = select_runtime(cli, &opts)?;
            let out = docker_startup::run(&opts, runtime.as_ref())?;
            if cli.dry_run {
                log_info_stderr(
                    color_enabled_stderr(),
                    "docker-startup: dry-run requested; not executing Docker.",
                );
            } else {
                print!("{out}");
            }
        }
    }
    Ok(())
}
