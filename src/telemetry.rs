//! tracing subscriber setup (stderr fmt layer filtered by `RUST_LOG`).

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;

static INIT: OnceCell<()> = OnceCell::new();

fn filter_directive(verbose: bool) -> String {
    match env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ if verbose => "docker_startup=debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// Install the global subscriber once; later calls are no-ops.
pub fn telemetry_init(verbose: bool) {
    if INIT.get().is_some() {
        return;
    }

    let env_filter = tracing_subscriber::EnvFilter::new(filter_directive(verbose));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("docker-startup: tracing init skipped (global subscriber already set)");
        return;
    }

    let _ = INIT.set(());
}
