use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "docker-startup",
    version,
    about = "Generate startup.yml, copy config files out of an image, and docker run it with the configured mounts."
)]
pub(crate) struct Cli {
    /// Base host directory for mount sources (absolute, ~/..., or relative). Defaults to $VOLUME_ROOT
    #[arg(long = "volume-root", global = true)]
    pub(crate) volume_root: Option<String>,

    /// Print detailed execution info
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    /// Print the docker commands that would run, but do not execute them
    #[arg(long = "dry-run", global = true)]
    pub(crate) dry_run: bool,

    /// Colorize stderr output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<docker_startup::ColorMode>,

    /// Abort each docker invocation after this many seconds (default: wait indefinitely)
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub(crate) timeout: Option<u64>,

    // None: print help and exit 0
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Generate startup.yml file
    #[command(alias = "i")]
    Init {
        /// Another config file name to generate
        #[arg(short = 'c', long = "config-file")]
        config_file: Option<String>,
    },

    /// Prepare image config by startup.yml, copying conf files from image if needed
    #[command(alias = "p")]
    Prepare {
        /// Image to copy missing config files from
        image: String,
        /// Another config file name to use
        #[arg(short = 'c', long = "config-file")]
        config_file: Option<String>,
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Exec `docker run` using the arguments defined in startup.yml
    #[command(alias = "r")]
    Run {
        /// Image to run
        image: String,
        /// Another config file name to use
        #[arg(short = 'c', long = "config-file")]
        config_file: Option<String>,
    },
}
