#![allow(clippy::module_name_repetitions)]
//! `docker run` argument assembly.
//!
//! Order: `-d`, `--name`, `-p` (ports), `-v` (config files), `-v` (directories),
//! then `otherArguments` verbatim. The image name always comes last.

use std::path::Path;

use crate::config::Configuration;
use crate::errors::{Result, StartupError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArguments {
    /// Structured flags in assembly order.
    pub flags: Vec<String>,
    /// Trusted free-form tail.
    pub other: Option<String>,
}

impl RunArguments {
    /// Space-prefixed tokens plus a trailing space, ready to sit between
    /// `docker run` and the image name.
    pub fn to_argument_string(&self) -> String {
        let mut args = String::new();
        for flag in &self.flags {
            args.push(' ');
            args.push_str(flag);
        }
        if let Some(other) = &self.other {
            args.push(' ');
            args.push_str(other);
        }
        args.push(' ');
        args
    }

    /// Arguments following `docker`, with `otherArguments` split shell-style.
    pub fn docker_args(&self, image: &str) -> Result<Vec<String>> {
        let mut argv = Vec::with_capacity(self.flags.len() + 2);
        argv.push("run".to_string());
        argv.extend(self.flags.iter().cloned());
        if let Some(other) = &self.other {
            let words =
                shell_words::split(other).map_err(|e| StartupError::MalformedArguments {
                    arguments: other.clone(),
                    reason: e.to_string(),
                })?;
            argv.extend(words);
        }
        argv.push(image.to_string());
        Ok(argv)
    }
}

pub fn build_run_arguments(config: &Configuration, volume_root: &Path) -> Result<RunArguments> {
    let mut flags: Vec<String> = Vec::new();

    if config.daemon {
        flags.push("-d".to_string());
    }

    if let Some(name) = config.container_name.as_deref().filter(|s| !s.is_empty()) {
        flags.push("--name".to_string());
        flags.push(name.to_string());
    }

    for port in &config.port_map {
        flags.push("-p".to_string());
        flags.push(port.clone());
    }

    for mapping in config.file_mappings(volume_root)? {
        flags.push("-v".to_string());
        flags.push(mapping.volume_arg());
    }

    for mapping in config.directory_mappings(volume_root)? {
        flags.push("-v".to_string());
        flags.push(mapping.volume_arg());
    }

    let other = config
        .other_arguments
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(RunArguments { flags, other })
}
