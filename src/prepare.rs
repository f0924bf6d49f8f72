#![allow(clippy::module_name_repetitions)]
//! Materialize config-file mounts on the host by copying them out of the image.

use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::docker::{ContainerRuntime, ExecContext};
use crate::errors::Result;
use crate::util::shell_escape;
use crate::volume::PathMapping;

/// Mount point of the host parent directory inside the throwaway container.
pub const COPY_MOUNT_POINT: &str = "/copy_data_tmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    Existing(PathBuf),
    Extracted(PathBuf),
}

impl PrepareOutcome {
    pub fn path(&self) -> &Path {
        match self {
            PrepareOutcome::Existing(p) | PrepareOutcome::Extracted(p) => p,
        }
    }

    /// `"exist"` or `"new"`.
    pub fn kind(&self) -> &'static str {
        match self {
            PrepareOutcome::Existing(_) => "exist",
            PrepareOutcome::Extracted(_) => "new",
        }
    }

    /// Human-readable line printed by the CLI.
    pub fn describe(&self) -> String {
        match self {
            PrepareOutcome::Existing(p) => format!("already exist: {}", p.display()),
            PrepareOutcome::Extracted(p) => format!("copied from image: {}", p.display()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrepareRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    file_path: &'a Path,
}

impl Serialize for PrepareOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        PrepareRecord {
            kind: self.kind(),
            file_path: self.path(),
        }
        .serialize(serializer)
    }
}

/// One `docker run --rm` that copies `container_path` out of `image` into `host_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub image: String,
    pub host_path: PathBuf,
    pub container_path: String,
}

impl ExtractionPlan {
    pub fn new(mapping: &PathMapping, image: &str) -> Self {
        Self {
            image: image.to_string(),
            host_path: mapping.host_path.clone(),
            container_path: mapping.container_path.clone(),
        }
    }

    /// Host directory bind-mounted at [`COPY_MOUNT_POINT`].
    pub fn mount_dir(&self) -> PathBuf {
        self.host_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    }

    pub fn target_name(&self) -> String {
        self.host_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// In-container script: fail if the source is missing, otherwise copy recursively.
    pub fn script(&self) -> String {
        let src = shell_escape(&self.container_path);
        let dest = shell_escape(&format!("{}/{}", COPY_MOUNT_POINT, self.target_name()));
        format!("stat {src} > /dev/null && cp -r {src} {dest}")
    }

    /// Arguments following `docker`.
    pub fn docker_args(&self) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:{}", self.mount_dir().display(), COPY_MOUNT_POINT),
            self.image.clone(),
            "bash".to_string(),
            "-c".to_string(),
            self.script(),
        ]
    }
}

/// Prepare mounts in order, one extraction at a time.
///
/// Existing host paths are reported and left untouched. The first failing
/// extraction aborts; earlier extractions stay on disk.
pub fn prepare_mounts(
    mappings: &[PathMapping],
    image: &str,
    ctx: &ExecContext,
    runtime: &dyn ContainerRuntime,
) -> Result<Vec<PrepareOutcome>> {
    let mut outcomes = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        if mapping.host_path.exists() {
            debug!(path = %mapping.host_path.display(), "host path exists; skipping extraction");
            outcomes.push(PrepareOutcome::Existing(mapping.host_path.clone()));
            continue;
        }

        let plan = ExtractionPlan::new(mapping, image);
        runtime.ensure_host_dir(&plan.mount_dir())?;

        info!(
            host = %plan.host_path.display(),
            container = %plan.container_path,
            image = %plan.image,
            "extracting from image"
        );
        runtime.docker(&plan.docker_args(), ctx)?;
        outcomes.push(PrepareOutcome::Extracted(mapping.host_path.clone()));
    }
    Ok(outcomes)
}
