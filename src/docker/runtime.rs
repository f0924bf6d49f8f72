#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use which::which_in;

use crate::errors::{Result, StartupError};

/// Environment key naming an explicit docker binary.
pub const RUNTIME_OVERRIDE_ENV: &str = "DOCKER_STARTUP_RUNTIME";

/// Locate the docker binary using the caller's environment map.
///
/// `DOCKER_STARTUP_RUNTIME` wins; otherwise `docker` is looked up on the map's `PATH`.
pub fn container_runtime_path(env: &BTreeMap<String, String>, cwd: &Path) -> Result<PathBuf> {
    if let Some(explicit) = env
        .get(RUNTIME_OVERRIDE_ENV)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        let p = PathBuf::from(explicit);
        if p.is_file() {
            return Ok(p);
        }
        return Err(StartupError::RuntimeNotFound(format!(
            "{RUNTIME_OVERRIDE_ENV} points to a missing file: {explicit}"
        )));
    }

    which_in("docker", env.get("PATH"), cwd).map_err(|_| {
        StartupError::RuntimeNotFound("Docker is required but was not found in PATH.".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_must_exist() {
        let mut env = BTreeMap::new();
        env.insert(
            RUNTIME_OVERRIDE_ENV.to_string(),
            "/nonexistent/docker".to_string(),
        );
        let err = container_runtime_path(&env, Path::new("/")).expect_err("missing");
        assert!(matches!(err, StartupError::RuntimeNotFound(_)));
    }

    #[test]
    fn override_is_used_when_present() {
        let td = tempfile::tempdir().expect("tmpdir");
        let fake = td.path().join("docker");
        std::fs::write(&fake, "").expect("write");
        let mut env = BTreeMap::new();
        env.insert(
            RUNTIME_OVERRIDE_ENV.to_string(),
            fake.display().to_string(),
        );
        assert_eq!(container_runtime_path(&env, td.path()).expect("found"), fake);
    }

    #[test]
    fn empty_path_finds_nothing() {
        let td = tempfile::tempdir().expect("tmpdir");
        let mut env = BTreeMap::new();
        env.insert("PATH".to_string(), td.path().display().to_string());
        let err = container_runtime_path(&env, td.path()).expect_err("not found");
        assert!(err.to_string().contains("not found in PATH"));
    }
}
