#![allow(clippy::module_name_repetitions)]
//! Mount spec parsing and host/container path mapping.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{Result, StartupError};
use crate::paths::join_normalized;

/// A `source:destination` mount entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub source: String,
    pub destination: String,
}

impl MountSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let parts: Vec<&str> = spec.split(':').collect();
        match parts.as_slice() {
            [src, dest] if !src.is_empty() && !dest.is_empty() => Ok(MountSpec {
                source: (*src).to_string(),
                destination: (*dest).to_string(),
            }),
            _ => Err(StartupError::MalformedMount {
                spec: spec.to_string(),
            }),
        }
    }
}

impl FromStr for MountSpec {
    type Err = StartupError;

    fn from_str(s: &str) -> Result<Self> {
        MountSpec::parse(s)
    }
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.destination)
    }
}

/// Resolved host/container pair; neither side carries a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub host_path: PathBuf,
    pub container_path: String,
}

impl PathMapping {
    /// `host:container` as passed to `docker run -v`.
    pub fn volume_arg(&self) -> String {
        format!("{}:{}", self.host_path.display(), self.container_path)
    }
}

/// Strip trailing `/` characters; a bare `/` is left as is.
pub fn strip_trailing_slash(s: &str) -> &str {
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() && !s.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Sub-directory inserted between the volume root and mount sources:
/// explicit `volume_sub_directory` wins, then the container name.
pub fn select_sub_directory<'a>(
    volume_sub_directory: Option<&'a str>,
    container_name: Option<&'a str>,
) -> Option<&'a str> {
    volume_sub_directory
        .filter(|s| !s.is_empty())
        .or_else(|| container_name.filter(|s| !s.is_empty()))
}

/// Map mount specs onto `volume_root[/sub_directory]`, preserving input order.
///
/// The first malformed entry fails the whole mapping.
pub fn map_volumes<S: AsRef<str>>(
    specs: &[S],
    volume_root: &Path,
    sub_directory: Option<&str>,
) -> Result<Vec<PathMapping>> {
    let base = match sub_directory.filter(|s| !s.is_empty()) {
        Some(sub) => join_normalized(volume_root, sub),
        None => volume_root.to_path_buf(),
    };
    specs
        .iter()
        .map(|raw| {
            let spec = MountSpec::parse(raw.as_ref())?;
            let host = join_normalized(&base, &spec.source);
            Ok(PathMapping {
                host_path: PathBuf::from(strip_trailing_slash(&host.to_string_lossy())),
                container_path: strip_trailing_slash(&spec.destination).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_source_and_destination() {
        let m: MountSpec = "conf:/etc/conf".parse().expect("valid spec");
        assert_eq!(m.source, "conf");
        assert_eq!(m.destination, "/etc/conf");
        assert_eq!(m.to_string(), "conf:/etc/conf");
    }

    #[test]
    fn parse_rejects_single_part() {
        match MountSpec::parse("onlyonepart") {
            Err(StartupError::MalformedMount { spec }) => assert_eq!(spec, "onlyonepart"),
            other => panic!("expected MalformedMount, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_three_parts_and_empty_segments() {
        for bad in ["a:b:ro", ":dest", "src:", ":"] {
            assert!(MountSpec::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn strip_trailing_slash_is_idempotent() {
        for s in ["", "/", "a", "a/", "a//", "/x/y/", "/x/y"] {
            let once = strip_trailing_slash(s);
            assert_eq!(strip_trailing_slash(once), once, "input {s:?}");
        }
        assert_eq!(strip_trailing_slash("/etc/nginx/"), "/etc/nginx");
        assert_eq!(strip_trailing_slash("/"), "/");
    }

    #[test]
    fn sub_directory_prefers_explicit_value() {
        assert_eq!(select_sub_directory(Some("sub"), Some("app")), Some("sub"));
        assert_eq!(select_sub_directory(None, Some("app")), Some("app"));
        assert_eq!(select_sub_directory(Some(""), Some("app")), Some("app"));
        assert_eq!(select_sub_directory(None, None), None);
    }

    #[test]
    fn map_preserves_order_and_inserts_sub_directory() {
        let specs = ["b:/b", "a:/a/", "c/:/c"];
        let out = map_volumes(&specs, Path::new("/data"), Some("sub")).expect("map");
        let hosts: Vec<_> = out.iter().map(|m| m.host_path.clone()).collect();
        assert_eq!(
            hosts,
            vec![
                PathBuf::from("/data/sub/b"),
                PathBuf::from("/data/sub/a"),
                PathBuf::from("/data/sub/c"),
            ]
        );
        let containers: Vec<_> = out.iter().map(|m| m.container_path.as_str()).collect();
        assert_eq!(containers, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn map_without_sub_directory_joins_root() {
        let out = map_volumes(&["logs:/var/log/app"], Path::new("/data"), None).expect("map");
        assert_eq!(out[0].volume_arg(), "/data/logs:/var/log/app");
    }

    #[test]
    fn map_fails_on_first_malformed_entry() {
        let err = map_volumes(&["ok:/ok", "onlyonepart"], Path::new("/data"), None)
            .expect_err("malformed");
        assert!(err.to_string().contains("onlyonepart"));
    }
}
