//! startup.yml loading, defaulting and template generation.
//!
//! Defaults policy:
//! - `deamon` (also accepted as `daemon`) defaults to true; when both keys
//!   are present `deamon` wins
//! - mount and port lists default to empty
//! - a key given with a null value behaves as if absent
//! - number and bool scalars in string fields are taken as their text
//! - unknown keys are ignored (logged at debug level)

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value as YamlValue;
use tracing::debug;

use crate::errors::{Result, StartupError};
use crate::volume::{map_volumes, select_sub_directory, PathMapping};

pub const DEFAULT_CONFIG_FILE: &str = "startup.yml";

const DEFAULT_TEMPLATE: &str = include_str!("../resource/default.startup.yml");

const KNOWN_KEYS: &[&str] = &[
    "containerName",
    "deamon",
    "daemon",
    "directoryMount",
    "configFileMount",
    "portMap",
    "volumeSubDirectory",
    "otherArguments",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    #[serde(deserialize_with = "scalar_text")]
    pub container_name: Option<String>,
    #[serde(rename = "deamon", alias = "daemon", deserialize_with = "daemon_flag")]
    pub daemon: bool,
    #[serde(deserialize_with = "scalar_list")]
    pub directory_mount: Vec<String>,
    #[serde(deserialize_with = "scalar_list")]
    pub config_file_mount: Vec<String>,
    #[serde(deserialize_with = "scalar_list")]
    pub port_map: Vec<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub volume_sub_directory: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub other_arguments: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            container_name: None,
            daemon: true,
            directory_mount: Vec::new(),
            config_file_mount: Vec::new(),
            port_map: Vec::new(),
            volume_sub_directory: None,
            other_arguments: None,
        }
    }
}

fn daemon_flag<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(true))
}

/// Text of a string, number or bool scalar; `80` in `portMap` is the port `"80"`.
fn scalar_to_string<E: serde::de::Error>(value: YamlValue) -> std::result::Result<String, E> {
    match value {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        other => Err(E::custom(format!(
            "invalid value {other:?}, expected a string, number or bool"
        ))),
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Option::<YamlValue>::deserialize(d)?
        .filter(|v| !v.is_null())
        .map(scalar_to_string)
        .transpose()
}

/// Sequence of scalars; a null value yields the empty list.
fn scalar_list<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    match Option::<YamlValue>::deserialize(d)? {
        None | Some(YamlValue::Null) => Ok(Vec::new()),
        Some(YamlValue::Sequence(items)) => items.into_iter().map(scalar_to_string).collect(),
        Some(other) => Err(D::Error::custom(format!(
            "invalid value {other:?}, expected a sequence"
        ))),
    }
}

impl Configuration {
    pub fn sub_directory(&self) -> Option<&str> {
        select_sub_directory(
            self.volume_sub_directory.as_deref(),
            self.container_name.as_deref(),
        )
    }

    pub fn file_mappings(&self, volume_root: &Path) -> Result<Vec<PathMapping>> {
        map_volumes(&self.config_file_mount, volume_root, self.sub_directory())
    }

    pub fn directory_mappings(&self, volume_root: &Path) -> Result<Vec<PathMapping>> {
        map_volumes(&self.directory_mount, volume_root, self.sub_directory())
    }
}

/// Decode a startup.yml document. Empty and `null` documents yield the defaults.
pub fn parse_config(content: &str) -> std::result::Result<Configuration, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Configuration::default());
    }
    let mut doc: YamlValue = serde_yaml::from_str(content)?;
    if let YamlValue::Mapping(map) = &mut doc {
        for key in map.keys() {
            if let YamlValue::String(k) = key {
                if !KNOWN_KEYS.contains(&k.as_str()) {
                    debug!(key = %k, "ignoring unknown config key");
                }
            }
        }
        if map.contains_key("deamon") && map.contains_key("daemon") {
            debug!("both deamon and daemon given; using deamon");
            map.remove("daemon");
        }
    }
    if doc.is_null() {
        return Ok(Configuration::default());
    }
    serde_yaml::from_value(doc)
}

pub fn config_file_name(config_file: Option<&str>) -> &str {
    config_file
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_CONFIG_FILE)
}

/// Load `<cwd>/<config_file>` (default `startup.yml`).
pub fn load_config(cwd: &Path, config_file: Option<&str>) -> Result<Configuration> {
    let name = config_file_name(config_file);
    let path = cwd.join(name);
    if !path.exists() {
        return Err(StartupError::NotFound {
            name: name.to_string(),
            path,
        });
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| StartupError::io(format!("cannot read {}", path.display()), e))?;
    let cfg = parse_config(&content).map_err(|source| StartupError::ConfigParse {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), ?cfg, "loaded config");
    Ok(cfg)
}

/// Write the default template to `<cwd>/<config_file>`; never overwrites.
pub fn init_config(cwd: &Path, config_file: Option<&str>) -> Result<PathBuf> {
    let name = config_file_name(config_file);
    let path = cwd.join(name);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(StartupError::AlreadyExists {
                name: name.to_string(),
                path,
            })
        }
        Err(e) => {
            return Err(StartupError::io(
                format!("cannot create {}", path.display()),
                e,
            ))
        }
    };
    file.write_all(DEFAULT_TEMPLATE.as_bytes())
        .map_err(|e| StartupError::io(format!("cannot write {}", path.display()), e))?;
    Ok(path)
}
