//! Typed service model decoded from raw definition entries
//!
//! Decoding never fails: a field with an unexpected shape is logged and
//! treated as absent, so one sloppy entry cannot abort the whole batch.

use crate::shell;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// One service's declared launch intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    /// Service name (raw key, or namespaced once resolved)
    pub name: String,

    /// Image reference; empty means the entry did not declare one
    pub image: String,

    /// Command appended after the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Port mappings in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,

    /// Volume mounts in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,

    /// Environment variables (sorted by key)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// Link tokens: `service` or `service:alias`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,

    /// Environment files in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_files: Vec<String>,

    /// Run the container with extended privileges
    pub privileged: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_driver: Option<String>,

    /// Logging driver options (sorted by key)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub log_options: BTreeMap<String, String>,
}

impl ServiceSpec {
    /// Decode a raw definition entry.
    ///
    /// Unknown keys are ignored. An entry that is not a mapping yields a
    /// spec with only its name set.
    pub fn from_value(name: &str, raw: &Value) -> Self {
        let entry = RawEntry::new(name, raw);

        let (log_driver, log_options) = entry.logging();

        Self {
            name: name.to_string(),
            image: entry.string(&["image"]).unwrap_or_default(),
            command: entry.command(),
            ports: entry.strings(&["ports"]),
            volumes: entry.strings(&["volumes"]),
            environment: entry.environment(),
            links: entry.strings(&["links"]),
            env_files: entry.strings(&["env_file", "env_files"]),
            privileged: entry.present(&["privileged"]),
            hostname: entry.string(&["hostname"]),
            network: entry.string(&["net", "network_mode", "network"]),
            log_driver,
            log_options,
        }
    }
}

/// Borrowed view of one raw entry, carrying the service name for warnings
struct RawEntry<'a> {
    service: &'a str,
    map: Option<&'a Mapping>,
}

impl<'a> RawEntry<'a> {
    fn new(service: &'a str, raw: &'a Value) -> Self {
        let map = match raw {
            Value::Mapping(map) => Some(map),
            Value::Null => None,
            _ => {
                log::warn!(
                    "Service '{}': entry is not a mapping, ignoring its attributes",
                    service
                );
                None
            }
        };
        Self { service, map }
    }

    /// First present key out of a list of aliases
    fn get(&self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        let map = self.map?;
        keys.iter()
            .find_map(|key| map.get(*key).map(|value| (*key, value)))
    }

    fn warn_shape(&self, key: &str, expected: &str) {
        log::warn!(
            "Service '{}': field '{}' is not {}, treating it as empty",
            self.service,
            key,
            expected
        );
    }

    /// Legacy truthiness: any non-null value counts as set
    fn present(&self, keys: &[&'static str]) -> bool {
        matches!(self.get(keys), Some((_, value)) if !value.is_null())
    }

    fn string(&self, keys: &[&'static str]) -> Option<String> {
        let (key, value) = self.get(keys)?;
        if value.is_null() {
            return None;
        }
        match scalar_to_string(value) {
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s),
            None => {
                self.warn_shape(key, "a string");
                None
            }
        }
    }

    fn strings(&self, keys: &[&'static str]) -> Vec<String> {
        let Some((key, value)) = self.get(keys) else {
            return Vec::new();
        };

        match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| {
                    let s = scalar_to_string(item);
                    if s.is_none() {
                        log::warn!(
                            "Service '{}': skipping non-scalar entry in '{}'",
                            self.service,
                            key
                        );
                    }
                    s
                })
                .collect(),
            other => match scalar_to_string(other) {
                Some(s) => vec![s],
                None => {
                    self.warn_shape(key, "a list");
                    Vec::new()
                }
            },
        }
    }

    fn command(&self) -> Option<String> {
        let (key, value) = self.get(&["command"])?;

        let command = match value {
            Value::Null => return None,
            Value::Sequence(items) => {
                let mut tokens = Vec::with_capacity(items.len());
                for item in items {
                    match scalar_to_string(item) {
                        Some(token) => tokens.push(shell::quote(&token).into_owned()),
                        None => {
                            self.warn_shape(key, "a string or a list of strings");
                            return None;
                        }
                    }
                }
                tokens.join(" ")
            }
            other => match scalar_to_string(other) {
                // Folded block scalars may carry newlines; scripts need one line
                Some(s) => s.lines().map(str::trim).collect::<Vec<_>>().join(" "),
                None => {
                    self.warn_shape(key, "a string or a list of strings");
                    return None;
                }
            },
        };

        let command = command.trim().to_string();
        if command.is_empty() {
            None
        } else {
            Some(command)
        }
    }

    /// `environment` as a mapping or as a list of `KEY=VALUE` strings
    fn environment(&self) -> BTreeMap<String, String> {
        let Some((key, value)) = self.get(&["environment"]) else {
            return BTreeMap::new();
        };

        match value {
            Value::Null => BTreeMap::new(),
            Value::Mapping(map) => self.string_map(key, map),
            Value::Sequence(items) => items
                .iter()
                .filter_map(|item| match scalar_to_string(item) {
                    Some(pair) => Some(split_pair(&pair)),
                    None => {
                        log::warn!(
                            "Service '{}': skipping non-scalar entry in '{}'",
                            self.service,
                            key
                        );
                        None
                    }
                })
                .collect(),
            _ => {
                self.warn_shape(key, "a mapping or a list");
                BTreeMap::new()
            }
        }
    }

    /// Logging driver and options, from `log_driver`/`log_opt` or a `logging` block
    fn logging(&self) -> (Option<String>, BTreeMap<String, String>) {
        if let Some((key, value)) = self.get(&["logging"]) {
            return match value {
                Value::Mapping(block) => {
                    let nested = RawEntry {
                        service: self.service,
                        map: Some(block),
                    };
                    let options = match nested.get(&["options"]) {
                        Some((options_key, Value::Mapping(map))) => {
                            self.string_map(options_key, map)
                        }
                        Some((_, Value::Null)) | None => BTreeMap::new(),
                        Some((options_key, _)) => {
                            self.warn_shape(options_key, "a mapping");
                            BTreeMap::new()
                        }
                    };
                    (nested.string(&["driver"]), options)
                }
                Value::Null => (None, BTreeMap::new()),
                _ => {
                    self.warn_shape(key, "a mapping");
                    (None, BTreeMap::new())
                }
            };
        }

        let options = match self.get(&["log_opt", "log_options"]) {
            Some((_, Value::Mapping(map))) => self.string_map("log_opt", map),
            Some((_, Value::Null)) | None => BTreeMap::new(),
            Some((key, _)) => {
                self.warn_shape(key, "a mapping");
                BTreeMap::new()
            }
        };
        (self.string(&["log_driver"]), options)
    }

    fn string_map(&self, key: &str, map: &Mapping) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (k, v) in map {
            let entry = scalar_to_string(k).and_then(|k| {
                let v = if v.is_null() {
                    Some(String::new())
                } else {
                    scalar_to_string(v)
                };
                v.map(|v| (k, v))
            });
            match entry {
                Some((k, v)) => {
                    out.insert(k, v);
                }
                None => log::warn!(
                    "Service '{}': skipping non-scalar entry in '{}'",
                    self.service,
                    key
                ),
            }
        }
        out
    }
}

/// Render a YAML scalar as text; `None` for nulls and collections
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split `KEY=VALUE`; a bare `KEY` maps to an empty value
fn split_pair(pair: &str) -> (String, String) {
    match pair.split_once('=') {
        Some((k, v)) => (k.to_string(), v.to_string()),
        None => (pair.to_string(), String::new()),
    }
}
