//! Definition file loading
//!
//! A definition maps service names to raw attribute mappings. Both the
//! classic fig layout (services at the top level) and the compose layout
//! (`version` plus a `services` section) are accepted.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

/// Raw service definitions, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Definition {
    /// Service name to raw attributes
    pub services: IndexMap<String, Value>,
}

impl Definition {
    /// Load a definition from a YAML file
    pub fn from_file(path: &str) -> Result<Self, DefinitionError> {
        let content = std::fs::read_to_string(path).map_err(|e| DefinitionError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a definition from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, DefinitionError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_yaml::from_str(content).map_err(DefinitionError::Parse)?;
        Self::from_value(value)
    }

    /// Build a definition from an already parsed document.
    ///
    /// Merge keys (`<<: *defaults`) are applied before services are read.
    pub fn from_value(mut value: Value) -> Result<Self, DefinitionError> {
        value.apply_merge().map_err(DefinitionError::Parse)?;

        let root = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(map) => map,
            _ => return Err(DefinitionError::NotAMapping),
        };

        let root = Self::compose_services(&root).unwrap_or(root);

        let mut services = IndexMap::with_capacity(root.len());
        for (key, attributes) in root {
            let name = match key {
                Value::String(name) => name,
                other => return Err(DefinitionError::InvalidServiceKey(describe_key(&other))),
            };
            services.insert(name, attributes);
        }

        Ok(Self { services })
    }

    /// The `services` section of a compose-style document, if this is one
    fn compose_services(root: &Mapping) -> Option<Mapping> {
        if !root.contains_key("version") {
            return None;
        }
        match root.get("services") {
            Some(Value::Mapping(services)) => Some(services.clone()),
            Some(Value::Null) => Some(Mapping::new()),
            _ => None,
        }
    }

    /// Number of services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Service names in declaration order
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Sequence(_) => "<sequence>".to_string(),
        Value::Mapping(_) => "<mapping>".to_string(),
        Value::Tagged(tagged) => format!("{}", tagged.tag),
        Value::String(s) => s.clone(),
    }
}

/// Errors that can occur when loading a definition
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("Failed to read definition file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse definition file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Definition must be a mapping of service names to attributes")]
    NotAMapping,

    #[error("Service names must be strings, found '{0}'")]
    InvalidServiceKey(String),
}
