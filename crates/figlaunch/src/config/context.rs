//! Batch-wide translation settings

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Names accepted by docker for containers: `[a-zA-Z0-9][a-zA-Z0-9_.-]*`
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").unwrap());

pub const DEFAULT_DOCKER: &str = "/usr/bin/docker";
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Check that a name can be embedded in a container name
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// What to do with links whose target is not part of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Reject the batch before anything is written
    #[default]
    Strict,
    /// Emit the link anyway; docker reports it when the script runs
    Lenient,
}

/// Read-only configuration shared by every service in one run
#[derive(Debug, Clone, Serialize)]
pub struct BatchContext {
    /// Application name used as namespace prefix
    pub app: String,
    /// Remote docker host passed as `-H`
    pub host: Option<String>,
    /// Generate scripts that can also run the container in the foreground
    pub interactive: bool,
    /// Shell started by the interactive branch
    pub shell: String,
    /// Docker binary invoked by the scripts
    pub docker: String,
    /// Handling of links to unknown services
    pub link_policy: LinkPolicy,
}

impl BatchContext {
    /// Create a context for the given application name
    pub fn new(app: impl Into<String>) -> Result<Self, ContextError> {
        let app = app.into();
        if app.is_empty() {
            return Err(ContextError::MissingAppName);
        }
        if !is_valid_name(&app) {
            return Err(ContextError::InvalidAppName(app));
        }

        Ok(Self {
            app,
            host: None,
            interactive: false,
            shell: DEFAULT_SHELL.to_string(),
            docker: DEFAULT_DOCKER.to_string(),
            link_policy: LinkPolicy::default(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_docker(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Namespaced service name: `{app}-{service}`
    pub fn service_name(&self, service: &str) -> String {
        format!("{}-{}", self.app, service)
    }

    /// Name of the first container of a service: `{app}-{service}_1`
    pub fn container_name(&self, service: &str) -> String {
        format!("{}_1", self.service_name(service))
    }

    /// File name of a service's launch script: `{app}-{service}.1.sh`
    pub fn script_name(&self, service: &str) -> String {
        format!("{}.1.sh", self.service_name(service))
    }
}

/// Errors in batch configuration
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Missing application name (use --app)")]
    MissingAppName,

    #[error("Invalid application name '{0}': must match [a-zA-Z0-9][a-zA-Z0-9_.-]*")]
    InvalidAppName(String),
}
