//! Link rewriting into the namespaced form
//!
//! A link only needs the target's raw name and the application name, so
//! services can be resolved in any order.

use crate::config::{BatchContext, ServiceSpec};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// `target` or `target:alias`, no whitespace, at most one colon
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:\s]+)(?::([^:\s]+))?$").unwrap());

/// A parsed link declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Raw name of the linked service
    pub target: String,
    /// Alias inside the dependent container, if declared
    pub alias: Option<String>,
}

impl LinkRef {
    /// Parse a `target[:alias]` token
    pub fn parse(token: &str) -> Result<Self, LinkError> {
        let caps = LINK_PATTERN
            .captures(token)
            .ok_or_else(|| LinkError::Malformed(token.to_string()))?;

        Ok(Self {
            target: caps[1].to_string(),
            alias: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }

    /// Rewrite as `{app}-{target}_1:{alias}`, defaulting the alias to the container name
    pub fn resolve(&self, ctx: &BatchContext) -> String {
        let container = ctx.container_name(&self.target);
        let alias = self.alias.as_deref().unwrap_or(&container);
        format!("{}:{}", container, alias)
    }
}

/// Resolve a single link token
pub fn resolve_link(token: &str, ctx: &BatchContext) -> Result<String, LinkError> {
    Ok(LinkRef::parse(token)?.resolve(ctx))
}

/// A service after namespacing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedService {
    /// Key in the definition
    pub raw_name: String,
    /// Value passed to `--name`
    pub container_name: String,
    /// Spec with namespaced name and rewritten links
    #[serde(flatten)]
    pub spec: ServiceSpec,
}

/// Namespace a service and rewrite all of its links
pub fn resolve_service(spec: ServiceSpec, ctx: &BatchContext) -> Result<ResolvedService, LinkError> {
    let links = spec
        .links
        .iter()
        .map(|token| resolve_link(token, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    let raw_name = spec.name.clone();
    Ok(ResolvedService {
        container_name: ctx.container_name(&raw_name),
        spec: ServiceSpec {
            name: ctx.service_name(&raw_name),
            links,
            ..spec
        },
        raw_name,
    })
}

/// Errors in link declarations
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Malformed link '{0}': expected 'service' or 'service:alias'")]
    Malformed(String),
}
