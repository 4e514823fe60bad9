//! Batch translation - turns a whole definition into launch scripts

use crate::config::{is_valid_name, BatchContext, Definition, LinkPolicy, ServiceSpec};
use crate::render::{self, LaunchArtifact, LinkError, LinkRef, RenderError};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Translates every service of one definition under one batch context
pub struct Translator {
    definition: Definition,
    ctx: BatchContext,
}

/// A link naming a service that is not in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingLink {
    /// Service declaring the link
    pub service: String,
    /// Missing target
    pub target: String,
}

impl Display for DanglingLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.service, self.target)
    }
}

/// A service whose script could not be produced
#[derive(Debug, Serialize)]
pub struct ServiceFailure {
    pub service: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ServiceError,
}

/// Result of translating a batch
#[derive(Debug, Serialize)]
pub struct BatchOutput {
    /// Application name of the batch
    pub app: String,
    /// Scripts in definition order
    pub artifacts: Vec<LaunchArtifact>,
    /// Services that failed, in definition order
    pub failures: Vec<ServiceFailure>,
}

impl BatchOutput {
    /// True when every service produced a script
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Translator {
    pub fn new(definition: Definition, ctx: BatchContext) -> Self {
        Self { definition, ctx }
    }

    pub fn context(&self) -> &BatchContext {
        &self.ctx
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Decode every raw entry, in definition order
    fn specs(&self) -> Vec<ServiceSpec> {
        self.definition
            .services
            .iter()
            .map(|(name, raw)| ServiceSpec::from_value(name, raw))
            .collect()
    }

    /// Links whose target is missing from the definition.
    ///
    /// Malformed tokens are skipped here; they fail their own service.
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        self.find_dangling(&self.specs())
    }

    fn find_dangling(&self, specs: &[ServiceSpec]) -> Vec<DanglingLink> {
        specs
            .iter()
            .flat_map(|spec| {
                spec.links.iter().filter_map(move |token| {
                    let link = LinkRef::parse(token).ok()?;
                    if self.definition.contains(&link.target) {
                        None
                    } else {
                        Some(DanglingLink {
                            service: spec.name.clone(),
                            target: link.target,
                        })
                    }
                })
            })
            .collect()
    }

    /// Check batch-wide invariants before anything is rendered
    pub fn validate(&self) -> Result<(), TranslateError> {
        self.check_links(&self.specs())
    }

    fn check_links(&self, specs: &[ServiceSpec]) -> Result<(), TranslateError> {
        let dangling = self.find_dangling(specs);
        if dangling.is_empty() {
            return Ok(());
        }

        match self.ctx.link_policy {
            LinkPolicy::Strict => Err(TranslateError::DanglingLinks(dangling)),
            LinkPolicy::Lenient => {
                for link in &dangling {
                    log::warn!(
                        "Service '{}' links to '{}', which is not defined in this batch",
                        link.service,
                        link.target
                    );
                }
                Ok(())
            }
        }
    }

    /// Translate one service: name check, link resolution, rendering
    fn translate_service(&self, spec: ServiceSpec) -> Result<LaunchArtifact, ServiceError> {
        if !is_valid_name(&spec.name) {
            return Err(ServiceError::InvalidName(spec.name));
        }
        let resolved = render::resolve_service(spec, &self.ctx)?;
        let artifact = render::render(&resolved, &self.ctx)?;
        log::debug!("[{}] Rendered {}", resolved.raw_name, artifact.file_name);
        Ok(artifact)
    }

    /// Translate the whole batch.
    ///
    /// Fails only on batch-wide problems; a broken service is recorded in
    /// the output and does not affect its siblings.
    pub fn translate(&self) -> Result<BatchOutput, TranslateError> {
        let specs = self.specs();
        self.check_links(&specs)?;

        log::info!(
            "Translating {} services for application '{}'",
            self.definition.len(),
            self.ctx.app
        );

        let mut artifacts = Vec::with_capacity(self.definition.len());
        let mut failures = Vec::new();

        for spec in specs {
            let service = spec.name.clone();
            match self.translate_service(spec) {
                Ok(artifact) => artifacts.push(artifact),
                Err(error) => {
                    log::error!("[{}] {}", service, error);
                    failures.push(ServiceFailure { service, error });
                }
            }
        }

        Ok(BatchOutput {
            app: self.ctx.app.clone(),
            artifacts,
            failures,
        })
    }
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Errors that fail a single service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid service name '{0}': must match [a-zA-Z0-9][a-zA-Z0-9_.-]*")]
    InvalidName(String),

    #[error("{0}")]
    Link(#[from] LinkError),

    #[error("Cannot render script: {0}")]
    Render(#[from] RenderError),
}

/// Errors that fail the whole batch
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error(
        "Links to services missing from the definition: {}",
        .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    DanglingLinks(Vec<DanglingLink>),
}

/// Display the batch result in a human-readable format
impl Display for BatchOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Application: {}", self.app)?;
        writeln!(f)?;

        writeln!(f, "Scripts ({}):", self.artifacts.len())?;
        for artifact in &self.artifacts {
            write!(f, "  {}", artifact.file_name)?;
            if !artifact.service.spec.links.is_empty() {
                write!(f, "  links: {}", artifact.service.spec.links.join(", "))?;
            }
            writeln!(f)?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed services ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  {}: {}", failure.service, failure.error)?;
            }
        }

        Ok(())
    }
}
