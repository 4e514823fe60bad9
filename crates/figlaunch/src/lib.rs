//! Figlaunch
//!
//! Turns a fig service definition into one standalone launch script per
//! service. No orchestrator is needed at runtime: each script pulls its
//! image, removes any stale container with the same name and starts a new
//! one.
//!
//! # Overview
//!
//! - Service names are namespaced by application: `web` in app `shop`
//!   becomes container `shop-web_1`, launched by `shop-web.1.sh`
//! - Links are rewritten to the namespaced container names
//! - Scripts can target a remote docker host
//! - Interactive mode adds a `-i` switch to the scripts for foreground runs
//!
//! # Example Definition
//!
//! ```yaml
//! db:
//!   image: postgres
//!   environment:
//!     POSTGRES_PASSWORD: secret
//!
//! web:
//!   image: shop/web
//!   command: bundle exec puma
//!   ports:
//!     - "80:3000"
//!   links:
//!     - db:database
//! ```
//!
//! # Library Usage
//!
//! ```
//! use figlaunch::{BatchContext, Definition, Translator};
//!
//! let definition = Definition::from_yaml("web:\n  image: nginx\n").unwrap();
//! let ctx = BatchContext::new("shop").unwrap();
//! let output = Translator::new(definition, ctx).translate().unwrap();
//!
//! assert_eq!(output.artifacts[0].file_name, "shop-web.1.sh");
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod render;
pub mod shell;

pub use batch::{
    ArtifactWriter, BatchOutput, DanglingLink, ServiceError, ServiceFailure, TranslateError,
    Translator, WriteError,
};
pub use cli::LaunchArgs;
pub use config::{
    BatchContext, ContextError, Definition, DefinitionError, LinkPolicy, ServiceSpec,
};
pub use render::{LaunchArtifact, LinkError, RenderError, ResolvedService, INTERACTIVE_FLAG};
