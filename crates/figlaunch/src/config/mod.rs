//! Definition loading, the typed service model and batch settings

mod context;
mod definition;
mod service;

pub use context::*;
pub use definition::*;
pub use service::*;
