//! Link resolution and launch script rendering

pub mod clause;
pub mod links;
pub mod script;

pub use clause::CommandBuilder;
pub use links::*;
pub use script::*;
