//! Batch translation and artifact persistence

pub mod translator;
pub mod writer;

pub use translator::*;
pub use writer::*;
