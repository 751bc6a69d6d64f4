//! CLI command implementations

pub mod instruments;
pub mod perform;
pub mod render;
