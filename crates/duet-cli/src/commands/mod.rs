//! CLI command implementations.

pub mod pots;
pub mod render;
pub mod store;
