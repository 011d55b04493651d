//! CLI command implementations.

pub mod migrate;
pub mod notify;
pub mod seed;
