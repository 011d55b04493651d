//! Core types for Electronet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod debt;
pub mod email;
pub mod id;
pub mod role;

pub use debt::{Debt, DebtError};
pub use email::{Email, EmailError};
pub use id::*;
pub use role::UnitRole;
