//! Electronet Core - Shared domain types.
//!
//! This crate provides the common types used across all Electronet components:
//! - `directory` - The supply-chain directory engine (storage, hierarchy rules,
//!   debt notifications)
//! - `cli` - Command-line tools for migrations, seeding, and one-shot jobs
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no SMTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, debt balances, and
//!   the unit role enumeration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
