//! Electronet Directory - the supply-chain directory engine.
//!
//! This crate owns the supplier graph: units (factories, retail chains, sole
//! proprietors), their single optional supplier link, the product catalog, and
//! the rules that keep the graph a valid forest. Everything above it (HTTP
//! routing, auth, wire formats, schedulers) is a thin consumer of the
//! [`services::DirectoryService`] and [`services::NotificationService`] APIs.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`db`] - `SQLite` pool, embedded migrations, query helpers
//! - [`error`] - The [`error::DirectoryError`] taxonomy
//! - [`hierarchy`] - Pure supplier-graph validation and depth resolution
//! - [`models`] - Domain records and operation inputs
//! - [`services`] - The public operations (unit/product CRUD, debt scan)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod services;
