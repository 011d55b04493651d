//! Integration tests for Electronet.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p electronet-integration-tests
//! ```
//!
//! Every test runs against its own in-memory `SQLite` database with the full
//! migration set applied, so no external services are required.
//!
//! # Test Categories
//!
//! - `unit_hierarchy` - Supplier-graph rules and level resolution
//! - `unit_crud` - Unit lifecycle, uniqueness, listing
//! - `product_catalog` - Product lifecycle and assignments
//! - `debt_notifications` - The notification scan end to end

#![cfg_attr(not(test), forbid(unsafe_code))]

use sqlx::SqlitePool;

use electronet_core::{Debt, Email, UnitId, UnitRole};
use electronet_directory::db;
use electronet_directory::models::{NewProduct, NewUnit};
use electronet_directory::services::DirectoryService;

/// A fresh, fully migrated in-memory directory.
pub struct TestDirectory {
    pub service: DirectoryService,
    pub pool: SqlitePool,
}

impl TestDirectory {
    /// Create an empty directory backed by its own in-memory database.
    pub async fn new() -> Self {
        let pool = db::connect_in_memory()
            .await
            .expect("Failed to create in-memory database");
        Self {
            service: DirectoryService::new(pool.clone()),
            pool,
        }
    }
}

/// Build a `NewUnit` with placeholder address data and no supplier, debt,
/// or products.
pub fn new_unit(name: &str, role: UnitRole, email: &str) -> NewUnit {
    NewUnit {
        name: name.to_owned(),
        role,
        email: Email::parse(email).expect("valid test email"),
        country: "DE".to_owned(),
        city: "Berlin".to_owned(),
        street: "Hauptstr".to_owned(),
        house_number: "1".to_owned(),
        supplier_id: None,
        debt: Debt::ZERO,
        product_ids: Vec::new(),
    }
}

/// Build a `NewUnit` linked to a supplier with an outstanding balance.
pub fn client_unit(
    name: &str,
    role: UnitRole,
    email: &str,
    supplier: UnitId,
    debt: &str,
) -> NewUnit {
    NewUnit {
        supplier_id: Some(supplier),
        debt: Debt::parse(debt).expect("valid test debt"),
        ..new_unit(name, role, email)
    }
}

/// Build a `NewProduct` with a fixed release date.
pub fn new_product(name: &str, model: &str) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        model: model.to_owned(),
        released_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
    }
}
