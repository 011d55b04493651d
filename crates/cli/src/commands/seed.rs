//! Seed the directory with demo data.
//!
//! Creates a small but complete supply chain: a product catalog, two
//! factories, two retail chains, and three sole proprietors with debts and
//! supplier links spanning levels 0 through 2.
//!
//! # Usage
//!
//! ```bash
//! # Load demo data into an empty directory
//! electronet seed
//!
//! # Wipe units and products first
//! electronet seed --reset
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `SQLite` connection string, defaults to
//!   `sqlite://electronet.db`
//!
//! Seeding is not idempotent: re-running against a populated directory fails
//! on the email uniqueness rule. Pass `--reset` to reload from scratch.

use chrono::NaiveDate;
use tracing::{info, warn};

use electronet_core::{Debt, Email, UnitRole};
use electronet_directory::config::Config;
use electronet_directory::db;
use electronet_directory::error::Result;
use electronet_directory::models::{NewProduct, NewUnit};
use electronet_directory::services::DirectoryService;
use sqlx::SqlitePool;

/// Load the demo dataset.
///
/// All writes go through [`DirectoryService`], so the demo data passes the
/// same hierarchy and uniqueness checks as production traffic.
///
/// # Errors
///
/// Returns an error if the database is unreachable or any record is rejected
/// by the directory rules.
pub async fn run(config: &Config, reset: bool) -> Result<()> {
    info!("Connecting to directory database...");
    let pool = db::create_pool(&config.database_url).await?;

    if reset {
        clear_directory(&pool).await?;
    }

    let service = DirectoryService::new(pool);

    info!("Creating products...");
    let tv = service
        .create_product(NewProduct {
            name: "Smart TV".to_owned(),
            model: "Q90".to_owned(),
            released_at: date(2024, 2, 15),
        })
        .await?;
    let phone = service
        .create_product(NewProduct {
            name: "Smartphone".to_owned(),
            model: "P12".to_owned(),
            released_at: date(2025, 6, 1),
        })
        .await?;
    let laptop = service
        .create_product(NewProduct {
            name: "Laptop".to_owned(),
            model: "L5 Pro".to_owned(),
            released_at: date(2023, 9, 10),
        })
        .await?;
    let tablet = service
        .create_product(NewProduct {
            name: "Tablet".to_owned(),
            model: "T10".to_owned(),
            released_at: date(2024, 11, 5),
        })
        .await?;
    let router = service
        .create_product(NewProduct {
            name: "Router".to_owned(),
            model: "R3000".to_owned(),
            released_at: date(2022, 5, 20),
        })
        .await?;

    info!("Creating factories (level 0)...");
    let factory_a = service
        .create_unit(NewUnit {
            name: "Factory A".to_owned(),
            role: UnitRole::Factory,
            email: Email::parse("factory.a@example.com")?,
            country: "DE".to_owned(),
            city: "Berlin".to_owned(),
            street: "Hauptstr".to_owned(),
            house_number: "1".to_owned(),
            supplier_id: None,
            debt: Debt::ZERO,
            product_ids: vec![tv.id, phone.id, laptop.id, tablet.id, router.id],
        })
        .await?;
    let factory_b = service
        .create_unit(NewUnit {
            name: "Factory B".to_owned(),
            role: UnitRole::Factory,
            email: Email::parse("factory.b@example.com")?,
            country: "PL".to_owned(),
            city: "Warsaw".to_owned(),
            street: "Koszykowa".to_owned(),
            house_number: "10".to_owned(),
            supplier_id: None,
            debt: Debt::ZERO,
            product_ids: vec![phone.id, laptop.id, router.id],
        })
        .await?;

    info!("Creating retail chains (level 1)...");
    let retail_x = service
        .create_unit(NewUnit {
            name: "Retail X".to_owned(),
            role: UnitRole::Retail,
            email: Email::parse("retail.x@example.com")?,
            country: "DE".to_owned(),
            city: "Munich".to_owned(),
            street: "Marienplatz".to_owned(),
            house_number: "7".to_owned(),
            supplier_id: Some(factory_a.id),
            debt: Debt::parse("120000.00")?,
            product_ids: vec![tv.id, laptop.id, router.id],
        })
        .await?;
    let retail_y = service
        .create_unit(NewUnit {
            name: "Retail Y".to_owned(),
            role: UnitRole::Retail,
            email: Email::parse("retail.y@example.com")?,
            country: "PL".to_owned(),
            city: "Gdansk".to_owned(),
            street: "Dluga".to_owned(),
            house_number: "5".to_owned(),
            supplier_id: Some(factory_b.id),
            debt: Debt::parse("80000.00")?,
            product_ids: vec![phone.id, tablet.id],
        })
        .await?;

    info!("Creating sole proprietors (levels 1 and 2)...");
    service
        .create_unit(NewUnit {
            name: "IP Anna".to_owned(),
            role: UnitRole::SoleProprietor,
            email: Email::parse("ip.anna@example.com")?,
            country: "DE".to_owned(),
            city: "Berlin".to_owned(),
            street: "Friedrichstr".to_owned(),
            house_number: "101".to_owned(),
            // Buys straight from the factory, so level 1.
            supplier_id: Some(factory_a.id),
            debt: Debt::parse("15000.50")?,
            product_ids: vec![tv.id, router.id],
        })
        .await?;
    service
        .create_unit(NewUnit {
            name: "IP Bob".to_owned(),
            role: UnitRole::SoleProprietor,
            email: Email::parse("ip.bob@example.com")?,
            country: "DE".to_owned(),
            city: "Munich".to_owned(),
            street: "Leopoldstr".to_owned(),
            house_number: "23".to_owned(),
            // Buys through a retail chain, so level 2.
            supplier_id: Some(retail_x.id),
            debt: Debt::parse("5200.00")?,
            product_ids: vec![laptop.id],
        })
        .await?;
    service
        .create_unit(NewUnit {
            name: "IP Chen".to_owned(),
            role: UnitRole::SoleProprietor,
            email: Email::parse("ip.chen@example.com")?,
            country: "PL".to_owned(),
            city: "Poznan".to_owned(),
            street: "Swiety Marcin".to_owned(),
            house_number: "12A".to_owned(),
            supplier_id: Some(retail_y.id),
            debt: Debt::ZERO,
            product_ids: vec![phone.id, tablet.id],
        })
        .await?;

    info!("Done! Demo data created.");
    Ok(())
}

/// Wipe units and products. Join rows cascade from both sides.
///
/// Supplier links are nulled first because the self-referencing foreign key
/// restricts deletes while a client still points at its supplier.
async fn clear_directory(pool: &SqlitePool) -> Result<()> {
    warn!("Clearing existing units and products...");
    sqlx::query("UPDATE units SET supplier_id = NULL")
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM units").execute(pool).await?;
    sqlx::query("DELETE FROM products").execute(pool).await?;
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}
