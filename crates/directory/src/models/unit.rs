//! Unit domain models: the node record, operation inputs, and list queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use electronet_core::{Debt, Email, ProductId, UnitId, UnitRole};

use super::product::Product;
use super::page::{OrderDirection, DEFAULT_PAGE_SIZE};

/// One node in the supplier graph.
///
/// `level` is intentionally absent: depth is derived on demand via
/// `DirectoryService::get_level`, never stored on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Unique unit ID.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Structural role (factory, retail, sole proprietor).
    pub role: UnitRole,
    /// Contact email, stored normalized; unique across all units.
    pub email: Email,
    /// Postal address: country.
    pub country: String,
    /// Postal address: city.
    pub city: String,
    /// Postal address: street.
    pub street: String,
    /// Postal address: house number.
    pub house_number: String,
    /// The single optional upstream supplier.
    pub supplier_id: Option<UnitId>,
    /// Outstanding balance owed to the supplier.
    pub debt: Debt,
    /// Product catalog for this unit.
    pub products: Vec<Product>,
    /// When the unit was created. Set once, immutable.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a unit.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUnit {
    /// Display name.
    pub name: String,
    /// Structural role.
    pub role: UnitRole,
    /// Contact email.
    pub email: Email,
    /// Postal address: country.
    pub country: String,
    /// Postal address: city.
    pub city: String,
    /// Postal address: street.
    pub street: String,
    /// Postal address: house number.
    pub house_number: String,
    /// Optional upstream supplier.
    pub supplier_id: Option<UnitId>,
    /// Initial debt balance.
    #[serde(default)]
    pub debt: Debt,
    /// Products to attach to the catalog.
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

/// How an update treats the supplier link.
///
/// A plain `Option` cannot distinguish "leave it alone" from "clear it", so
/// the patch carries all three states explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupplierPatch {
    /// Keep the current supplier link.
    #[default]
    Keep,
    /// Remove the supplier link.
    Clear,
    /// Point the unit at a new supplier.
    Set(UnitId),
}

impl SupplierPatch {
    /// Resolve the patch against the currently stored link.
    #[must_use]
    pub const fn apply(&self, current: Option<UnitId>) -> Option<UnitId> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(id) => Some(*id),
        }
    }
}

/// Partial update for a unit. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UnitPatch {
    /// New display name.
    pub name: Option<String>,
    /// New structural role.
    pub role: Option<UnitRole>,
    /// New contact email.
    pub email: Option<Email>,
    /// New country.
    pub country: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New street.
    pub street: Option<String>,
    /// New house number.
    pub house_number: Option<String>,
    /// Supplier link change.
    pub supplier: SupplierPatch,
    /// New debt balance.
    pub debt: Option<Debt>,
    /// Replacement product catalog (the full set, not a delta).
    pub product_ids: Option<Vec<ProductId>>,
}

/// Sort key for unit listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOrder {
    #[default]
    Name,
    City,
    Country,
    CreatedAt,
}

impl UnitOrder {
    /// The column this key sorts by.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Country => "country",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Filter, ordering, and paging criteria for listing units.
#[derive(Debug, Clone)]
pub struct UnitQuery {
    /// Exact country match.
    pub country: Option<String>,
    /// Case-insensitive substring search over name, city, country, and email.
    pub search: Option<String>,
    /// Sort key.
    pub order: UnitOrder,
    /// Sort direction.
    pub direction: OrderDirection,
    /// Maximum number of results.
    pub limit: i64,
    /// Number of results to skip.
    pub offset: i64,
}

impl Default for UnitQuery {
    fn default() -> Self {
        Self {
            country: None,
            search: None,
            order: UnitOrder::default(),
            direction: OrderDirection::default(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}
