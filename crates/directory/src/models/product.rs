//! Product domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use electronet_core::ProductId;

use super::page::{OrderDirection, DEFAULT_PAGE_SIZE};

/// A catalog product. Identity is the (name, model) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Model designation.
    pub model: String,
    /// Market release date.
    pub released_at: NaiveDate,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    /// Product name.
    pub name: String,
    /// Model designation.
    pub model: String,
    /// Market release date.
    pub released_at: NaiveDate,
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    /// New product name.
    pub name: Option<String>,
    /// New model designation.
    pub model: Option<String>,
    /// New release date.
    pub released_at: Option<NaiveDate>,
}

/// Sort key for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductOrder {
    #[default]
    Name,
    Model,
    ReleasedAt,
}

impl ProductOrder {
    /// The column this key sorts by.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Model => "model",
            Self::ReleasedAt => "released_at",
        }
    }
}

/// Filter, ordering, and paging criteria for listing products.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// Exact release-date match.
    pub released_at: Option<NaiveDate>,
    /// Case-insensitive substring search over name and model.
    pub search: Option<String>,
    /// Sort key.
    pub order: ProductOrder,
    /// Sort direction.
    pub direction: OrderDirection,
    /// Maximum number of results.
    pub limit: i64,
    /// Number of results to skip.
    pub offset: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            released_at: None,
            search: None,
            order: ProductOrder::default(),
            direction: OrderDirection::default(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}
