//! Pagination envelope shared by the listing operations.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Sort direction for an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of rows matching the query, across all pages.
    pub total: u64,
    /// The limit the page was fetched with.
    pub limit: i64,
    /// The offset the page was fetched with.
    pub offset: i64,
}

impl<T> Page<T> {
    /// Returns true when no rows matched at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
