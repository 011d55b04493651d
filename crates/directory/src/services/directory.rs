//! Directory service: validated unit and product operations.
//!
//! Every mutation validates against a snapshot taken inside its own
//! transaction and commits in that same transaction, so an invalid graph
//! never becomes observable, even momentarily.

use std::collections::HashSet;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{error, info, instrument};

use electronet_core::{ProductId, UnitId, UnitRole};

use crate::db::{products, units};
use crate::error::{DirectoryError, Result};
use crate::hierarchy::SupplierGraph;
use crate::models::{
    NewProduct, NewUnit, Page, Product, ProductPatch, ProductQuery, Unit, UnitPatch, UnitQuery,
};

/// Service for unit and product operations.
///
/// Cheap to clone; holds only the connection pool.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    pool: SqlitePool,
}

impl DirectoryService {
    /// Create a new directory service.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a unit.
    ///
    /// The supplier link is validated against a snapshot of the whole edge
    /// set, and the insert commits in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `Structural` for hierarchy violations, `Uniqueness` for a
    /// taken email, and `NotFound` for an unknown supplier or product ID.
    #[instrument(skip(self, new), fields(name = %new.name, role = %new.role))]
    pub async fn create_unit(&self, new: NewUnit) -> Result<Unit> {
        let mut tx = self.pool.begin().await?;

        let graph = SupplierGraph::from_edges(units::edge_snapshot(&mut tx).await?);
        check_link(&graph, None, new.role, new.supplier_id)?;
        ensure_products_exist(&mut tx, &new.product_ids).await?;

        let id = units::insert(&mut tx, &new).await?;
        units::set_products(&mut tx, id, &new.product_ids).await?;
        let unit = units::get(&mut tx, id)
            .await?
            .ok_or(DirectoryError::unit_not_found(id))?;

        tx.commit().await?;
        info!(unit = %unit.id, "Created unit");
        Ok(unit)
    }

    /// Apply a partial update to a unit.
    ///
    /// The patch is merged over the stored record, then the merged state is
    /// validated and written, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown unit, `Structural` for hierarchy
    /// violations, and `Uniqueness` for a taken email.
    #[instrument(skip(self, patch))]
    pub async fn update_unit(&self, id: UnitId, patch: UnitPatch) -> Result<Unit> {
        let mut tx = self.pool.begin().await?;

        let mut unit = units::get(&mut tx, id)
            .await?
            .ok_or(DirectoryError::unit_not_found(id))?;

        if let Some(name) = patch.name {
            unit.name = name;
        }
        if let Some(role) = patch.role {
            unit.role = role;
        }
        if let Some(email) = patch.email {
            unit.email = email;
        }
        if let Some(country) = patch.country {
            unit.country = country;
        }
        if let Some(city) = patch.city {
            unit.city = city;
        }
        if let Some(street) = patch.street {
            unit.street = street;
        }
        if let Some(house_number) = patch.house_number {
            unit.house_number = house_number;
        }
        unit.supplier_id = patch.supplier.apply(unit.supplier_id);
        if let Some(debt) = patch.debt {
            unit.debt = debt;
        }

        let graph = SupplierGraph::from_edges(units::edge_snapshot(&mut tx).await?);
        check_link(&graph, Some(id), unit.role, unit.supplier_id)?;

        if let Some(product_ids) = &patch.product_ids {
            ensure_products_exist(&mut tx, product_ids).await?;
        }

        units::update(&mut tx, &unit).await?;
        if let Some(product_ids) = &patch.product_ids {
            units::set_products(&mut tx, id, product_ids).await?;
        }

        let unit = units::get(&mut tx, id)
            .await?
            .ok_or(DirectoryError::unit_not_found(id))?;

        tx.commit().await?;
        info!(unit = %id, "Updated unit");
        Ok(unit)
    }

    /// Delete a unit.
    ///
    /// Blocked while any other unit references it as supplier. The client
    /// check and the delete run in one transaction, so a client created
    /// concurrently cannot slip past the guard.
    ///
    /// # Errors
    ///
    /// Returns `Referential` while clients reference the unit, and
    /// `NotFound` for an unknown unit.
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, id: UnitId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let clients = units::client_count(&mut tx, id).await?;
        if clients > 0 {
            return Err(DirectoryError::Referential { clients });
        }

        let removed = units::delete(&mut tx, id).await?;
        if removed == 0 {
            return Err(DirectoryError::unit_not_found(id));
        }

        tx.commit().await?;
        info!(unit = %id, "Deleted unit");
        Ok(())
    }

    /// Fetch one unit with its product catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown unit.
    pub async fn get_unit(&self, id: UnitId) -> Result<Unit> {
        let mut conn = self.pool.acquire().await?;
        units::get(&mut conn, id)
            .await?
            .ok_or(DirectoryError::unit_not_found(id))
    }

    /// Resolve a unit's hierarchy level: supplier hops to its root.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown unit and `IntegrityBoundExceeded`
    /// if the walk overruns the unit count, which means the stored graph is
    /// corrupt.
    #[instrument(skip(self))]
    pub async fn get_level(&self, id: UnitId) -> Result<u32> {
        let mut conn = self.pool.acquire().await?;
        let graph = SupplierGraph::from_edges(units::edge_snapshot(&mut conn).await?);
        graph.depth_of(id).inspect_err(log_integrity_breach)
    }

    /// List the units that buy directly from `id`: the reverse side of the
    /// supplier link, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown unit.
    #[instrument(skip(self))]
    pub async fn list_clients(&self, id: UnitId) -> Result<Vec<Unit>> {
        let mut conn = self.pool.acquire().await?;
        if !units::exists(&mut conn, id).await? {
            return Err(DirectoryError::unit_not_found(id));
        }
        units::clients(&mut conn, id).await
    }

    /// List units with filtering, search, ordering, and paging.
    #[instrument(skip(self, query))]
    pub async fn list_units(&self, query: &UnitQuery) -> Result<Page<Unit>> {
        let mut conn = self.pool.acquire().await?;
        units::list(&mut conn, query).await
    }

    /// Zero out the debt of the given units. Returns how many were touched.
    #[instrument(skip(self, ids), fields(units = ids.len()))]
    pub async fn clear_debt(&self, ids: &[UnitId]) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        let cleared = units::clear_debt(&mut conn, ids).await?;
        info!(cleared, "Cleared debt");
        Ok(cleared)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `Uniqueness` if the (name, model) pair is taken.
    #[instrument(skip(self, new), fields(name = %new.name, model = %new.model))]
    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let mut tx = self.pool.begin().await?;

        let id = products::insert(&mut tx, &new).await?;
        let product = products::get(&mut tx, id)
            .await?
            .ok_or(DirectoryError::product_not_found(id))?;

        tx.commit().await?;
        info!(product = %product.id, "Created product");
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown product and `Uniqueness` if the
    /// (name, model) pair is taken.
    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        let mut tx = self.pool.begin().await?;

        let mut product = products::get(&mut tx, id)
            .await?
            .ok_or(DirectoryError::product_not_found(id))?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(model) = patch.model {
            product.model = model;
        }
        if let Some(released_at) = patch.released_at {
            product.released_at = released_at;
        }

        products::update(&mut tx, &product).await?;

        tx.commit().await?;
        info!(product = %id, "Updated product");
        Ok(product)
    }

    /// Delete a product, detaching it from every unit's catalog.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let removed = products::delete(&mut tx, id).await?;
        if removed == 0 {
            return Err(DirectoryError::product_not_found(id));
        }

        tx.commit().await?;
        info!(product = %id, "Deleted product");
        Ok(())
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown product.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        let mut conn = self.pool.acquire().await?;
        products::get(&mut conn, id)
            .await?
            .ok_or(DirectoryError::product_not_found(id))
    }

    /// List products with filtering, search, ordering, and paging.
    #[instrument(skip(self, query))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        let mut conn = self.pool.acquire().await?;
        products::list(&mut conn, query).await
    }
}

/// Validate a supplier link against the snapshot, logging the alerting case.
fn check_link(
    graph: &SupplierGraph,
    unit: Option<UnitId>,
    role: UnitRole,
    supplier: Option<UnitId>,
) -> Result<()> {
    graph
        .validate_link(unit, role, supplier)
        .inspect_err(log_integrity_breach)
}

/// A walk overrunning the unit count means the no-cycle invariant was broken
/// out-of-band. That is an alerting condition, not a validation rejection.
fn log_integrity_breach(err: &DirectoryError) {
    if matches!(err, DirectoryError::IntegrityBoundExceeded { .. }) {
        error!(error = %err, "Supplier graph integrity is broken");
    }
}

/// Reject unknown product references before the foreign key would fail with
/// an unhelpful message.
async fn ensure_products_exist(conn: &mut SqliteConnection, ids: &[ProductId]) -> Result<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let found: HashSet<ProductId> = products::existing_ids(conn, ids).await?.into_iter().collect();
    for id in ids.iter().copied() {
        if !found.contains(&id) {
            return Err(DirectoryError::product_not_found(id));
        }
    }
    Ok(())
}
