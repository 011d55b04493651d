//! Database operations for units and their product assignments.
//!
//! Functions take `&mut SqliteConnection` so callers can compose them inside
//! a single transaction. The service layer owns transaction boundaries.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use electronet_core::{Debt, Email, ProductId, UnitId, UnitRole};

use crate::error::{DirectoryError, Result};
use crate::models::{NewUnit, Page, Product, Unit, UnitQuery};

/// Raw `units` row before conversion into the domain type.
#[derive(Debug, sqlx::FromRow)]
struct UnitRow {
    id: i64,
    name: String,
    role: String,
    email: String,
    country: String,
    city: String,
    street: String,
    house_number: String,
    supplier_id: Option<i64>,
    debt: String,
    created_at: DateTime<Utc>,
}

impl UnitRow {
    fn into_unit(self, products: Vec<Product>) -> Result<Unit> {
        let role = self.role.parse::<UnitRole>().map_err(|e| {
            DirectoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;
        let email = Email::parse(&self.email).map_err(|e| {
            DirectoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let debt = Debt::parse(&self.debt).map_err(|e| {
            DirectoryError::DataCorruption(format!("invalid debt in database: {e}"))
        })?;

        Ok(Unit {
            id: UnitId::new(self.id),
            name: self.name,
            role,
            email,
            country: self.country,
            city: self.city,
            street: self.street,
            house_number: self.house_number,
            supplier_id: self.supplier_id.map(UnitId::new),
            debt,
            products,
            created_at: self.created_at,
        })
    }
}

const UNIT_COLUMNS: &str =
    "id, name, role, email, country, city, street, house_number, supplier_id, debt, created_at";

/// Insert a unit and return its generated ID.
///
/// Product assignments are written separately via [`set_products`].
///
/// # Errors
///
/// Returns `DirectoryError::Uniqueness` if the normalized email is taken.
pub async fn insert(conn: &mut SqliteConnection, unit: &NewUnit) -> Result<UnitId> {
    let result = sqlx::query(
        r#"
        INSERT INTO units (name, role, email, country, city, street, house_number, supplier_id, debt, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&unit.name)
    .bind(unit.role.as_str())
    .bind(unit.email.as_str())
    .bind(&unit.country)
    .bind(&unit.city)
    .bind(&unit.street)
    .bind(&unit.house_number)
    .bind(unit.supplier_id)
    .bind(unit.debt.to_string())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return DirectoryError::Uniqueness { field: "email" };
        }
        DirectoryError::Database(e)
    })?;

    Ok(UnitId::new(result.last_insert_rowid()))
}

/// Overwrite a unit's stored fields with the given record.
///
/// # Errors
///
/// Returns `DirectoryError::NotFound` if the unit does not exist and
/// `DirectoryError::Uniqueness` if the normalized email is taken.
pub async fn update(conn: &mut SqliteConnection, unit: &Unit) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE units
        SET name = ?, role = ?, email = ?, country = ?, city = ?,
            street = ?, house_number = ?, supplier_id = ?, debt = ?
        WHERE id = ?
        "#,
    )
    .bind(&unit.name)
    .bind(unit.role.as_str())
    .bind(unit.email.as_str())
    .bind(&unit.country)
    .bind(&unit.city)
    .bind(&unit.street)
    .bind(&unit.house_number)
    .bind(unit.supplier_id)
    .bind(unit.debt.to_string())
    .bind(unit.id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return DirectoryError::Uniqueness { field: "email" };
        }
        DirectoryError::Database(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(DirectoryError::unit_not_found(unit.id));
    }
    Ok(())
}

/// Fetch one unit with its product catalog.
///
/// # Errors
///
/// Returns `DirectoryError::DataCorruption` if a stored value fails domain
/// conversion.
pub async fn get(conn: &mut SqliteConnection, id: UnitId) -> Result<Option<Unit>> {
    let sql = format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = ?");
    let row: Option<UnitRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let id = UnitId::new(row.id);
    let mut products = products_for(conn, &[id]).await?;
    let unit = row.into_unit(products.remove(&id).unwrap_or_default())?;
    Ok(Some(unit))
}

/// Whether a unit row exists.
pub async fn exists(conn: &mut SqliteConnection, id: UnitId) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(r#"SELECT 1 FROM units WHERE id = ?"#)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Delete a unit. Returns the number of rows removed.
///
/// The referential guard runs before this in the same transaction, so the
/// `ON DELETE RESTRICT` constraint is only a backstop here.
pub async fn delete(conn: &mut SqliteConnection, id: UnitId) -> Result<u64> {
    let result = sqlx::query(r#"DELETE FROM units WHERE id = ?"#)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Count the units that reference `id` as their supplier.
pub async fn client_count(conn: &mut SqliteConnection, id: UnitId) -> Result<u64> {
    let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM units WHERE supplier_id = ?"#)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Fetch the units that reference `id` as their supplier, with their
/// catalogs, ordered by name.
pub async fn clients(conn: &mut SqliteConnection, id: UnitId) -> Result<Vec<Unit>> {
    let sql = format!("SELECT {UNIT_COLUMNS} FROM units WHERE supplier_id = ? ORDER BY name, id");
    let rows: Vec<UnitRow> = sqlx::query_as(&sql).bind(id).fetch_all(&mut *conn).await?;

    let ids: Vec<UnitId> = rows.iter().map(|row| UnitId::new(row.id)).collect();
    let mut products = products_for(conn, &ids).await?;

    let mut units = Vec::with_capacity(rows.len());
    for row in rows {
        let unit_products = products.remove(&UnitId::new(row.id)).unwrap_or_default();
        units.push(row.into_unit(unit_products)?);
    }
    Ok(units)
}

/// Read the full supplier edge set in one query.
///
/// The hierarchy validator builds its graph from this snapshot inside the
/// mutating transaction.
pub async fn edge_snapshot(conn: &mut SqliteConnection) -> Result<Vec<(UnitId, Option<UnitId>)>> {
    let rows: Vec<(i64, Option<i64>)> = sqlx::query_as(r#"SELECT id, supplier_id FROM units"#)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, supplier)| (UnitId::new(id), supplier.map(UnitId::new)))
        .collect())
}

/// Replace a unit's product assignments with the given set.
pub async fn set_products(
    conn: &mut SqliteConnection,
    unit: UnitId,
    product_ids: &[ProductId],
) -> Result<()> {
    sqlx::query(r#"DELETE FROM unit_products WHERE unit_id = ?"#)
        .bind(unit)
        .execute(&mut *conn)
        .await?;

    for product in product_ids.iter().copied() {
        sqlx::query(r#"INSERT OR IGNORE INTO unit_products (unit_id, product_id) VALUES (?, ?)"#)
            .bind(unit)
            .bind(product)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Load product catalogs for a set of units, keyed by unit ID.
///
/// Products are ordered by name, then model.
pub async fn products_for(
    conn: &mut SqliteConnection,
    unit_ids: &[UnitId],
) -> Result<HashMap<UnitId, Vec<Product>>> {
    if unit_ids.is_empty() {
        return Ok(HashMap::new());
    }

    #[derive(sqlx::FromRow)]
    struct LinkedProductRow {
        unit_id: i64,
        id: i64,
        name: String,
        model: String,
        released_at: NaiveDate,
        created_at: DateTime<Utc>,
    }

    let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        r#"
        SELECT up.unit_id, p.id, p.name, p.model, p.released_at, p.created_at
        FROM unit_products up
        JOIN products p ON p.id = up.product_id
        WHERE up.unit_id IN (
        "#,
    );
    let mut separated = builder.separated(", ");
    for id in unit_ids.iter().copied() {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY p.name, p.model");

    let rows: Vec<LinkedProductRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut map: HashMap<UnitId, Vec<Product>> = HashMap::new();
    for row in rows {
        map.entry(UnitId::new(row.unit_id))
            .or_default()
            .push(Product {
                id: ProductId::new(row.id),
                name: row.name,
                model: row.model,
                released_at: row.released_at,
                created_at: row.created_at,
            });
    }
    Ok(map)
}

/// List units with filtering, search, ordering, and paging.
///
/// `total` on the returned page counts all rows matching the filters, not
/// just the returned slice.
pub async fn list(conn: &mut SqliteConnection, query: &UnitQuery) -> Result<Page<Unit>> {
    let mut count_builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM units");
    push_filters(&mut count_builder, query);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new(format!("SELECT {UNIT_COLUMNS} FROM units"));
    push_filters(&mut builder, query);
    builder.push(format!(
        " ORDER BY {} {}, id ASC",
        query.order.column(),
        query.direction.as_sql()
    ));
    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let rows: Vec<UnitRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let ids: Vec<UnitId> = rows.iter().map(|row| UnitId::new(row.id)).collect();
    let mut products = products_for(conn, &ids).await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let unit_products = products.remove(&UnitId::new(row.id)).unwrap_or_default();
        items.push(row.into_unit(unit_products)?);
    }

    Ok(Page {
        items,
        total: u64::try_from(total).unwrap_or(0),
        limit: query.limit,
        offset: query.offset,
    })
}

/// A unit selected by the debt notification scan.
#[derive(Debug, Clone)]
pub struct Debtor {
    /// Unit ID.
    pub id: UnitId,
    /// Unit display name.
    pub name: String,
    /// Where the notice is sent.
    pub email: Email,
    /// Outstanding balance at scan time.
    pub debt: Debt,
    /// Supplier display name, if the unit has a supplier.
    pub supplier_name: Option<String>,
}

/// Select every unit with an outstanding debt and a non-blank email.
///
/// The supplier name is resolved in the same query so message composition
/// needs no further lookups. Ordered by name for stable run output.
pub async fn debtors(conn: &mut SqliteConnection) -> Result<Vec<Debtor>> {
    #[derive(sqlx::FromRow)]
    struct DebtorRow {
        id: i64,
        name: String,
        email: String,
        debt: String,
        supplier_name: Option<String>,
    }

    let rows: Vec<DebtorRow> = sqlx::query_as(
        r#"
        SELECT u.id, u.name, u.email, u.debt, s.name AS supplier_name
        FROM units u
        LEFT JOIN units s ON s.id = u.supplier_id
        WHERE CAST(u.debt AS NUMERIC) > 0 AND TRIM(u.email) <> ''
        ORDER BY u.name, u.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            let email = Email::parse(&row.email).map_err(|e| {
                DirectoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;
            let debt = Debt::parse(&row.debt).map_err(|e| {
                DirectoryError::DataCorruption(format!("invalid debt in database: {e}"))
            })?;
            Ok(Debtor {
                id: UnitId::new(row.id),
                name: row.name,
                email,
                debt,
                supplier_name: row.supplier_name,
            })
        })
        .collect()
}

/// Zero out the debt of the given units. Returns the number of rows touched.
pub async fn clear_debt(conn: &mut SqliteConnection, ids: &[UnitId]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("UPDATE units SET debt = '0.00' WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids.iter().copied() {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let result = builder.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &UnitQuery) {
    let has_country = query.country.is_some();
    if let Some(country) = &query.country {
        builder.push(" WHERE country = ");
        builder.push_bind(country.clone());
    }
    if let Some(term) = &query.search {
        builder.push(if has_country { " AND (" } else { " WHERE (" });
        let pattern = like_pattern(term);
        let mut first = true;
        for column in ["name", "city", "country", "email"] {
            if !first {
                builder.push(" OR ");
            }
            builder.push(column);
            builder.push(" LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r#" ESCAPE '\'"#);
            first = false;
        }
        builder.push(")");
    }
}

/// Wrap a search term in `%` wildcards, escaping LIKE metacharacters so the
/// term is matched literally.
pub(super) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
