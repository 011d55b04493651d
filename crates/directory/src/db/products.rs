//! Database operations for the product catalog.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use electronet_core::ProductId;

use crate::error::{DirectoryError, Result};
use crate::models::{NewProduct, Page, Product, ProductOrder, ProductQuery};

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    model: String,
    released_at: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            model: row.model,
            released_at: row.released_at,
            created_at: row.created_at,
        }
    }
}

/// Insert a product and return its generated ID.
///
/// # Errors
///
/// Returns `DirectoryError::Uniqueness` if the (name, model) pair is taken.
pub async fn insert(conn: &mut SqliteConnection, product: &NewProduct) -> Result<ProductId> {
    let result = sqlx::query(
        r#"
        INSERT INTO products (name, model, released_at, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&product.name)
    .bind(&product.model)
    .bind(product.released_at)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return DirectoryError::Uniqueness { field: "name and model" };
        }
        DirectoryError::Database(e)
    })?;

    Ok(ProductId::new(result.last_insert_rowid()))
}

/// Overwrite a product's stored fields with the given record.
///
/// # Errors
///
/// Returns `DirectoryError::NotFound` if the product does not exist and
/// `DirectoryError::Uniqueness` if the (name, model) pair is taken.
pub async fn update(conn: &mut SqliteConnection, product: &Product) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET name = ?, model = ?, released_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&product.name)
    .bind(&product.model)
    .bind(product.released_at)
    .bind(product.id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return DirectoryError::Uniqueness { field: "name and model" };
        }
        DirectoryError::Database(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(DirectoryError::product_not_found(product.id));
    }
    Ok(())
}

/// Fetch one product.
pub async fn get(conn: &mut SqliteConnection, id: ProductId) -> Result<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(
        r#"SELECT id, name, model, released_at, created_at FROM products WHERE id = ?"#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Product::from))
}

/// Delete a product. Unit assignments cascade away with it.
pub async fn delete(conn: &mut SqliteConnection, id: ProductId) -> Result<u64> {
    let result = sqlx::query(r#"DELETE FROM products WHERE id = ?"#)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Return the subset of `ids` that exist in the catalog.
///
/// Used to reject unit writes that reference unknown products before the
/// foreign key would fail with an unhelpful message.
pub async fn existing_ids(
    conn: &mut SqliteConnection,
    ids: &[ProductId],
) -> Result<Vec<ProductId>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT id FROM products WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids.iter().copied() {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");

    let found: Vec<i64> = builder.build_query_scalar().fetch_all(&mut *conn).await?;
    Ok(found.into_iter().map(ProductId::new).collect())
}

/// List products with filtering, search, ordering, and paging.
pub async fn list(conn: &mut SqliteConnection, query: &ProductQuery) -> Result<Page<Product>> {
    let mut count_builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count_builder, query);
    let total: i64 = count_builder
        .build_query_scalar()
        .fetch_one(&mut *conn)
        .await?;

    let mut builder: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT id, name, model, released_at, created_at FROM products");
    push_filters(&mut builder, query);
    // Name collisions fall back to model, the rest of the (name, model) key.
    if query.order == ProductOrder::Name {
        builder.push(format!(
            " ORDER BY name {}, model ASC, id ASC",
            query.direction.as_sql()
        ));
    } else {
        builder.push(format!(
            " ORDER BY {} {}, id ASC",
            query.order.column(),
            query.direction.as_sql()
        ));
    }
    builder.push(" LIMIT ");
    builder.push_bind(query.limit);
    builder.push(" OFFSET ");
    builder.push_bind(query.offset);

    let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    Ok(Page {
        items: rows.into_iter().map(Product::from).collect(),
        total: u64::try_from(total).unwrap_or(0),
        limit: query.limit,
        offset: query.offset,
    })
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ProductQuery) {
    let has_date = query.released_at.is_some();
    if let Some(released_at) = query.released_at {
        builder.push(" WHERE released_at = ");
        builder.push_bind(released_at);
    }
    if let Some(term) = &query.search {
        builder.push(if has_date { " AND (" } else { " WHERE (" });
        let pattern = super::units::like_pattern(term);
        builder.push("name LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(r#" ESCAPE '\' OR model LIKE "#);
        builder.push_bind(pattern);
        builder.push(r#" ESCAPE '\')"#);
    }
}
