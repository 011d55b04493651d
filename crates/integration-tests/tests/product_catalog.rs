//! Integration tests for the product catalog.
//!
//! Covers the product lifecycle, the (name, model) uniqueness rule, listing
//! filters, and how deletion interacts with unit assignments.

use chrono::NaiveDate;
use electronet_core::{ProductId, UnitRole};
use electronet_directory::error::DirectoryError;
use electronet_directory::models::{
    NewProduct, OrderDirection, ProductOrder, ProductPatch, ProductQuery,
};
use electronet_integration_tests::{TestDirectory, new_product, new_unit};

fn released(name: &str, model: &str, year: i32, month: u32, day: u32) -> NewProduct {
    NewProduct {
        released_at: NaiveDate::from_ymd_opt(year, month, day).expect("valid date"),
        ..new_product(name, model)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_product_roundtrip() {
    let dir = TestDirectory::new().await;

    let created = dir
        .service
        .create_product(released("Smart TV", "Q90", 2024, 2, 15))
        .await
        .expect("Failed to create product");
    assert_eq!(created.name, "Smart TV");
    assert_eq!(created.model, "Q90");

    let fetched = dir
        .service
        .get_product(created.id)
        .await
        .expect("Failed to get product");
    assert_eq!(fetched.released_at, created.released_at);

    let renamed = dir
        .service
        .update_product(
            created.id,
            ProductPatch {
                model: Some("Q90B".to_owned()),
                ..ProductPatch::default()
            },
        )
        .await
        .expect("Failed to update product");
    assert_eq!(renamed.name, "Smart TV");
    assert_eq!(renamed.model, "Q90B");

    dir.service
        .delete_product(created.id)
        .await
        .expect("Failed to delete product");
    let err = dir
        .service
        .get_product(created.id)
        .await
        .expect_err("deleted product should be gone");
    assert!(matches!(
        err,
        DirectoryError::NotFound {
            entity: "product",
            ..
        }
    ));
}

#[tokio::test]
async fn test_missing_product_operations_are_not_found() {
    let dir = TestDirectory::new().await;
    let ghost = ProductId::new(9000);

    assert!(matches!(
        dir.service.get_product(ghost).await.expect_err("get"),
        DirectoryError::NotFound {
            entity: "product",
            id: 9000
        }
    ));
    assert!(matches!(
        dir.service.delete_product(ghost).await.expect_err("delete"),
        DirectoryError::NotFound {
            entity: "product",
            ..
        }
    ));
}

// ============================================================================
// Uniqueness
// ============================================================================

#[tokio::test]
async fn test_name_model_pair_is_unique() {
    let dir = TestDirectory::new().await;

    dir.service
        .create_product(new_product("Laptop", "L5 Pro"))
        .await
        .expect("Failed to create product");

    // The same name under a different model is a different product.
    dir.service
        .create_product(new_product("Laptop", "L7"))
        .await
        .expect("same name, different model should be accepted");

    let err = dir
        .service
        .create_product(new_product("Laptop", "L5 Pro"))
        .await
        .expect_err("exact duplicate should be rejected");
    assert!(matches!(err, DirectoryError::Uniqueness { .. }));
}

#[tokio::test]
async fn test_update_cannot_collide_with_an_existing_pair() {
    let dir = TestDirectory::new().await;

    dir.service
        .create_product(new_product("Router", "R3000"))
        .await
        .expect("Failed to create first product");
    let other = dir
        .service
        .create_product(new_product("Router", "R5000"))
        .await
        .expect("Failed to create second product");

    let err = dir
        .service
        .update_product(
            other.id,
            ProductPatch {
                model: Some("R3000".to_owned()),
                ..ProductPatch::default()
            },
        )
        .await
        .expect_err("renaming onto an existing pair should be rejected");

    assert!(matches!(err, DirectoryError::Uniqueness { .. }));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_filters_by_release_date() {
    let dir = TestDirectory::new().await;

    dir.service
        .create_product(released("Smart TV", "Q90", 2024, 2, 15))
        .await
        .expect("Failed to create product");
    dir.service
        .create_product(released("Tablet", "T10", 2024, 11, 5))
        .await
        .expect("Failed to create product");

    let page = dir
        .service
        .list_products(&ProductQuery {
            released_at: NaiveDate::from_ymd_opt(2024, 11, 5),
            ..ProductQuery::default()
        })
        .await
        .expect("Failed to list products");

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Tablet");
}

#[tokio::test]
async fn test_list_search_matches_name_and_model() {
    let dir = TestDirectory::new().await;

    dir.service
        .create_product(new_product("Laptop", "L5 Pro"))
        .await
        .expect("Failed to create product");
    dir.service
        .create_product(new_product("Smartphone", "P12"))
        .await
        .expect("Failed to create product");

    let by_name = dir
        .service
        .list_products(&ProductQuery {
            search: Some("lap".to_owned()),
            ..ProductQuery::default()
        })
        .await
        .expect("Failed to search by name");
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.items[0].name, "Laptop");

    let by_model = dir
        .service
        .list_products(&ProductQuery {
            search: Some("p12".to_owned()),
            ..ProductQuery::default()
        })
        .await
        .expect("Failed to search by model");
    assert_eq!(by_model.total, 1);
    assert_eq!(by_model.items[0].name, "Smartphone");
}

#[tokio::test]
async fn test_list_orders_by_release_date() {
    let dir = TestDirectory::new().await;

    dir.service
        .create_product(released("Router", "R3000", 2022, 5, 20))
        .await
        .expect("Failed to create product");
    dir.service
        .create_product(released("Smartphone", "P12", 2025, 6, 1))
        .await
        .expect("Failed to create product");
    dir.service
        .create_product(released("Smart TV", "Q90", 2024, 2, 15))
        .await
        .expect("Failed to create product");

    let page = dir
        .service
        .list_products(&ProductQuery {
            order: ProductOrder::ReleasedAt,
            direction: OrderDirection::Descending,
            ..ProductQuery::default()
        })
        .await
        .expect("Failed to list products");

    let names: Vec<&str> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Smartphone", "Smart TV", "Router"]);
}

// ============================================================================
// Interaction with Units
// ============================================================================

#[tokio::test]
async fn test_deleting_a_product_detaches_it_from_units() {
    let dir = TestDirectory::new().await;

    let laptop = dir
        .service
        .create_product(new_product("Laptop", "L5 Pro"))
        .await
        .expect("Failed to create product");
    let router = dir
        .service
        .create_product(new_product("Router", "R3000"))
        .await
        .expect("Failed to create product");

    let mut input = new_unit("Factory A", UnitRole::Factory, "f@example.com");
    input.product_ids = vec![laptop.id, router.id];
    let unit = dir
        .service
        .create_unit(input)
        .await
        .expect("Failed to create unit");
    assert_eq!(unit.products.len(), 2);

    dir.service
        .delete_product(laptop.id)
        .await
        .expect("Failed to delete product");

    // The unit survives; only the assignment is gone.
    let after = dir.service.get_unit(unit.id).await.expect("get unit");
    let names: Vec<&str> = after.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Router"]);
}

#[tokio::test]
async fn test_two_units_can_share_a_product() {
    let dir = TestDirectory::new().await;

    let laptop = dir
        .service
        .create_product(new_product("Laptop", "L5 Pro"))
        .await
        .expect("Failed to create product");

    let mut a = new_unit("Factory A", UnitRole::Factory, "a@example.com");
    a.product_ids = vec![laptop.id];
    let a = dir.service.create_unit(a).await.expect("create unit a");

    let mut b = new_unit("Factory B", UnitRole::Factory, "b@example.com");
    b.product_ids = vec![laptop.id];
    let b = dir.service.create_unit(b).await.expect("create unit b");

    assert_eq!(a.products.len(), 1);
    assert_eq!(b.products.len(), 1);
    assert_eq!(a.products[0].id, b.products[0].id);
}
