//! Integration tests for supplier-graph rules.
//!
//! Exercises the structural checks (factory links, self-reference, cycle
//! closure) and level resolution through the public service API against an
//! in-memory database.

use electronet_core::{UnitId, UnitRole};
use electronet_directory::error::{DirectoryError, StructuralRule};
use electronet_directory::models::{SupplierPatch, UnitPatch};
use electronet_integration_tests::{TestDirectory, client_unit, new_unit};

// ============================================================================
// Level Resolution
// ============================================================================

#[tokio::test]
async fn test_levels_count_hops_to_the_root() {
    let dir = TestDirectory::new().await;

    let factory = dir
        .service
        .create_unit(new_unit("Factory A", UnitRole::Factory, "f@example.com"))
        .await
        .expect("Failed to create factory");
    let retail = dir
        .service
        .create_unit(client_unit(
            "Retail X",
            UnitRole::Retail,
            "r@example.com",
            factory.id,
            "100.00",
        ))
        .await
        .expect("Failed to create retail chain");
    let shop = dir
        .service
        .create_unit(client_unit(
            "IP Anna",
            UnitRole::SoleProprietor,
            "s@example.com",
            retail.id,
            "20.00",
        ))
        .await
        .expect("Failed to create sole proprietor");

    assert_eq!(dir.service.get_level(factory.id).await.expect("level"), 0);
    assert_eq!(dir.service.get_level(retail.id).await.expect("level"), 1);
    assert_eq!(dir.service.get_level(shop.id).await.expect("level"), 2);
}

#[tokio::test]
async fn test_reparenting_changes_the_level() {
    let dir = TestDirectory::new().await;

    let factory = dir
        .service
        .create_unit(new_unit("Factory A", UnitRole::Factory, "f@example.com"))
        .await
        .expect("Failed to create factory");
    let retail = dir
        .service
        .create_unit(client_unit(
            "Retail X",
            UnitRole::Retail,
            "r@example.com",
            factory.id,
            "0.00",
        ))
        .await
        .expect("Failed to create retail chain");
    let shop = dir
        .service
        .create_unit(client_unit(
            "IP Anna",
            UnitRole::SoleProprietor,
            "s@example.com",
            retail.id,
            "0.00",
        ))
        .await
        .expect("Failed to create sole proprietor");
    assert_eq!(dir.service.get_level(shop.id).await.expect("level"), 2);

    // Move the shop directly under the factory.
    dir.service
        .update_unit(
            shop.id,
            UnitPatch {
                supplier: SupplierPatch::Set(factory.id),
                ..UnitPatch::default()
            },
        )
        .await
        .expect("Failed to reparent");
    assert_eq!(dir.service.get_level(shop.id).await.expect("level"), 1);

    // Detach it entirely; it becomes a root of its own tree.
    dir.service
        .update_unit(
            shop.id,
            UnitPatch {
                supplier: SupplierPatch::Clear,
                ..UnitPatch::default()
            },
        )
        .await
        .expect("Failed to clear supplier");
    assert_eq!(dir.service.get_level(shop.id).await.expect("level"), 0);
}

#[tokio::test]
async fn test_level_of_missing_unit_is_not_found() {
    let dir = TestDirectory::new().await;

    let err = dir
        .service
        .get_level(UnitId::new(404))
        .await
        .expect_err("level of missing unit should fail");

    assert!(matches!(
        err,
        DirectoryError::NotFound {
            entity: "unit",
            id: 404
        }
    ));
}

// ============================================================================
// Structural Rules
// ============================================================================

#[tokio::test]
async fn test_factory_cannot_take_a_supplier() {
    let dir = TestDirectory::new().await;

    let factory = dir
        .service
        .create_unit(new_unit("Factory A", UnitRole::Factory, "f@example.com"))
        .await
        .expect("Failed to create factory");

    // Rejected on create.
    let err = dir
        .service
        .create_unit(client_unit(
            "Factory B",
            UnitRole::Factory,
            "f2@example.com",
            factory.id,
            "0.00",
        ))
        .await
        .expect_err("factory with supplier should be rejected");
    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::FactoryWithSupplier)
    ));

    // Rejected on update as well.
    let other = dir
        .service
        .create_unit(new_unit("Factory B", UnitRole::Factory, "f2@example.com"))
        .await
        .expect("Failed to create second factory");
    let err = dir
        .service
        .update_unit(
            other.id,
            UnitPatch {
                supplier: SupplierPatch::Set(factory.id),
                ..UnitPatch::default()
            },
        )
        .await
        .expect_err("factory update with supplier should be rejected");
    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::FactoryWithSupplier)
    ));
}

#[tokio::test]
async fn test_promoting_to_factory_requires_clearing_the_link() {
    let dir = TestDirectory::new().await;

    let factory = dir
        .service
        .create_unit(new_unit("Factory A", UnitRole::Factory, "f@example.com"))
        .await
        .expect("Failed to create factory");
    let retail = dir
        .service
        .create_unit(client_unit(
            "Retail X",
            UnitRole::Retail,
            "r@example.com",
            factory.id,
            "0.00",
        ))
        .await
        .expect("Failed to create retail chain");

    // Promoting a linked unit to factory must fail, not clear the link.
    let err = dir
        .service
        .update_unit(
            retail.id,
            UnitPatch {
                role: Some(UnitRole::Factory),
                ..UnitPatch::default()
            },
        )
        .await
        .expect_err("role change with live supplier link should be rejected");
    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::FactoryWithSupplier)
    ));

    // Clearing the link in the same patch makes the promotion legal.
    let promoted = dir
        .service
        .update_unit(
            retail.id,
            UnitPatch {
                role: Some(UnitRole::Factory),
                supplier: SupplierPatch::Clear,
                ..UnitPatch::default()
            },
        )
        .await
        .expect("promotion with cleared link should succeed");
    assert_eq!(promoted.role, UnitRole::Factory);
    assert_eq!(promoted.supplier_id, None);
}

#[tokio::test]
async fn test_unit_cannot_supply_itself() {
    let dir = TestDirectory::new().await;

    let retail = dir
        .service
        .create_unit(new_unit("Retail X", UnitRole::Retail, "r@example.com"))
        .await
        .expect("Failed to create retail chain");

    let err = dir
        .service
        .update_unit(
            retail.id,
            UnitPatch {
                supplier: SupplierPatch::Set(retail.id),
                ..UnitPatch::default()
            },
        )
        .await
        .expect_err("self-supply should be rejected");

    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::SelfReference)
    ));
}

#[tokio::test]
async fn test_two_node_cycle_is_rejected() {
    let dir = TestDirectory::new().await;

    let a = dir
        .service
        .create_unit(new_unit("Retail A", UnitRole::Retail, "a@example.com"))
        .await
        .expect("Failed to create unit a");
    let b = dir
        .service
        .create_unit(client_unit(
            "Retail B",
            UnitRole::Retail,
            "b@example.com",
            a.id,
            "0.00",
        ))
        .await
        .expect("Failed to create unit b");

    let err = dir
        .service
        .update_unit(
            a.id,
            UnitPatch {
                supplier: SupplierPatch::Set(b.id),
                ..UnitPatch::default()
            },
        )
        .await
        .expect_err("closing a two-node cycle should be rejected");

    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::SupplyCycle)
    ));
}

#[tokio::test]
async fn test_closing_a_longer_chain_is_rejected() {
    let dir = TestDirectory::new().await;

    let a = dir
        .service
        .create_unit(new_unit("Retail A", UnitRole::Retail, "a@example.com"))
        .await
        .expect("Failed to create unit a");
    let b = dir
        .service
        .create_unit(client_unit(
            "Retail B",
            UnitRole::Retail,
            "b@example.com",
            a.id,
            "0.00",
        ))
        .await
        .expect("Failed to create unit b");
    let c = dir
        .service
        .create_unit(client_unit(
            "IP C",
            UnitRole::SoleProprietor,
            "c@example.com",
            b.id,
            "0.00",
        ))
        .await
        .expect("Failed to create unit c");

    // a <- b <- c is fine; pointing a at c would close the loop.
    let err = dir
        .service
        .update_unit(
            a.id,
            UnitPatch {
                supplier: SupplierPatch::Set(c.id),
                ..UnitPatch::default()
            },
        )
        .await
        .expect_err("closing the chain should be rejected");

    assert!(matches!(
        err,
        DirectoryError::Structural(StructuralRule::SupplyCycle)
    ));

    // The rejected write left the graph untouched.
    let a_after = dir.service.get_unit(a.id).await.expect("unit a");
    assert_eq!(a_after.supplier_id, None);
}

#[tokio::test]
async fn test_supplier_must_exist() {
    let dir = TestDirectory::new().await;

    let err = dir
        .service
        .create_unit(client_unit(
            "Retail X",
            UnitRole::Retail,
            "r@example.com",
            UnitId::new(9999),
            "0.00",
        ))
        .await
        .expect_err("unknown supplier should be rejected");

    assert!(matches!(
        err,
        DirectoryError::NotFound {
            entity: "unit",
            id: 9999
        }
    ));
}

// ============================================================================
// Clients View
// ============================================================================

#[tokio::test]
async fn test_clients_list_the_direct_buyers_only() {
    let dir = TestDirectory::new().await;

    let factory = dir
        .service
        .create_unit(new_unit("Factory A", UnitRole::Factory, "f@example.com"))
        .await
        .expect("Failed to create factory");
    let retail = dir
        .service
        .create_unit(client_unit(
            "Retail X",
            UnitRole::Retail,
            "r@example.com",
            factory.id,
            "0.00",
        ))
        .await
        .expect("Failed to create retail chain");
    let anna = dir
        .service
        .create_unit(client_unit(
            "IP Anna",
            UnitRole::SoleProprietor,
            "anna@example.com",
            factory.id,
            "0.00",
        ))
        .await
        .expect("Failed to create IP Anna");
    let bob = dir
        .service
        .create_unit(client_unit(
            "IP Bob",
            UnitRole::SoleProprietor,
            "bob@example.com",
            retail.id,
            "0.00",
        ))
        .await
        .expect("Failed to create IP Bob");

    // Direct buyers only, ordered by name; Bob buys through Retail X and
    // does not appear under the factory.
    let clients = dir
        .service
        .list_clients(factory.id)
        .await
        .expect("clients of factory");
    let names: Vec<&str> = clients.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["IP Anna", "Retail X"]);

    let clients = dir
        .service
        .list_clients(retail.id)
        .await
        .expect("clients of retail");
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].id, bob.id);

    let clients = dir.service.list_clients(anna.id).await.expect("clients of leaf");
    assert!(clients.is_empty());
}

#[tokio::test]
async fn test_clients_of_missing_unit_is_not_found() {
    let dir = TestDirectory::new().await;

    let err = dir
        .service
        .list_clients(UnitId::new(31))
        .await
        .expect_err("clients of missing unit should fail");

    assert!(matches!(
        err,
        DirectoryError::NotFound {
            entity: "unit",
            id: 31
        }
    ));
}
