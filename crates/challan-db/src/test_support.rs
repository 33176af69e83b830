//! Shared fixtures for repository tests: an in-memory database plus a
//! seeded project with addresses, a product and a template.

use std::collections::HashMap;

use challan_core::money::Money;
use challan_core::types::{ShipmentLineItem, ShipmentParams, TaxRate, TaxType};

use crate::pool::{Database, DbConfig};
use crate::repository::project::NewProject;

/// Fresh in-memory database with migrations applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Creates a project with the given prefix, returning its id.
pub(crate) async fn seed_project(db: &Database, prefix: &str) -> i64 {
    db.projects()
        .create(NewProject {
            name: format!("Project {prefix}"),
            description: String::new(),
            dc_prefix: prefix.to_string(),
            created_by: 1,
        })
        .await
        .unwrap()
        .id
}

pub(crate) async fn seed_address(
    db: &Database,
    project_id: i64,
    address_type: &str,
    label: &str,
) -> i64 {
    sqlx::query(
        "INSERT INTO addresses (project_id, address_type, label, address_text) VALUES (?1, ?2, ?3, '')",
    )
    .bind(project_id)
    .bind(address_type)
    .bind(label)
    .execute(db.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_product(db: &Database, project_id: i64, name: &str) -> i64 {
    sqlx::query(
        "INSERT INTO products (project_id, item_name, hsn_code, uom, default_quantity) VALUES (?1, ?2, '8471', 'Nos', 2)",
    )
    .bind(project_id)
    .bind(name)
    .execute(db.pool())
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn seed_template(db: &Database, project_id: i64) -> i64 {
    sqlx::query("INSERT INTO dc_templates (project_id, name, purpose) VALUES (?1, 'Default', '')")
        .bind(project_id)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
}

/// A seeded project with everything a shipment submission references.
pub(crate) struct World {
    pub project_id: i64,
    pub template_id: i64,
    pub bill_from: i64,
    pub dispatch_from: i64,
    pub bill_to: i64,
    /// Three ship-to destinations.
    pub ship_tos: Vec<i64>,
    pub product_id: i64,
}

pub(crate) async fn seed_world(db: &Database) -> World {
    let project_id = seed_project(db, "SCP").await;
    let template_id = seed_template(db, project_id).await;
    let bill_from = seed_address(db, project_id, "bill_from", "Head Office").await;
    let dispatch_from = seed_address(db, project_id, "dispatch_from", "Warehouse").await;
    let bill_to = seed_address(db, project_id, "bill_to", "Department HQ").await;

    let mut ship_tos = Vec::new();
    for label in ["School A", "School B", "School C"] {
        ship_tos.push(seed_address(db, project_id, "ship_to", label).await);
    }

    let product_id = seed_product(db, project_id, "Desktop Computer").await;

    World {
        project_id,
        template_id,
        bill_from,
        dispatch_from,
        bill_to,
        ship_tos,
        product_id,
    }
}

/// A valid submission against the world: `num_sets` destinations, one
/// line item at 2 units per set, rate 1250.50, 18% GST, no serials.
pub(crate) fn sample_params(world: &World, num_sets: i64) -> ShipmentParams {
    let ship_tos = world.ship_tos[..num_sets as usize].to_vec();

    ShipmentParams {
        project_id: world.project_id,
        template_id: world.template_id,
        num_sets,
        challan_date: "2025-06-15".to_string(),
        tax_type: TaxType::CgstSgst,
        reverse_charge: false,
        transporter_name: "ABC Logistics".to_string(),
        vehicle_number: "AP09CD1234".to_string(),
        eway_bill_number: "EWB123456789".to_string(),
        docket_number: "DKT-42".to_string(),
        bill_from_address_id: world.bill_from,
        dispatch_from_address_id: world.dispatch_from,
        bill_to_address_id: world.bill_to,
        transit_ship_to_address_id: ship_tos[0],
        ship_to_address_ids: ship_tos,
        line_items: vec![ShipmentLineItem {
            product_id: world.product_id,
            quantity_per_set: 2,
            rate: Money::from_rupees(1250.50),
            tax_rate: TaxRate::from_bps(1800),
            serials: Vec::new(),
            assignments: HashMap::new(),
        }],
        created_by: 1,
    }
}
