//! # Seed Data Generator
//!
//! Provisions a demo database for development: one project with
//! addresses, products and a template, then drives a full shipment
//! through the orchestrator so the challan listing has something to show.
//!
//! ## Usage
//! ```bash
//! # Default database path (./data/challan.db)
//! cargo run -p challan-db --bin seed
//!
//! # Custom path
//! cargo run -p challan-db --bin seed -- --db /tmp/demo.db
//! ```

use std::collections::HashMap;
use std::env;

use challan_core::money::Money;
use challan_core::types::{DcType, ShipmentLineItem, ShipmentParams, TaxRate, TaxType};
use challan_db::{Database, DbConfig, NewProject};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./data/challan.db".to_string());
    info!(path = %db_path, "Seeding demo database");

    if let Some(dir) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(dir)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let project = db
        .projects()
        .create(NewProject {
            name: "School Computers Phase 1".to_string(),
            description: "Demo project created by the seed binary".to_string(),
            dc_prefix: "SCP".to_string(),
            created_by: 1,
        })
        .await?;
    info!(project_id = project.id, prefix = %project.dc_prefix, "Created project");

    let bill_from = insert_address(&db, project.id, "bill_from", "Head Office, Hyderabad").await?;
    let dispatch_from = insert_address(&db, project.id, "dispatch_from", "Central Warehouse").await?;
    let bill_to = insert_address(&db, project.id, "bill_to", "Department of Education").await?;
    let school_a = insert_address(&db, project.id, "ship_to", "ZPHS Ameerpet").await?;
    let school_b = insert_address(&db, project.id, "ship_to", "ZPHS Kukatpally").await?;

    let template_id = insert_template(&db, project.id).await?;
    let desktop = insert_product(&db, project.id, "Desktop Computer", "8471").await?;
    let ups = insert_product(&db, project.id, "600VA UPS", "8504").await?;

    // Form preview, the way the wizard's first page would render it.
    let preview = db
        .numbering()
        .peek_next_number(project.id, DcType::Transit)
        .await?;
    info!(%preview, "Next transit number");

    let params = ShipmentParams {
        project_id: project.id,
        template_id,
        num_sets: 2,
        challan_date: "2026-08-07".to_string(),
        tax_type: TaxType::CgstSgst,
        reverse_charge: false,
        transporter_name: "Blue Dart Surface".to_string(),
        vehicle_number: "TS09UB7777".to_string(),
        eway_bill_number: "EWB001122334455".to_string(),
        docket_number: "BD-99812".to_string(),
        bill_from_address_id: bill_from,
        dispatch_from_address_id: dispatch_from,
        bill_to_address_id: bill_to,
        ship_to_address_ids: vec![school_a, school_b],
        transit_ship_to_address_id: school_a,
        line_items: vec![
            ShipmentLineItem {
                product_id: desktop,
                quantity_per_set: 2,
                rate: Money::from_rupees(32_500.00),
                tax_rate: TaxRate::from_bps(1800),
                serials: vec![
                    "DT-2608-0001".to_string(),
                    "DT-2608-0002".to_string(),
                    "DT-2608-0003".to_string(),
                    "DT-2608-0004".to_string(),
                ],
                assignments: HashMap::from([
                    (school_a, vec!["DT-2608-0001".to_string(), "DT-2608-0002".to_string()]),
                    (school_b, vec!["DT-2608-0003".to_string(), "DT-2608-0004".to_string()]),
                ]),
            },
            ShipmentLineItem {
                product_id: ups,
                quantity_per_set: 2,
                rate: Money::from_rupees(2_499.00),
                tax_rate: TaxRate::from_bps(1800),
                serials: Vec::new(),
                assignments: HashMap::new(),
            },
        ],
        created_by: 1,
    };

    let result = db.shipments().create_shipment_group(params).await?;

    info!(
        group_id = result.group_id,
        transit = %result.transit_dc.dc_number,
        "Shipment group created"
    );
    for dc in &result.official_dcs {
        info!(official = %dc.dc_number, ship_to = dc.ship_to_address_id, "Official challan");
    }

    db.close().await;
    Ok(())
}

fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}

async fn insert_address(
    db: &Database,
    project_id: i64,
    address_type: &str,
    label: &str,
) -> Result<i64, challan_db::DbError> {
    let id = sqlx::query(
        "INSERT INTO addresses (project_id, address_type, label, address_text) VALUES (?1, ?2, ?3, ?3)",
    )
    .bind(project_id)
    .bind(address_type)
    .bind(label)
    .execute(db.pool())
    .await
    .map_err(challan_db::DbError::from)?
    .last_insert_rowid();

    Ok(id)
}

async fn insert_template(db: &Database, project_id: i64) -> Result<i64, challan_db::DbError> {
    let id = sqlx::query(
        "INSERT INTO dc_templates (project_id, name, purpose) VALUES (?1, 'Standard dispatch', 'Supply and installation')",
    )
    .bind(project_id)
    .execute(db.pool())
    .await
    .map_err(challan_db::DbError::from)?
    .last_insert_rowid();

    Ok(id)
}

async fn insert_product(
    db: &Database,
    project_id: i64,
    name: &str,
    hsn: &str,
) -> Result<i64, challan_db::DbError> {
    let id = sqlx::query(
        "INSERT INTO products (project_id, item_name, hsn_code, uom, default_quantity) VALUES (?1, ?2, ?3, 'Nos', 2)",
    )
    .bind(project_id)
    .bind(name)
    .bind(hsn)
    .execute(db.pool())
    .await
    .map_err(challan_db::DbError::from)?
    .last_insert_rowid();

    Ok(id)
}
