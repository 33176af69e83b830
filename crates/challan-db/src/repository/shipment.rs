//! # Shipment Repository
//!
//! The shipment transaction orchestrator: one wizard submission becomes a
//! shipment group owning 1 transit challan + N official challans, all or
//! nothing.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  1. validate shape            (pure, nothing written)       │
//! │  2. validate serial semantics (pure, nothing written)       │
//! │  3. cross-project uniqueness  (read-only query)             │
//! │  4. BEGIN                                                   │
//! │  5. insert shipment group                                   │
//! │  6. allocate transit sequence → insert transit challan,     │
//! │     transit details, line items (qty × sets, paise          │
//! │     amounts), serial rows                                   │
//! │  7. per destination, in order: allocate official sequence   │
//! │     → insert official challan + line items (qty per set,    │
//! │     zero amounts, no serial rows)                           │
//! │  8. COMMIT                                                  │
//! │                                                             │
//! │  Any failure in 5–7 drops the transaction: every row AND    │
//! │  every sequence increment is rolled back together. No       │
//! │  number is ever burned by a failed submission.              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serial assignments per destination are validated in step 2 but not
//! persisted on official challans; only the transit challan owns serial
//! rows.

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use challan_core::fiscal_year::fiscal_year;
use challan_core::money::{line_amounts, LineAmounts};
use challan_core::number::format_with;
use challan_core::types::{DcStatus, DcType, ShipmentGroup, ShipmentParams, ShipmentResult};
use challan_core::validation::{parse_challan_date, validate_shipment};

use crate::error::{DbError, DbResult, ShipmentError};
use crate::repository::challan::ChallanRepository;
use crate::repository::project::fetch_numbering_settings;
use crate::repository::sequence::SequenceRepository;

/// Repository driving the shipment-creation transaction.
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    pool: SqlitePool,
}

impl ShipmentRepository {
    /// Creates a new ShipmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShipmentRepository { pool }
    }

    /// Creates a shipment group with 1 transit + N official challans in a
    /// single transaction.
    ///
    /// Validation failures and serial conflicts are reported before any
    /// row is written; transactional failures roll back every write,
    /// including the sequence allocations.
    pub async fn create_shipment_group(
        &self,
        params: ShipmentParams,
    ) -> Result<ShipmentResult, ShipmentError> {
        validate_shipment(&params)?;
        let challan_date = parse_challan_date(&params.challan_date)?;

        self.check_serial_conflicts(&params).await?;

        let result = self.insert_shipment_graph(&params, challan_date).await?;

        info!(
            group_id = result.group_id,
            transit = %result.transit_dc.dc_number,
            officials = result.official_dcs.len(),
            "Created shipment group"
        );

        Ok(result)
    }

    /// Gets a shipment group by id.
    pub async fn group_by_id(&self, group_id: i64) -> DbResult<ShipmentGroup> {
        let group: Option<ShipmentGroup> = sqlx::query_as(
            r#"
            SELECT id, project_id, template_id, num_sets, tax_type, reverse_charge,
                   status, created_by, created_at, updated_at
            FROM shipment_groups
            WHERE id = ?1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        group.ok_or_else(|| DbError::not_found("Shipment group", group_id))
    }

    /// Step 3: every supplied serial must be new to the project. Read-only
    /// and outside the transaction; the UNIQUE(project_id, serial_number)
    /// key re-checks inside it.
    async fn check_serial_conflicts(&self, params: &ShipmentParams) -> Result<(), ShipmentError> {
        let all_serials: Vec<String> = params
            .line_items
            .iter()
            .flat_map(|item| item.serials.iter().cloned())
            .collect();

        if all_serials.is_empty() {
            return Ok(());
        }

        let conflicts = ChallanRepository::new(self.pool.clone())
            .check_serials_in_project(params.project_id, &all_serials, None)
            .await
            .map_err(ShipmentError::Storage)?;

        // Fail fast with the first conflict for operator feedback.
        if let Some(conflict) = conflicts.into_iter().next() {
            return Err(ShipmentError::SerialConflict {
                serial: conflict.serial_number,
                dc_number: conflict.dc_number,
                product_name: conflict.product_name,
            });
        }

        Ok(())
    }

    /// Steps 4–8: the all-or-nothing insert graph.
    ///
    /// Dropping `tx` on any early return rolls everything back; commit is
    /// the last statement.
    async fn insert_shipment_graph(
        &self,
        params: &ShipmentParams,
        challan_date: NaiveDate,
    ) -> DbResult<ShipmentResult> {
        let mut tx = self.pool.begin().await?;

        let settings = fetch_numbering_settings(&mut *tx, params.project_id).await?;
        let fy = fiscal_year(challan_date);
        let now = Utc::now();

        // Shipment group
        let group = sqlx::query(
            r#"
            INSERT INTO shipment_groups (project_id, template_id, num_sets, tax_type, reverse_charge, status, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 'draft', ?6, ?7, ?7)
            "#,
        )
        .bind(params.project_id)
        .bind(params.template_id)
        .bind(params.num_sets)
        .bind(params.tax_type)
        .bind(params.reverse_charge)
        .bind(params.created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let group_id = group.last_insert_rowid();

        // Transit challan: total quantities, pricing, serial rows.
        let transit_seq =
            SequenceRepository::next_in_tx(&mut tx, params.project_id, DcType::Transit, &fy)
                .await?;
        let transit_number = format_with(
            &settings.format,
            &settings.prefix,
            &fy,
            DcType::Transit,
            transit_seq,
        );
        debug!(group_id, %transit_number, "Inserting transit challan");

        let transit_id = insert_challan(
            &mut tx,
            params,
            group_id,
            DcType::Transit,
            &transit_number,
            params.transit_ship_to_address_id,
            challan_date,
        )
        .await?;

        sqlx::query(
            r#"
            INSERT INTO dc_transit_details (dc_id, transporter_name, vehicle_number, eway_bill_number, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(transit_id)
        .bind(&params.transporter_name)
        .bind(&params.vehicle_number)
        .bind(&params.eway_bill_number)
        .bind(&params.docket_number)
        .execute(&mut *tx)
        .await?;

        for (index, item) in params.line_items.iter().enumerate() {
            let total_quantity = item.quantity_per_set * params.num_sets;
            let amounts = line_amounts(item.rate, total_quantity, item.tax_rate);

            let line_item_id = insert_line_item(
                &mut tx,
                transit_id,
                item.product_id,
                total_quantity,
                item.rate.paise(),
                item.tax_rate.bps() as i64,
                amounts,
                (index + 1) as i64,
            )
            .await?;

            for serial in &item.serials {
                sqlx::query(
                    r#"
                    INSERT INTO serial_numbers (project_id, line_item_id, product_id, serial_number, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(params.project_id)
                .bind(line_item_id)
                .bind(item.product_id)
                .bind(serial)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        // Official challans: one per destination, in submission order.
        // Quantities per set, no pricing, no serial rows.
        let mut official_ids = Vec::with_capacity(params.ship_to_address_ids.len());
        for &ship_to_id in &params.ship_to_address_ids {
            let seq =
                SequenceRepository::next_in_tx(&mut tx, params.project_id, DcType::Official, &fy)
                    .await?;
            let number = format_with(
                &settings.format,
                &settings.prefix,
                &fy,
                DcType::Official,
                seq,
            );

            let official_id = insert_challan(
                &mut tx,
                params,
                group_id,
                DcType::Official,
                &number,
                ship_to_id,
                challan_date,
            )
            .await?;

            for (index, item) in params.line_items.iter().enumerate() {
                insert_line_item(
                    &mut tx,
                    official_id,
                    item.product_id,
                    item.quantity_per_set,
                    0,
                    0,
                    LineAmounts::zero(),
                    (index + 1) as i64,
                )
                .await?;
            }

            official_ids.push(official_id);
        }

        tx.commit().await?;

        // Read the committed rows back so callers get exactly what was
        // persisted.
        let challans = ChallanRepository::new(self.pool.clone());
        let transit_dc = challans.get_by_id(transit_id).await?;
        let mut official_dcs = Vec::with_capacity(official_ids.len());
        for id in official_ids {
            official_dcs.push(challans.get_by_id(id).await?);
        }

        Ok(ShipmentResult {
            group_id,
            transit_dc,
            official_dcs,
        })
    }
}

/// Inserts one challan row and returns its id.
#[allow(clippy::too_many_arguments)]
async fn insert_challan(
    tx: &mut Transaction<'_, Sqlite>,
    params: &ShipmentParams,
    group_id: i64,
    dc_type: DcType,
    dc_number: &str,
    ship_to_address_id: i64,
    challan_date: NaiveDate,
) -> DbResult<i64> {
    let now = Utc::now();

    // Dispatch/bill-from references travel on the transit challan only.
    let (bill_from, dispatch_from) = match dc_type {
        DcType::Transit => (
            Some(params.bill_from_address_id),
            Some(params.dispatch_from_address_id),
        ),
        DcType::Official => (None, None),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO delivery_challans (
            project_id, dc_number, dc_type, status, template_id,
            bill_to_address_id, ship_to_address_id, challan_date, created_by,
            shipment_group_id, bill_from_address_id, dispatch_from_address_id,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
        "#,
    )
    .bind(params.project_id)
    .bind(dc_number)
    .bind(dc_type)
    .bind(DcStatus::Draft)
    .bind(params.template_id)
    .bind(params.bill_to_address_id)
    .bind(ship_to_address_id)
    .bind(challan_date)
    .bind(params.created_by)
    .bind(group_id)
    .bind(bill_from)
    .bind(dispatch_from)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts one line item row and returns its id.
#[allow(clippy::too_many_arguments)]
async fn insert_line_item(
    tx: &mut Transaction<'_, Sqlite>,
    dc_id: i64,
    product_id: i64,
    quantity: i64,
    rate_paise: i64,
    tax_rate_bps: i64,
    amounts: LineAmounts,
    line_order: i64,
) -> DbResult<i64> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO dc_line_items (
            dc_id, product_id, quantity, rate_paise, tax_rate_bps,
            taxable_paise, tax_paise, total_paise, line_order, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
        "#,
    )
    .bind(dc_id)
    .bind(product_id)
    .bind(quantity)
    .bind(rate_paise)
    .bind(tax_rate_bps)
    .bind(amounts.taxable.paise())
    .bind(amounts.tax.paise())
    .bind(amounts.total.paise())
    .bind(line_order)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

// =============================================================================
// Unit Tests
// =============================================================================
