//! # Challan Repository
//!
//! Reads, serial-conflict checks and lifecycle operations for delivery
//! challans.
//!
//! ## Challan Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CREATE (wizard or ad-hoc)                                  │
//! │     └── status: draft                                       │
//! │  ISSUE                                                      │
//! │     └── issue() → draft → issued                            │
//! │         transit challans need one serial per unit first     │
//! │  DELETE                                                     │
//! │     └── delete_draft() → serials, line items, transit       │
//! │         details and the challan go in one transaction;      │
//! │         issued challans are immutable                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use challan_core::types::{DcLineItem, DcStatus, DcTransitDetails, DcType, DeliveryChallan};

use crate::error::{DbError, DbResult};

/// Column list matching [`DeliveryChallan`]'s fields.
const CHALLAN_COLUMNS: &str = "id, project_id, dc_number, dc_type, status, template_id, \
     bill_to_address_id, ship_to_address_id, challan_date, issued_at, issued_by, created_by, \
     shipment_group_id, bill_from_address_id, dispatch_from_address_id, created_at, updated_at";

/// A serial number that already exists in the project, with its owning
/// document identified for operator feedback.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SerialConflict {
    pub serial_number: String,
    pub dc_id: i64,
    pub dc_number: String,
    pub dc_status: DcStatus,
    pub product_name: String,
}

/// Repository for delivery-challan database operations.
#[derive(Debug, Clone)]
pub struct ChallanRepository {
    pool: SqlitePool,
}

impl ChallanRepository {
    /// Creates a new ChallanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ChallanRepository { pool }
    }

    /// Gets a challan by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<DeliveryChallan> {
        let challan: Option<DeliveryChallan> = sqlx::query_as(&format!(
            "SELECT {CHALLAN_COLUMNS} FROM delivery_challans WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        challan.ok_or_else(|| DbError::not_found("Delivery challan", id))
    }

    /// Gets transit metadata for a challan, if any. Official challans
    /// have none.
    pub async fn transit_details(&self, dc_id: i64) -> DbResult<Option<DcTransitDetails>> {
        let details: Option<DcTransitDetails> = sqlx::query_as(
            r#"
            SELECT id, dc_id, transporter_name, vehicle_number, eway_bill_number, notes
            FROM dc_transit_details
            WHERE dc_id = ?1
            "#,
        )
        .bind(dc_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(details)
    }

    /// Gets all line items of a challan, in line order.
    pub async fn line_items(&self, dc_id: i64) -> DbResult<Vec<DcLineItem>> {
        let items: Vec<DcLineItem> = sqlx::query_as(
            r#"
            SELECT id, dc_id, product_id, quantity, rate_paise, tax_rate_bps,
                   taxable_paise, tax_paise, total_paise, line_order, created_at, updated_at
            FROM dc_line_items
            WHERE dc_id = ?1
            ORDER BY line_order
            "#,
        )
        .bind(dc_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the serial numbers attached to a line item.
    pub async fn serials_for_line_item(&self, line_item_id: i64) -> DbResult<Vec<String>> {
        let serials: Vec<String> = sqlx::query_scalar(
            "SELECT serial_number FROM serial_numbers WHERE line_item_id = ?1 ORDER BY id",
        )
        .bind(line_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(serials)
    }

    /// Lists a project's challans, optionally filtered by type.
    pub async fn list_by_project(
        &self,
        project_id: i64,
        dc_type: Option<DcType>,
    ) -> DbResult<Vec<DeliveryChallan>> {
        let challans: Vec<DeliveryChallan> = match dc_type {
            None => {
                sqlx::query_as(&format!(
                    "SELECT {CHALLAN_COLUMNS} FROM delivery_challans WHERE project_id = ?1 ORDER BY id DESC"
                ))
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(dc_type) => {
                sqlx::query_as(&format!(
                    "SELECT {CHALLAN_COLUMNS} FROM delivery_challans WHERE project_id = ?1 AND dc_type = ?2 ORDER BY id DESC"
                ))
                .bind(project_id)
                .bind(dc_type)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(challans)
    }

    /// Lists the challans of a shipment group, transit first.
    pub async fn list_by_group(&self, group_id: i64) -> DbResult<Vec<DeliveryChallan>> {
        let challans: Vec<DeliveryChallan> = sqlx::query_as(&format!(
            "SELECT {CHALLAN_COLUMNS} FROM delivery_challans WHERE shipment_group_id = ?1 ORDER BY id"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(challans)
    }

    /// Checks which of the given serials already exist in the project.
    ///
    /// Read-only; `exclude_dc` skips one document (re-validating an edit
    /// of an existing challan).
    pub async fn check_serials_in_project(
        &self,
        project_id: i64,
        serials: &[String],
        exclude_dc: Option<i64>,
    ) -> DbResult<Vec<SerialConflict>> {
        self.check_serials(project_id, None, serials, exclude_dc).await
    }

    /// Serial conflict check scoped to one product.
    pub async fn check_serials_by_product(
        &self,
        project_id: i64,
        product_id: i64,
        serials: &[String],
        exclude_dc: Option<i64>,
    ) -> DbResult<Vec<SerialConflict>> {
        self.check_serials(project_id, Some(product_id), serials, exclude_dc)
            .await
    }

    async fn check_serials(
        &self,
        project_id: i64,
        product_id: Option<i64>,
        serials: &[String],
        exclude_dc: Option<i64>,
    ) -> DbResult<Vec<SerialConflict>> {
        if serials.is_empty() {
            return Ok(Vec::new());
        }

        // Dynamic IN list; QueryBuilder keeps every serial a bind value.
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT sn.serial_number, dc.id AS dc_id, dc.dc_number, dc.status AS dc_status, \
                    p.item_name AS product_name \
             FROM serial_numbers sn \
             INNER JOIN dc_line_items li ON sn.line_item_id = li.id \
             INNER JOIN delivery_challans dc ON li.dc_id = dc.id \
             INNER JOIN products p ON li.product_id = p.id \
             WHERE sn.project_id = ",
        );
        builder.push_bind(project_id);

        if let Some(product_id) = product_id {
            builder.push(" AND sn.product_id = ");
            builder.push_bind(product_id);
        }

        builder.push(" AND sn.serial_number IN (");
        let mut separated = builder.separated(", ");
        for serial in serials {
            separated.push_bind(serial.as_str());
        }
        builder.push(")");

        if let Some(exclude_dc) = exclude_dc {
            builder.push(" AND dc.id != ");
            builder.push_bind(exclude_dc);
        }

        let conflicts = builder
            .build_query_as::<SerialConflict>()
            .fetch_all(&self.pool)
            .await?;

        Ok(conflicts)
    }

    /// Transitions a challan from draft to issued.
    ///
    /// Preconditions checked inside one transaction: the challan is a
    /// draft, has line items, and (for transit challans) every line item
    /// carries exactly one serial per unit.
    pub async fn issue(&self, dc_id: i64, user_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(DcType, DcStatus)> =
            sqlx::query_as("SELECT dc_type, status FROM delivery_challans WHERE id = ?1")
                .bind(dc_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (dc_type, status) = row.ok_or_else(|| DbError::not_found("Delivery challan", dc_id))?;

        if status != DcStatus::Draft {
            return Err(DbError::NotDraft { id: dc_id });
        }

        let items: Vec<(i64, i64)> =
            sqlx::query_as("SELECT id, quantity FROM dc_line_items WHERE dc_id = ?1")
                .bind(dc_id)
                .fetch_all(&mut *tx)
                .await?;
        if items.is_empty() {
            return Err(DbError::NoLineItems { id: dc_id });
        }

        // Serial coverage is required on transit challans only.
        if dc_type == DcType::Transit {
            for (line_item_id, quantity) in items {
                let count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM serial_numbers WHERE line_item_id = ?1")
                        .bind(line_item_id)
                        .fetch_one(&mut *tx)
                        .await?;
                if count != quantity {
                    return Err(DbError::SerialCountMismatch {
                        line_item_id,
                        expected: quantity,
                        got: count,
                    });
                }
            }
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE delivery_challans
            SET status = 'issued', issued_at = ?2, issued_by = ?3, updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(dc_id)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotDraft { id: dc_id });
        }

        tx.commit().await?;

        debug!(dc_id, user_id, "Issued challan");
        Ok(())
    }

    /// Deletes a draft challan and everything hanging off it.
    pub async fn delete_draft(&self, dc_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let status: Option<DcStatus> =
            sqlx::query_scalar("SELECT status FROM delivery_challans WHERE id = ?1")
                .bind(dc_id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status.ok_or_else(|| DbError::not_found("Delivery challan", dc_id))?;

        if status != DcStatus::Draft {
            return Err(DbError::NotDraft { id: dc_id });
        }

        sqlx::query(
            "DELETE FROM serial_numbers WHERE line_item_id IN (SELECT id FROM dc_line_items WHERE dc_id = ?1)",
        )
        .bind(dc_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM dc_line_items WHERE dc_id = ?1")
            .bind(dc_id)
            .execute(&mut *tx)
            .await?;

        // Official challans have no transit details row; deleting zero
        // rows is fine.
        sqlx::query("DELETE FROM dc_transit_details WHERE dc_id = ?1")
            .bind(dc_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM delivery_challans WHERE id = ?1")
            .bind(dc_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(dc_id, "Deleted draft challan");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_params, seed_world, test_db};

    #[tokio::test]
    async fn test_get_by_id_and_details() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let result = db
            .shipments()
            .create_shipment_group(sample_params(&world, 2))
            .await
            .unwrap();

        let repo = db.challans();
        let transit = repo.get_by_id(result.transit_dc.id).await.unwrap();
        assert_eq!(transit.dc_type, DcType::Transit);
        assert_eq!(transit.status, DcStatus::Draft);

        let details = repo.transit_details(transit.id).await.unwrap().unwrap();
        assert_eq!(details.transporter_name, "ABC Logistics");

        // Official challans carry no transit metadata.
        let official = &result.official_dcs[0];
        assert!(repo.transit_details(official.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_group_and_project() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let result = db
            .shipments()
            .create_shipment_group(sample_params(&world, 3))
            .await
            .unwrap();

        let repo = db.challans();
        let group = repo.list_by_group(result.group_id).await.unwrap();
        assert_eq!(group.len(), 4);

        let transits = repo
            .list_by_project(world.project_id, Some(DcType::Transit))
            .await
            .unwrap();
        assert_eq!(transits.len(), 1);

        let all = repo.list_by_project(world.project_id, None).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_check_serials_reports_owner() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let mut params = sample_params(&world, 1);
        params.line_items[0].serials = vec!["SN-100".into(), "SN-101".into()];
        let result = db.shipments().create_shipment_group(params).await.unwrap();

        let conflicts = db
            .challans()
            .check_serials_in_project(
                world.project_id,
                &["SN-101".to_string(), "SN-999".to_string()],
                None,
            )
            .await
            .unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].serial_number, "SN-101");
        assert_eq!(conflicts[0].dc_number, result.transit_dc.dc_number);

        // Excluding the owning document clears the conflict.
        let conflicts = db
            .challans()
            .check_serials_in_project(
                world.project_id,
                &["SN-101".to_string()],
                Some(result.transit_dc.id),
            )
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_issue_requires_serial_coverage_on_transit() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        // No serials supplied: transit issue must refuse.
        let result = db
            .shipments()
            .create_shipment_group(sample_params(&world, 1))
            .await
            .unwrap();

        let err = db
            .challans()
            .issue(result.transit_dc.id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SerialCountMismatch { .. }));

        // Official challans issue without serials.
        db.challans().issue(result.official_dcs[0].id, 1).await.unwrap();
        let official = db.challans().get_by_id(result.official_dcs[0].id).await.unwrap();
        assert_eq!(official.status, DcStatus::Issued);
        assert_eq!(official.issued_by, Some(1));

        // Issuing twice refuses.
        let err = db
            .challans()
            .issue(result.official_dcs[0].id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotDraft { .. }));
    }

    #[tokio::test]
    async fn test_issue_transit_with_full_serials() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let mut params = sample_params(&world, 1);
        params.line_items[0].serials = vec!["A1".into(), "A2".into()];
        let result = db.shipments().create_shipment_group(params).await.unwrap();

        db.challans().issue(result.transit_dc.id, 7).await.unwrap();
        let transit = db.challans().get_by_id(result.transit_dc.id).await.unwrap();
        assert_eq!(transit.status, DcStatus::Issued);
        assert!(transit.issued_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_draft_removes_the_whole_graph() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let mut params = sample_params(&world, 1);
        params.line_items[0].serials = vec!["B1".into(), "B2".into()];
        let result = db.shipments().create_shipment_group(params).await.unwrap();
        let transit_id = result.transit_dc.id;

        db.challans().delete_draft(transit_id).await.unwrap();

        assert!(matches!(
            db.challans().get_by_id(transit_id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        // The serials are free again.
        let conflicts = db
            .challans()
            .check_serials_in_project(world.project_id, &["B1".to_string()], None)
            .await
            .unwrap();
        assert!(conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_refuses_issued() {
        let db = test_db().await;
        let world = seed_world(&db).await;

        let result = db
            .shipments()
            .create_shipment_group(sample_params(&world, 1))
            .await
            .unwrap();
        let official_id = result.official_dcs[0].id;

        db.challans().issue(official_id, 1).await.unwrap();

        let err = db.challans().delete_draft(official_id).await.unwrap_err();
        assert!(matches!(err, DbError::NotDraft { .. }));
    }
}
