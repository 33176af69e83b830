//! # Numbering Repository
//!
//! The function-level numbering contracts consumed by form handlers:
//! read-only previews and single ad-hoc allocations. The shipment
//! orchestrator bypasses this and drives the allocator inside its own
//! transaction.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use challan_core::fiscal_year::fiscal_year;
use challan_core::number::format_with;
use challan_core::types::DcType;

use crate::error::{DbError, DbResult};
use crate::repository::project::fetch_numbering_settings;
use crate::repository::sequence::SequenceRepository;

/// Repository for document-number generation.
#[derive(Debug, Clone)]
pub struct NumberingRepository {
    pool: SqlitePool,
}

impl NumberingRepository {
    /// Creates a new NumberingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NumberingRepository { pool }
    }

    /// Returns what the next document number would be WITHOUT incrementing
    /// the sequence.
    ///
    /// Advisory only - the value can be stale by the time a real
    /// allocation happens. Used to pre-fill creation forms.
    pub async fn peek_next_number(&self, project_id: i64, dc_type: DcType) -> DbResult<String> {
        let settings = fetch_numbering_settings(&self.pool, project_id).await?;
        let fy = fiscal_year(Utc::now().date_naive());

        let next = SequenceRepository::new(self.pool.clone())
            .peek(project_id, dc_type, &fy)
            .await?;

        Ok(format_with(&settings.format, &settings.prefix, &fy, dc_type, next))
    }

    /// Allocates and formats a document number for today.
    ///
    /// For ad-hoc single-document creation outside the wizard; wraps its
    /// own one-step transaction.
    pub async fn generate_number(&self, project_id: i64, dc_type: DcType) -> DbResult<String> {
        self.generate_number_for_date(project_id, dc_type, Utc::now().date_naive())
            .await
    }

    /// Allocates and formats a document number using a specific date for
    /// the fiscal-year key.
    pub async fn generate_number_for_date(
        &self,
        project_id: i64,
        dc_type: DcType,
        date: NaiveDate,
    ) -> DbResult<String> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let settings = fetch_numbering_settings(&mut *tx, project_id).await?;
        let fy = fiscal_year(date);

        let sequence = SequenceRepository::next_in_tx(&mut tx, project_id, dc_type, &fy).await?;

        tx.commit().await.map_err(DbError::from)?;

        let number = format_with(&settings.format, &settings.prefix, &fy, dc_type, sequence);
        debug!(project_id, %dc_type, %number, "Generated document number");

        Ok(number)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
