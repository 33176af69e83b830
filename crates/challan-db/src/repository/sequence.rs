//! # Sequence Allocator
//!
//! Gap-free, collision-free document-number sequences keyed by
//! (project, document type, fiscal year).
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  next_in_tx: ONE statement, inside the caller's txn         │
//! │                                                             │
//! │  INSERT ... VALUES (key, 2)          ← first allocation     │
//! │  ON CONFLICT (key)                                          │
//! │  DO UPDATE SET next_sequence += 1    ← every later one      │
//! │  RETURNING next_sequence - 1         ← the value issued     │
//! │                                                             │
//! │  Read-and-increment is a single storage operation: two      │
//! │  racing transactions cannot both observe the same value.    │
//! │  Rolling back the caller's transaction undoes the           │
//! │  increment, so failed shipments never burn numbers.         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `peek` never mutates and is advisory only: the value it reports can be
//! stale by the time a real allocation happens.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use challan_core::types::DcType;

use crate::error::DbResult;

/// Repository for sequence-counter operations.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Atomically allocates the next sequence for a key, inside the
    /// caller's ambient transaction.
    ///
    /// The counter row stores the NEXT value to issue, so a fresh key is
    /// inserted at 2 and the value handed back is 1. There is no
    /// transaction here on purpose: commit/rollback belongs to the
    /// caller, and rollback must undo the increment together with
    /// everything else.
    pub async fn next_in_tx(
        conn: &mut SqliteConnection,
        project_id: i64,
        dc_type: DcType,
        fiscal_year: &str,
    ) -> DbResult<i64> {
        let now = Utc::now();

        let sequence: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO dc_number_sequences (project_id, dc_type, financial_year, next_sequence, created_at, updated_at)
            VALUES (?1, ?2, ?3, 2, ?4, ?4)
            ON CONFLICT (project_id, dc_type, financial_year)
            DO UPDATE SET next_sequence = next_sequence + 1, updated_at = ?4
            RETURNING next_sequence - 1
            "#,
        )
        .bind(project_id)
        .bind(dc_type)
        .bind(fiscal_year)
        .bind(now)
        .fetch_one(conn)
        .await?;

        debug!(project_id, %dc_type, fiscal_year, sequence, "Allocated sequence");

        Ok(sequence)
    }

    /// Returns what the next allocation for a key would yield, without
    /// mutating state.
    ///
    /// Never a reservation; for UI previews only.
    pub async fn peek(
        &self,
        project_id: i64,
        dc_type: DcType,
        fiscal_year: &str,
    ) -> DbResult<i64> {
        let next: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT next_sequence FROM dc_number_sequences
            WHERE project_id = ?1 AND dc_type = ?2 AND financial_year = ?3
            "#,
        )
        .bind(project_id)
        .bind(dc_type)
        .bind(fiscal_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(next.unwrap_or(1))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test_support::{seed_project, test_db};

    /// Allocates once in its own committed transaction.
    async fn allocate(pool: &SqlitePool, project_id: i64, dc_type: DcType, fy: &str) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let seq = SequenceRepository::next_in_tx(&mut tx, project_id, dc_type, fy)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        seq
    }

    #[tokio::test]
    async fn test_sequences_start_at_one_and_are_contiguous() {
        let db = test_db().await;
        let project_id = seed_project(&db, "SCP").await;

        for expected in 1..=10i64 {
            let seq = allocate(db.pool(), project_id, DcType::Transit, "2526").await;
            assert_eq!(seq, expected);
        }
    }

    #[tokio::test]
    async fn test_peek_does_not_reserve() {
        let db = test_db().await;
        let project_id = seed_project(&db, "SCP").await;
        let repo = db.sequences();

        // Nothing allocated yet: peek reports 1 and keeps reporting it.
        assert_eq!(repo.peek(project_id, DcType::Transit, "2526").await.unwrap(), 1);
        assert_eq!(repo.peek(project_id, DcType::Transit, "2526").await.unwrap(), 1);

        allocate(db.pool(), project_id, DcType::Transit, "2526").await;
        assert_eq!(repo.peek(project_id, DcType::Transit, "2526").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = test_db().await;
        let project_a = seed_project(&db, "AAA").await;
        let project_b = seed_project(&db, "BBB").await;

        // Same project, different types.
        assert_eq!(allocate(db.pool(), project_a, DcType::Transit, "2526").await, 1);
        assert_eq!(allocate(db.pool(), project_a, DcType::Official, "2526").await, 1);
        assert_eq!(allocate(db.pool(), project_a, DcType::Transit, "2526").await, 2);

        // Different project, same type.
        assert_eq!(allocate(db.pool(), project_b, DcType::Transit, "2526").await, 1);
    }

    #[tokio::test]
    async fn test_fiscal_year_rollover_starts_fresh() {
        let db = test_db().await;
        let project_id = seed_project(&db, "SCP").await;

        for _ in 0..5 {
            allocate(db.pool(), project_id, DcType::Transit, "2425").await;
        }

        // Crossing April 1 keys a fresh counter.
        assert_eq!(allocate(db.pool(), project_id, DcType::Transit, "2526").await, 1);
        // The old year's counter is untouched.
        assert_eq!(allocate(db.pool(), project_id, DcType::Transit, "2425").await, 6);
    }

    #[tokio::test]
    async fn test_rollback_undoes_the_increment() {
        let db = test_db().await;
        let project_id = seed_project(&db, "SCP").await;

        {
            let mut tx = db.pool().begin().await.unwrap();
            let seq = SequenceRepository::next_in_tx(&mut tx, project_id, DcType::Transit, "2526")
                .await
                .unwrap();
            assert_eq!(seq, 1);
            tx.rollback().await.unwrap();
        }

        // The rolled-back allocation left no gap.
        assert_eq!(allocate(db.pool(), project_id, DcType::Transit, "2526").await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_yield_distinct_contiguous_values() {
        let db = test_db().await;
        let project_id = seed_project(&db, "SCP").await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let pool = db.pool().clone();
            handles.push(tokio::spawn(async move {
                let mut tx = pool.begin().await.unwrap();
                let seq =
                    SequenceRepository::next_in_tx(&mut tx, project_id, DcType::Transit, "2526")
                        .await
                        .unwrap();
                tx.commit().await.unwrap();
                seq
            }));
        }

        let mut seen = BTreeSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()), "duplicate sequence issued");
        }

        let expected: BTreeSet<i64> = (1..=50).collect();
        assert_eq!(seen, expected);
    }
}
