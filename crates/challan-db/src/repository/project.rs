//! # Project Repository
//!
//! Projects and their document-numbering settings.
//!
//! Only the numbering-relevant subset of project management lives here:
//! the sequence allocator and the orchestrator both need the prefix,
//! format template and padding before they can render a number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use challan_core::number::NumberFormat;
use challan_core::DEFAULT_NUMBER_FORMAT;

use crate::error::{DbError, DbResult};

/// A project row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Document-number prefix, e.g. `SCP` or `PWD/AP`. Empty until the
    /// operator configures it; numbering refuses to run without one.
    pub dc_prefix: String,
    pub dc_number_format: String,
    pub seq_padding: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub dc_prefix: String,
    pub created_by: i64,
}

/// The numbering settings the codec needs, resolved from a project row.
#[derive(Debug, Clone)]
pub struct NumberingSettings {
    pub prefix: String,
    pub format: NumberFormat,
}

/// Fetches numbering settings on any executor (pool or open transaction).
///
/// Errors: `NotFound` when the project does not exist, `PrefixNotSet`
/// when it has no prefix configured.
pub(crate) async fn fetch_numbering_settings<'e, E>(
    executor: E,
    project_id: i64,
) -> DbResult<NumberingSettings>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(String, String, i64)> = sqlx::query_as(
        "SELECT dc_prefix, dc_number_format, seq_padding FROM projects WHERE id = ?1",
    )
    .bind(project_id)
    .fetch_optional(executor)
    .await?;

    let (prefix, format, padding) = row.ok_or_else(|| DbError::not_found("Project", project_id))?;

    if prefix.is_empty() {
        return Err(DbError::PrefixNotSet(project_id));
    }

    Ok(NumberingSettings {
        prefix,
        format: NumberFormat {
            format,
            padding: padding.max(1) as usize,
        },
    })
}

/// Repository for project database operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    /// Creates a new ProjectRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProjectRepository { pool }
    }

    /// Creates a project with default numbering settings.
    pub async fn create(&self, new: NewProject) -> DbResult<Project> {
        debug!(name = %new.name, "Creating project");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, description, dc_prefix, dc_number_format, seq_padding, created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.dc_prefix)
        .bind(DEFAULT_NUMBER_FORMAT)
        .bind(challan_core::DEFAULT_SEQ_PADDING as i64)
        .bind(new.created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Gets a project by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Project> {
        let project: Option<Project> = sqlx::query_as(
            r#"
            SELECT id, name, description, dc_prefix, dc_number_format, seq_padding,
                   created_by, created_at, updated_at
            FROM projects
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        project.ok_or_else(|| DbError::not_found("Project", id))
    }

    /// Returns a project's numbering settings.
    pub async fn numbering_settings(&self, project_id: i64) -> DbResult<NumberingSettings> {
        fetch_numbering_settings(&self.pool, project_id).await
    }

    /// Updates a project's numbering settings.
    ///
    /// Changing the prefix or template affects future numbers only;
    /// issued documents keep the number they were born with.
    pub async fn update_numbering(
        &self,
        project_id: i64,
        prefix: &str,
        format: &str,
        padding: i64,
    ) -> DbResult<()> {
        debug!(project_id, prefix, "Updating numbering settings");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET dc_prefix = ?2, dc_number_format = ?3, seq_padding = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(project_id)
        .bind(prefix)
        .bind(format)
        .bind(padding.max(1))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", project_id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.projects();

        let project = repo
            .create(NewProject {
                name: "School Computers Phase 1".to_string(),
                description: String::new(),
                dc_prefix: "SCP".to_string(),
                created_by: 1,
            })
            .await
            .unwrap();

        assert_eq!(project.dc_prefix, "SCP");
        assert_eq!(project.seq_padding, 3);

        let fetched = repo.get_by_id(project.id).await.unwrap();
        assert_eq!(fetched.name, "School Computers Phase 1");
    }

    #[tokio::test]
    async fn test_get_missing_project() {
        let db = test_db().await;
        let err = db.projects().get_by_id(999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_numbering_settings_require_prefix() {
        let db = test_db().await;
        let repo = db.projects();

        let project = repo
            .create(NewProject {
                name: "No prefix yet".to_string(),
                description: String::new(),
                dc_prefix: String::new(),
                created_by: 1,
            })
            .await
            .unwrap();

        let err = repo.numbering_settings(project.id).await.unwrap_err();
        assert!(matches!(err, DbError::PrefixNotSet(_)));
    }

    #[tokio::test]
    async fn test_update_numbering() {
        let db = test_db().await;
        let repo = db.projects();

        let project = repo
            .create(NewProject {
                name: "P".to_string(),
                description: String::new(),
                dc_prefix: "SCP".to_string(),
                created_by: 1,
            })
            .await
            .unwrap();

        repo.update_numbering(project.id, "PWD/AP", "{PREFIX}/{FY}/{SEQ}", 4)
            .await
            .unwrap();

        let settings = repo.numbering_settings(project.id).await.unwrap();
        assert_eq!(settings.prefix, "PWD/AP");
        assert_eq!(settings.format.format, "{PREFIX}/{FY}/{SEQ}");
        assert_eq!(settings.format.padding, 4);

        let err = repo
            .update_numbering(999, "X", "{PREFIX}-{TYPE}-{FY}-{SEQ}", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
