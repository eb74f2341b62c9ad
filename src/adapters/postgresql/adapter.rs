//! PostgreSQL adapter implementing the organization store
//!
//! Cells of a run are written in a single transaction so the batch is
//! all-or-nothing. Links and profile updates are independent statements.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::store::OrganizationStore;
use crate::domain::{
    CellRecord, GenerationId, GenerationRecord, GenerationRef, LeaderLink, OrganizationId, Result,
    StoreError,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const INSERT_CELL: &str = r#"
    INSERT INTO cells (
        id, organization_id, generation_id, leader_id, name, weekday, meeting_time,
        address, target_audience, leader_name, leader_phone, active
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
"#;

const ACQUIRE_LOCK: &str = r#"
    INSERT INTO import_locks (organization_id, token, acquired_at)
    VALUES ($1, $2, now())
    ON CONFLICT (organization_id) DO UPDATE SET
        token = EXCLUDED.token,
        acquired_at = EXCLUDED.acquired_at
    WHERE import_locks.acquired_at < now() - make_interval(secs => $3)
"#;

/// PostgreSQL implementation of [`OrganizationStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl OrganizationStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn existing_generations(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<GenerationRef>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name FROM generations WHERE organization_id = $1",
                &[organization.as_uuid()],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(format!("generations lookup: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| GenerationRef {
                id: GenerationId::from_uuid(row.get::<_, Uuid>(0)),
                name: row.get(1),
            })
            .collect())
    }

    async fn existing_leader_emails(
        &self,
        organization: &OrganizationId,
        emails: &[String],
    ) -> Result<Vec<String>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT email FROM profiles WHERE organization_id = $1 AND email = ANY($2)",
                &[organization.as_uuid(), &emails],
            )
            .await
            .map_err(|e| StoreError::QueryFailed(format!("leader email lookup: {e}")))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn insert_generation(&self, generation: &GenerationRecord) -> Result<()> {
        let conn = self.client.get_connection().await?;
        conn.execute(
            "INSERT INTO generations (id, organization_id, name, color, active) \
             VALUES ($1, $2, $3, $4, $5)",
            &[
                generation.id.as_uuid(),
                generation.organization_id.as_uuid(),
                &generation.name,
                &generation.color,
                &generation.active,
            ],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
                StoreError::Conflict(format!("generation '{}' already exists", generation.name))
            } else {
                StoreError::InsertFailed(e.to_string())
            }
        })?;

        tracing::debug!(generation = %generation.name, id = %generation.id, "Generation inserted");
        Ok(())
    }

    async fn insert_cells(&self, cells: &[CellRecord]) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }

        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("failed to open transaction: {e}")))?;

        let statement = tx
            .prepare(INSERT_CELL)
            .await
            .map_err(|e| StoreError::InsertFailed(e.to_string()))?;

        for cell in cells {
            let weekday = cell.weekday.as_str();
            tx.execute(
                &statement,
                &[
                    cell.id.as_uuid(),
                    cell.organization_id.as_uuid(),
                    cell.generation_id.as_uuid(),
                    cell.leader_id.as_uuid(),
                    &cell.name,
                    &weekday,
                    &cell.time,
                    &cell.address,
                    &cell.target_audience,
                    &cell.leader_name,
                    &cell.leader_phone,
                    &cell.active,
                ],
            )
            .await
            .map_err(|e| StoreError::InsertFailed(format!("cell '{}': {e}", cell.name)))?;
        }

        // Dropping the transaction on an error above rolls it back
        tx.commit()
            .await
            .map_err(|e| StoreError::InsertFailed(format!("commit failed: {e}")))?;

        tracing::debug!(count = cells.len(), "Cell batch inserted");
        Ok(())
    }

    async fn insert_leader_link(&self, link: &LeaderLink) -> Result<()> {
        let conn = self.client.get_connection().await?;
        conn.execute(
            "INSERT INTO cell_leaders (cell_id, leader_id) VALUES ($1, $2)",
            &[link.cell_id.as_uuid(), link.leader_id.as_uuid()],
        )
        .await
        .map_err(|e| StoreError::InsertFailed(format!("leader link: {e}")))?;
        Ok(())
    }

    async fn update_leader_profile(&self, link: &LeaderLink) -> Result<()> {
        let conn = self.client.get_connection().await?;
        let updated = conn
            .execute(
                "UPDATE profiles SET cell_id = $1 WHERE id = $2",
                &[link.cell_id.as_uuid(), link.leader_id.as_uuid()],
            )
            .await
            .map_err(|e| StoreError::UpdateFailed(format!("leader profile: {e}")))?;

        if updated == 0 {
            return Err(StoreError::NotFound(format!("profile {}", link.leader_id)).into());
        }
        Ok(())
    }

    async fn try_acquire_import_lock(
        &self,
        organization: &OrganizationId,
        token: &str,
        ttl_seconds: u64,
    ) -> Result<bool> {
        let conn = self.client.get_connection().await?;
        let ttl = ttl_seconds as f64;
        let affected = conn
            .execute(ACQUIRE_LOCK, &[organization.as_uuid(), &token, &ttl])
            .await
            .map_err(|e| StoreError::QueryFailed(format!("import lock: {e}")))?;
        Ok(affected == 1)
    }

    async fn release_import_lock(&self, organization: &OrganizationId, token: &str) -> Result<()> {
        let conn = self.client.get_connection().await?;
        conn.execute(
            "DELETE FROM import_locks WHERE organization_id = $1 AND token = $2",
            &[organization.as_uuid(), &token],
        )
        .await
        .map_err(|e| StoreError::QueryFailed(format!("import lock release: {e}")))?;
        Ok(())
    }
}
