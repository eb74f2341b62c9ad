//! Organization store abstraction
//!
//! This module defines the interface the pipeline needs from the relational
//! store that holds generations, cells, leader links and leader profiles.

use crate::domain::{
    CellRecord, GenerationRecord, GenerationRef, LeaderId, LeaderLink, OrganizationId, Result,
};
use async_trait::async_trait;

/// Relational store used by the import pipeline
///
/// Every call is scoped to one organization. Implementations must not
/// normalize names or emails: matching is exact string equality.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Test the store connection
    async fn test_connection(&self) -> Result<()>;

    /// All generations that exist in the organization
    async fn existing_generations(&self, organization: &OrganizationId)
        -> Result<Vec<GenerationRef>>;

    /// The subset of `emails` that already belong to leader profiles of the organization
    async fn existing_leader_emails(
        &self,
        organization: &OrganizationId,
        emails: &[String],
    ) -> Result<Vec<String>>;

    /// Insert one generation
    async fn insert_generation(&self, generation: &GenerationRecord) -> Result<()>;

    /// Insert a batch of cells
    ///
    /// The batch is all-or-nothing: on error no cell of the batch was stored.
    async fn insert_cells(&self, cells: &[CellRecord]) -> Result<()>;

    /// Insert one cell/leader link
    async fn insert_leader_link(&self, link: &LeaderLink) -> Result<()>;

    /// Point the leader's profile at the cell it runs
    async fn update_leader_profile(&self, link: &LeaderLink) -> Result<()>;

    /// Try to take the per-organization import lock
    ///
    /// Returns `false` when another run holds a lock younger than `ttl_seconds`.
    async fn try_acquire_import_lock(
        &self,
        organization: &OrganizationId,
        token: &str,
        ttl_seconds: u64,
    ) -> Result<bool>;

    /// Release the lock if it is still held with `token`
    async fn release_import_lock(&self, organization: &OrganizationId, token: &str)
        -> Result<()>;
}
