//! In-memory organization store for dry runs and tests

use super::traits::OrganizationStore;
use crate::domain::{
    CellId, CellImportError, CellRecord, GenerationRecord, GenerationRef, LeaderId, LeaderLink,
    OrganizationId, Result, StoreError,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Default)]
struct State {
    generations: Vec<GenerationRecord>,
    seeded_generations: HashMap<OrganizationId, Vec<GenerationRef>>,
    leader_emails: HashMap<OrganizationId, HashSet<String>>,
    cells: Vec<CellRecord>,
    links: Vec<LeaderLink>,
    profiles: HashMap<LeaderId, CellId>,
    locks: HashMap<OrganizationId, (String, Instant)>,
    cell_batches: usize,
}

/// Store that keeps everything in process memory
///
/// Failures can be scripted per generation name, per cell name, for the cell
/// batch as a whole, and for the lookups.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failing_generations: HashSet<String>,
    failing_links: HashSet<String>,
    failing_profiles: HashSet<String>,
    cell_batch_failure: Option<String>,
    lookup_failure: Option<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a generation that already exists in `organization`
    pub fn with_generation(self, organization: OrganizationId, generation: GenerationRef) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .seeded_generations
                .entry(organization)
                .or_default()
                .push(generation);
        }
        self
    }

    /// Seed a leader email that already has a profile in `organization`
    pub fn with_leader_email(self, organization: OrganizationId, email: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .leader_emails
                .entry(organization)
                .or_default()
                .insert(email.into());
        }
        self
    }

    /// Fail the insert of the generation named `name`
    pub fn fail_generation(mut self, name: impl Into<String>) -> Self {
        self.failing_generations.insert(name.into());
        self
    }

    /// Fail every cell batch insert
    pub fn fail_cell_batch(mut self, reason: impl Into<String>) -> Self {
        self.cell_batch_failure = Some(reason.into());
        self
    }

    /// Fail the leader link of the cell named `cell`
    pub fn fail_link(mut self, cell: impl Into<String>) -> Self {
        self.failing_links.insert(cell.into());
        self
    }

    /// Fail the profile update of the leader running the cell named `cell`
    pub fn fail_profile_update(mut self, cell: impl Into<String>) -> Self {
        self.failing_profiles.insert(cell.into());
        self
    }

    /// Fail the generation and email lookups
    pub fn fail_lookups(mut self, reason: impl Into<String>) -> Self {
        self.lookup_failure = Some(reason.into());
        self
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| CellImportError::Other("store state poisoned".to_string()))
    }

    /// Generations inserted through the store
    pub fn inserted_generations(&self) -> Vec<GenerationRecord> {
        self.state()
            .map(|s| s.generations.clone())
            .unwrap_or_default()
    }

    /// Cells inserted through the store
    pub fn inserted_cells(&self) -> Vec<CellRecord> {
        self.state().map(|s| s.cells.clone()).unwrap_or_default()
    }

    /// Leader links inserted through the store
    pub fn inserted_links(&self) -> Vec<LeaderLink> {
        self.state().map(|s| s.links.clone()).unwrap_or_default()
    }

    /// Number of cell batch inserts attempted
    pub fn cell_batches(&self) -> usize {
        self.state().map(|s| s.cell_batches).unwrap_or_default()
    }

    /// Whether any run currently holds the lock for `organization`
    pub fn is_locked(&self, organization: &OrganizationId) -> bool {
        self.state()
            .map(|s| s.locks.contains_key(organization))
            .unwrap_or_default()
    }

    fn cell_name(state: &State, link: &LeaderLink) -> Option<String> {
        state
            .cells
            .iter()
            .find(|c| c.id == link.cell_id)
            .map(|c| c.name.clone())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn existing_generations(
        &self,
        organization: &OrganizationId,
    ) -> Result<Vec<GenerationRef>> {
        if let Some(reason) = &self.lookup_failure {
            return Err(StoreError::QueryFailed(reason.clone()).into());
        }
        let state = self.state()?;
        let mut refs = state
            .seeded_generations
            .get(organization)
            .cloned()
            .unwrap_or_default();
        refs.extend(
            state
                .generations
                .iter()
                .filter(|g| g.organization_id == *organization)
                .map(|g| GenerationRef {
                    id: g.id,
                    name: g.name.clone(),
                }),
        );
        Ok(refs)
    }

    async fn existing_leader_emails(
        &self,
        organization: &OrganizationId,
        emails: &[String],
    ) -> Result<Vec<String>> {
        if let Some(reason) = &self.lookup_failure {
            return Err(StoreError::QueryFailed(reason.clone()).into());
        }
        let state = self.state()?;
        let known = match state.leader_emails.get(organization) {
            Some(known) => known,
            None => return Ok(Vec::new()),
        };
        Ok(emails
            .iter()
            .filter(|e| known.contains(*e))
            .cloned()
            .collect())
    }

    async fn insert_generation(&self, generation: &GenerationRecord) -> Result<()> {
        if self.failing_generations.contains(&generation.name) {
            return Err(StoreError::InsertFailed(format!(
                "generation '{}' rejected",
                generation.name
            ))
            .into());
        }
        let mut state = self.state()?;
        let taken = state.generations.iter().any(|g| {
            g.organization_id == generation.organization_id && g.name == generation.name
        }) || state
            .seeded_generations
            .get(&generation.organization_id)
            .is_some_and(|refs| refs.iter().any(|g| g.name == generation.name));
        if taken {
            return Err(StoreError::Conflict(format!(
                "generation '{}' already exists",
                generation.name
            ))
            .into());
        }
        state.generations.push(generation.clone());
        Ok(())
    }

    async fn insert_cells(&self, cells: &[CellRecord]) -> Result<()> {
        let mut state = self.state()?;
        state.cell_batches += 1;
        if let Some(reason) = &self.cell_batch_failure {
            return Err(StoreError::InsertFailed(reason.clone()).into());
        }
        state.cells.extend_from_slice(cells);
        Ok(())
    }

    async fn insert_leader_link(&self, link: &LeaderLink) -> Result<()> {
        let mut state = self.state()?;
        let name = Self::cell_name(&state, link)
            .ok_or_else(|| StoreError::NotFound(format!("cell {}", link.cell_id)))?;
        if self.failing_links.contains(&name) {
            return Err(StoreError::InsertFailed(format!("link for cell '{name}' rejected")).into());
        }
        state.links.push(*link);
        Ok(())
    }

    async fn update_leader_profile(&self, link: &LeaderLink) -> Result<()> {
        let mut state = self.state()?;
        let name = Self::cell_name(&state, link)
            .ok_or_else(|| StoreError::NotFound(format!("cell {}", link.cell_id)))?;
        if self.failing_profiles.contains(&name) {
            return Err(
                StoreError::UpdateFailed(format!("profile for cell '{name}' rejected")).into(),
            );
        }
        state.profiles.insert(link.leader_id, link.cell_id);
        Ok(())
    }

    async fn try_acquire_import_lock(
        &self,
        organization: &OrganizationId,
        token: &str,
        ttl_seconds: u64,
    ) -> Result<bool> {
        let mut state = self.state()?;
        let now = Instant::now();
        if let Some((_, acquired_at)) = state.locks.get(organization) {
            if now.duration_since(*acquired_at) < Duration::from_secs(ttl_seconds) {
                return Ok(false);
            }
        }
        state
            .locks
            .insert(*organization, (token.to_string(), now));
        Ok(true)
    }

    async fn release_import_lock(&self, organization: &OrganizationId, token: &str) -> Result<()> {
        let mut state = self.state()?;
        if state
            .locks
            .get(organization)
            .is_some_and(|(held, _)| held == token)
        {
            state.locks.remove(organization);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_generation_conflicts() {
        let store = InMemoryStore::new();
        let org = OrganizationId::generate();
        store
            .insert_generation(&GenerationRecord::new(org, "Azul", "#1D4ED8"))
            .await
            .unwrap();
        let second = store
            .insert_generation(&GenerationRecord::new(org, "Azul", "#1D4ED8"))
            .await;
        assert!(matches!(
            second,
            Err(CellImportError::Store(StoreError::Conflict(_)))
        ));
        assert_eq!(store.existing_generations(&org).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_leader_emails_is_exact() {
        let org = OrganizationId::generate();
        let store = InMemoryStore::new().with_leader_email(org, "ana@example.com");
        let found = store
            .existing_leader_emails(
                &org,
                &["ana@example.com".to_string(), "ANA@example.com".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(found, vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_until_released() {
        let store = InMemoryStore::new();
        let org = OrganizationId::generate();
        assert!(store.try_acquire_import_lock(&org, "a", 60).await.unwrap());
        assert!(!store.try_acquire_import_lock(&org, "b", 60).await.unwrap());

        // Releasing with a foreign token is a no-op
        store.release_import_lock(&org, "b").await.unwrap();
        assert!(store.is_locked(&org));

        store.release_import_lock(&org, "a").await.unwrap();
        assert!(store.try_acquire_import_lock(&org, "b", 60).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_lock_can_be_taken_over() {
        let store = InMemoryStore::new();
        let org = OrganizationId::generate();
        assert!(store.try_acquire_import_lock(&org, "a", 0).await.unwrap());
        assert!(store.try_acquire_import_lock(&org, "b", 0).await.unwrap());
    }
}
