//! Reconciliation of validated rows against the store
//!
//! Works out which generations must be created and which leader emails are
//! already registered, before anything is written.

use crate::adapters::store::OrganizationStore;
use crate::domain::{GenerationRef, ImportRow, OrganizationId, Result};
use serde::Serialize;
use std::collections::HashSet;

/// What an import would create, compared with what already exists
///
/// Every list follows file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub total_rows: usize,
    pub generation_count: usize,
    pub cell_count: usize,
    pub leader_count: usize,
    /// Generation names that do not exist yet
    pub new_generations: Vec<String>,
    /// Generations referenced by the file that already exist
    pub existing_generations: Vec<GenerationRef>,
    /// Leader emails of the file that already have a profile
    pub existing_emails: Vec<String>,
}

impl ReconciliationSummary {
    /// Whether the email already belongs to a registered leader
    pub fn is_existing_email(&self, email: &str) -> bool {
        self.existing_emails.iter().any(|e| e == email)
    }

    /// Rows that will go through account provisioning
    pub fn rows_to_create(&self) -> usize {
        self.leader_count.saturating_sub(self.existing_emails.len())
    }
}

/// Compare `rows` with the organization's current state
///
/// Issues one generations lookup and one email lookup. Names and emails are
/// compared with exact string equality.
pub async fn summarize(
    store: &dyn OrganizationStore,
    organization: &OrganizationId,
    rows: &[ImportRow],
) -> Result<ReconciliationSummary> {
    let generation_names = distinct(rows.iter().map(|r| r.generation.as_str()));
    let cell_names = distinct(rows.iter().map(|r| r.cell.as_str()));
    let emails = distinct(rows.iter().map(|r| r.leader_email.as_str()));

    let known_generations = store.existing_generations(organization).await?;

    let mut new_generations = Vec::new();
    let mut existing_generations = Vec::new();
    for name in &generation_names {
        match known_generations.iter().find(|g| g.name == *name) {
            Some(found) => existing_generations.push(found.clone()),
            None => new_generations.push(name.clone()),
        }
    }

    let known_emails: HashSet<String> = store
        .existing_leader_emails(organization, &emails)
        .await?
        .into_iter()
        .collect();
    let existing_emails = emails
        .iter()
        .filter(|e| known_emails.contains(*e))
        .cloned()
        .collect::<Vec<_>>();

    let summary = ReconciliationSummary {
        total_rows: rows.len(),
        generation_count: generation_names.len(),
        cell_count: cell_names.len(),
        leader_count: emails.len(),
        new_generations,
        existing_generations,
        existing_emails,
    };

    tracing::info!(
        organization = %organization,
        rows = summary.total_rows,
        new_generations = summary.new_generations.len(),
        existing_generations = summary.existing_generations.len(),
        existing_emails = summary.existing_emails.len(),
        "Reconciliation summary computed"
    );

    Ok(summary)
}

/// Distinct values in first-seen order
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}
