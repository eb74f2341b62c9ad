//! Import pipeline facade
//!
//! Wires validation, reconciliation, the run lock and the orchestrator
//! behind the workflow a host drives: preview the file, then import it.

use crate::adapters::factory::{create_identity_provisioner, create_store};
use crate::adapters::identity::IdentityProvisioner;
use crate::adapters::store::OrganizationStore;
use crate::config::CellImportConfig;
use crate::core::import::{ImportOrchestrator, ImportReport, ImportSettings, RunContext};
use crate::core::ingest::{validate_csv_with_default_color, ValidatedFile};
use crate::core::progress::ProgressReporter;
use crate::core::reconcile::{summarize, ReconciliationSummary};
use crate::domain::{CellImportError, OrganizationId, Result};
use crate::log_error_with_context;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// Idempotency token of an input file: hex SHA-256 of its text
pub fn run_token(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Result of previewing a file
#[derive(Debug)]
pub struct Preview {
    pub validated: ValidatedFile,
    /// Present only when the file passed validation
    pub summary: Option<ReconciliationSummary>,
}

/// Entry point for hosts
pub struct ImportPipeline {
    store: Arc<dyn OrganizationStore>,
    identity: Arc<dyn IdentityProvisioner>,
    settings: ImportSettings,
}

impl ImportPipeline {
    pub fn new(
        store: Arc<dyn OrganizationStore>,
        identity: Arc<dyn IdentityProvisioner>,
        settings: ImportSettings,
    ) -> Self {
        Self {
            store,
            identity,
            settings,
        }
    }

    /// Build the pipeline with the production adapters
    pub async fn from_config(config: &CellImportConfig) -> Result<Self> {
        let store = create_store(config).await?;
        let identity = create_identity_provisioner(config)?;
        Ok(Self::new(
            store,
            identity,
            ImportSettings::from_config(&config.import),
        ))
    }

    pub fn store(&self) -> &Arc<dyn OrganizationStore> {
        &self.store
    }

    /// Validate a file without touching the store
    pub fn validate(&self, text: &str) -> ValidatedFile {
        validate_csv_with_default_color(text, &self.settings.default_generation_color)
    }

    /// Validate and, when valid, compare the file with the organization
    pub async fn preview(&self, organization: &OrganizationId, text: &str) -> Result<Preview> {
        let validated = self.validate(text);
        let summary = if validated.is_valid() {
            Some(summarize(self.store.as_ref(), organization, &validated.rows).await?)
        } else {
            None
        };
        Ok(Preview { validated, summary })
    }

    /// Import a file into `organization`
    ///
    /// # Errors
    ///
    /// - [`CellImportError::Validation`] when the file has any validation error
    /// - [`CellImportError::ImportInProgress`] when another run holds the lock
    /// - [`CellImportError::Import`] when generation creation fails
    pub async fn import(
        &self,
        organization: &OrganizationId,
        text: &str,
        progress: Arc<ProgressReporter>,
    ) -> Result<ImportReport> {
        let validated = self.validate(text);
        if !validated.is_valid() {
            let first = validated
                .errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "file has no rows".to_string());
            return Err(CellImportError::Validation(format!(
                "{} validation error(s); first: {first}",
                validated.errors.len().max(1)
            )));
        }

        // The file hash identifies the input; the lock owner identifies this run
        let token = run_token(text);
        let lock_owner = Uuid::new_v4().to_string();
        let acquired = self
            .store
            .try_acquire_import_lock(organization, &lock_owner, self.settings.lock_ttl_seconds)
            .await?;
        if !acquired {
            tracing::warn!(organization = %organization, "Import already in progress");
            return Err(CellImportError::ImportInProgress(organization.to_string()));
        }
        tracing::debug!(
            organization = %organization,
            run_token = %token,
            lock_owner = %lock_owner,
            "Import lock acquired"
        );

        let outcome = self
            .run_locked(organization, validated, &token, progress)
            .await;

        if let Err(e) = self.store.release_import_lock(organization, &lock_owner).await {
            log_error_with_context!(e, "Failed to release import lock");
        }

        outcome
    }

    async fn run_locked(
        &self,
        organization: &OrganizationId,
        validated: ValidatedFile,
        token: &str,
        progress: Arc<ProgressReporter>,
    ) -> Result<ImportReport> {
        progress.log("Reconciling file with existing data");
        let summary = summarize(self.store.as_ref(), organization, &validated.rows).await?;

        let orchestrator = ImportOrchestrator::new(RunContext {
            organization: *organization,
            store: Arc::clone(&self.store),
            identity: Arc::clone(&self.identity),
            settings: self.settings.clone(),
            progress,
        });
        orchestrator.run(validated.rows, summary, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_token_is_sha256_hex() {
        assert_eq!(
            run_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(run_token("a,b\n").len(), 64);
        assert_ne!(run_token("a"), run_token("b"));
    }
}
