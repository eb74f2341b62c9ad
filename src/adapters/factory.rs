//! Adapter factory
//!
//! Builds the production store and identity provisioner from configuration.

use crate::adapters::identity::{HttpIdentityProvisioner, IdentityProvisioner};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::OrganizationStore;
use crate::config::schema::CellImportConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the organization store
///
/// The schema is created when missing so a fresh database is usable
/// without a separate migration step.
///
/// # Errors
///
/// Returns an error if the pool cannot be built or the schema cannot be applied.
pub async fn create_store(config: &CellImportConfig) -> Result<Arc<dyn OrganizationStore>> {
    tracing::info!("Creating PostgreSQL store");
    let client = PostgreSQLClient::new(config.postgresql.clone())?;
    client.ensure_schema().await?;
    Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn OrganizationStore>)
}

/// Create the identity provisioner
pub fn create_identity_provisioner(
    config: &CellImportConfig,
) -> Result<Arc<dyn IdentityProvisioner>> {
    tracing::info!(base_url = %config.identity.base_url, "Creating identity provisioner");
    let provisioner = HttpIdentityProvisioner::new(&config.identity)?;
    Ok(Arc::new(provisioner) as Arc<dyn IdentityProvisioner>)
}
