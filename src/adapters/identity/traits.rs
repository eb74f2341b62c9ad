//! Identity provisioning abstraction

use crate::domain::{LeaderAccountRequest, OrganizationId, ProvisioningStatus, Result};
use async_trait::async_trait;

/// Per-email outcome reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
    pub email: String,
    pub status: ProvisioningStatus,
}

/// Account provider that creates leader identities in one batched call
///
/// The returned list is matched to the request by email, not by position.
/// Some accounts of a batch may be created while others fail; an `Err`
/// means the call as a whole did not complete.
#[async_trait]
pub trait IdentityProvisioner: Send + Sync {
    async fn provision_leaders(
        &self,
        organization: &OrganizationId,
        accounts: &[LeaderAccountRequest],
    ) -> Result<Vec<ProvisionedAccount>>;
}
