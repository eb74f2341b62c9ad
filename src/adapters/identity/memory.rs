//! In-memory identity provisioner for dry runs and tests

use super::traits::{IdentityProvisioner, ProvisionedAccount};
use crate::domain::{
    CellImportError, IdentityError, LeaderAccountRequest, LeaderId, OrganizationId,
    ProvisioningStatus, Result,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Provisioner that creates accounts locally
///
/// Every requested email succeeds with a fresh id unless it was scripted to
/// fail, omitted from the response, or the whole call was set to fail.
#[derive(Default)]
pub struct InMemoryIdentityProvisioner {
    failing_emails: HashMap<String, String>,
    omitted_emails: HashSet<String>,
    call_failure: Option<String>,
    calls: AtomicUsize,
    created: Mutex<Vec<(String, LeaderId)>>,
}

impl InMemoryIdentityProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `email` as failed with `reason`
    pub fn fail_email(mut self, email: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failing_emails.insert(email.into(), reason.into());
        self
    }

    /// Leave `email` out of the response
    pub fn omit_email(mut self, email: impl Into<String>) -> Self {
        self.omitted_emails.insert(email.into());
        self
    }

    /// Make the whole call fail
    pub fn fail_call(mut self, reason: impl Into<String>) -> Self {
        self.call_failure = Some(reason.into());
        self
    }

    /// Number of provisioning calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Accounts created so far, in request order
    pub fn created(&self) -> Vec<(String, LeaderId)> {
        self.created
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvisioner for InMemoryIdentityProvisioner {
    async fn provision_leaders(
        &self,
        _organization: &OrganizationId,
        accounts: &[LeaderAccountRequest],
    ) -> Result<Vec<ProvisionedAccount>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.call_failure {
            return Err(CellImportError::Identity(IdentityError::ConnectionFailed(
                reason.clone(),
            )));
        }

        let mut results = Vec::with_capacity(accounts.len());
        let mut created = self
            .created
            .lock()
            .map_err(|_| CellImportError::Other("identity state poisoned".to_string()))?;

        for account in accounts {
            if self.omitted_emails.contains(&account.email) {
                continue;
            }
            let status = match self.failing_emails.get(&account.email) {
                Some(reason) => ProvisioningStatus::Failed(reason.clone()),
                None => {
                    let id = LeaderId::generate();
                    created.push((account.email.clone(), id));
                    ProvisioningStatus::Created(id)
                }
            };
            results.push(ProvisionedAccount {
                email: account.email.clone(),
                status,
            });
        }

        Ok(results)
    }
}
