//! Records written to the store and exchanged with the identity provider

use crate::config::SecretString;
use crate::domain::ids::{CellId, GenerationId, LeaderId, OrganizationId};
use crate::domain::row::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A generation as created by stage 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRecord {
    pub id: GenerationId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub color: String,
    pub active: bool,
}

impl GenerationRecord {
    /// New active generation with a freshly generated id
    pub fn new(
        organization_id: OrganizationId,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: GenerationId::generate(),
            organization_id,
            name: name.into(),
            color: color.into(),
            active: true,
        }
    }
}

/// An existing generation as returned by the store lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRef {
    pub id: GenerationId,
    pub name: String,
}

/// A cell staged for the batched insert of stage 3
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRecord {
    pub id: CellId,
    pub organization_id: OrganizationId,
    pub generation_id: GenerationId,
    pub leader_id: LeaderId,
    pub name: String,
    pub weekday: Weekday,
    pub time: NaiveTime,
    pub address: Option<String>,
    pub target_audience: Option<String>,
    pub leader_name: String,
    pub leader_phone: Option<String>,
    pub active: bool,
}

/// Link between a cell and the leader who runs it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeaderLink {
    pub cell_id: CellId,
    pub leader_id: LeaderId,
}

/// One account to provision in the batched identity call
#[derive(Debug, Clone)]
pub struct LeaderAccountRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: SecretString,
}

/// Per-email result of the identity provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStatus {
    Created(LeaderId),
    Failed(String),
}

/// Outcome for one provisioned email
#[derive(Debug, Clone)]
pub struct LeaderAccountResult {
    pub email: String,
    pub status: ProvisioningStatus,
    /// The password that was submitted for this account
    pub password: SecretString,
}

impl LeaderAccountResult {
    /// Whether the account was created
    pub fn is_success(&self) -> bool {
        matches!(self.status, ProvisioningStatus::Created(_))
    }

    /// Identity id of the created account
    pub fn leader_id(&self) -> Option<LeaderId> {
        match self.status {
            ProvisioningStatus::Created(id) => Some(id),
            ProvisioningStatus::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_generation_record_new_is_active() {
        let org = OrganizationId::generate();
        let record = GenerationRecord::new(org, "Geração Azul", "#1D4ED8");
        assert!(record.active);
        assert_eq!(record.organization_id, org);
        assert_eq!(record.name, "Geração Azul");
    }

    #[test]
    fn test_leader_account_result_accessors() {
        let id = LeaderId::generate();
        let created = LeaderAccountResult {
            email: "ana@example.com".to_string(),
            status: ProvisioningStatus::Created(id),
            password: secret_string("Temp@123".to_string()),
        };
        assert!(created.is_success());
        assert_eq!(created.leader_id(), Some(id));

        let failed = LeaderAccountResult {
            email: "bruno@example.com".to_string(),
            status: ProvisioningStatus::Failed("rate limited".to_string()),
            password: secret_string("Temp@123".to_string()),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.leader_id(), None);
    }
}
