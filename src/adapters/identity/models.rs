//! Wire format of the batched provisioning endpoint

use serde::{Deserialize, Serialize};

/// Request body sent to the provisioning endpoint
#[derive(Debug, Serialize)]
pub struct ProvisionRequest<'a> {
    pub organization_id: String,
    pub leaders: Vec<ProvisionLeader<'a>>,
}

/// One leader in the request body
#[derive(Debug, Serialize)]
pub struct ProvisionLeader<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

/// Response body of the provisioning endpoint
#[derive(Debug, Deserialize)]
pub struct ProvisionResponse {
    #[serde(default)]
    pub results: Vec<ProvisionResult>,
}

/// Outcome reported for one email
///
/// Providers report the failure reason as either `error` or `message`; both
/// may be present, in which case `error` wins.
#[derive(Debug, Deserialize)]
pub struct ProvisionResult {
    pub email: String,
    pub status: ProvisionResultStatus,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProvisionResult {
    /// Failure reason, if the provider gave one
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionResultStatus {
    Success,
    Error,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    pub fn reason(self) -> Option<String> {
        self.error.or(self.message).or(self.msg)
    }
}
