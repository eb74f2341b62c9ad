//! HTTP client for the batched leader provisioning endpoint
//!
//! One POST creates every leader account of a run. The endpoint answers with
//! a per-email result list; a non-2xx status means the call failed as a whole.

use super::models::{
    ErrorBody, ProvisionLeader, ProvisionRequest, ProvisionResponse, ProvisionResultStatus,
};
use super::traits::{IdentityProvisioner, ProvisionedAccount};
use crate::config::IdentityConfig;
use crate::domain::{
    CellImportError, IdentityError, LeaderAccountRequest, LeaderId, OrganizationId,
    ProvisioningStatus, Result,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Identity provisioner backed by an HTTP service
///
/// # Example
///
/// ```no_run
/// use cell_import::adapters::identity::HttpIdentityProvisioner;
/// use cell_import::config::{secret_string, IdentityConfig};
///
/// # fn example() -> cell_import::domain::Result<()> {
/// let config = IdentityConfig {
///     base_url: "https://auth.example.com".to_string(),
///     provision_path: "functions/v1/create-leaders".to_string(),
///     service_key: secret_string("service-key".to_string()),
///     timeout_seconds: 60,
///     tls_verify: true,
/// };
/// let provisioner = HttpIdentityProvisioner::new(&config)?;
/// # Ok(())
/// # }
/// ```
pub struct HttpIdentityProvisioner {
    client: Client,
    url: url::Url,
    config: IdentityConfig,
}

impl HttpIdentityProvisioner {
    /// Build the provisioner and its HTTP client
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let url = config
            .provision_url()
            .map_err(CellImportError::Configuration)?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for identity provider");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            CellImportError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            url,
            config: config.clone(),
        })
    }

    fn map_send_error(err: reqwest::Error) -> IdentityError {
        if err.is_timeout() {
            IdentityError::Timeout(err.to_string())
        } else {
            IdentityError::ConnectionFailed(err.to_string())
        }
    }

    async fn map_status_error(status: StatusCode, response: reqwest::Response) -> IdentityError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::reason)
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                IdentityError::AuthenticationFailed(format!("status {status}: {message}"))
            }
            s if s.is_server_error() => IdentityError::ServerError {
                status: s.as_u16(),
                message,
            },
            s => IdentityError::ClientError {
                status: s.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl IdentityProvisioner for HttpIdentityProvisioner {
    async fn provision_leaders(
        &self,
        organization: &OrganizationId,
        accounts: &[LeaderAccountRequest],
    ) -> Result<Vec<ProvisionedAccount>> {
        if accounts.is_empty() {
            return Ok(Vec::new());
        }

        let request = ProvisionRequest {
            organization_id: organization.to_string(),
            leaders: accounts
                .iter()
                .map(|a| ProvisionLeader {
                    name: &a.name,
                    email: &a.email,
                    password: a.password.expose_secret().as_str(),
                    phone: a.phone.as_deref(),
                })
                .collect(),
        };

        tracing::debug!(
            url = %self.url,
            accounts = accounts.len(),
            "Sending leader provisioning request"
        );

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(self.config.service_key.expose_secret().as_str())
            .json(&request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_status_error(status, response).await.into());
        }

        let body: ProvisionResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;

        let accounts = body
            .results
            .into_iter()
            .map(|result| {
                let status = match result.status {
                    ProvisionResultStatus::Success => match result.user_id.as_deref() {
                        Some(raw) => match LeaderId::new(raw) {
                            Ok(id) => ProvisioningStatus::Created(id),
                            Err(e) => ProvisioningStatus::Failed(format!(
                                "identity provider returned an invalid id: {e}"
                            )),
                        },
                        None => ProvisioningStatus::Failed(
                            "identity provider returned no id for created account".to_string(),
                        ),
                    },
                    ProvisionResultStatus::Error => ProvisioningStatus::Failed(
                        result
                            .reason()
                            .unwrap_or("account creation failed")
                            .to_string(),
                    ),
                };
                ProvisionedAccount {
                    email: result.email,
                    status,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!(
            created = accounts
                .iter()
                .filter(|a| matches!(a.status, ProvisioningStatus::Created(_)))
                .count(),
            returned = accounts.len(),
            "Leader provisioning response received"
        );

        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(base_url: &str) -> IdentityConfig {
        IdentityConfig {
            base_url: base_url.to_string(),
            provision_path: "functions/v1/create-leaders".to_string(),
            service_key: secret_string("test-key".to_string()),
            timeout_seconds: 5,
            tls_verify: true,
        }
    }

    #[test]
    fn test_new_resolves_provision_url() {
        let provisioner = HttpIdentityProvisioner::new(&config("https://auth.example.com")).unwrap();
        assert_eq!(
            provisioner.url.as_str(),
            "https://auth.example.com/functions/v1/create-leaders"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = HttpIdentityProvisioner::new(&config("not a url"));
        assert!(matches!(result, Err(CellImportError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        // Unroutable address: any request would fail
        let provisioner = HttpIdentityProvisioner::new(&config("http://127.0.0.1:9")).unwrap();
        let result = provisioner
            .provision_leaders(&OrganizationId::generate(), &[])
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
