//! Run context shared by every stage

use crate::adapters::identity::IdentityProvisioner;
use crate::adapters::store::OrganizationStore;
use crate::config::{ImportConfig, SecretString};
use crate::core::progress::ProgressReporter;
use crate::domain::OrganizationId;
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Settings that shape a run
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub default_password: SecretString,
    pub min_password_length: usize,
    pub default_generation_color: String,
    pub link_concurrency: usize,
    pub lock_ttl_seconds: u64,
}

impl ImportSettings {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            default_password: config.default_password.clone(),
            min_password_length: config.min_password_length,
            default_generation_color: config.default_generation_color.clone(),
            link_concurrency: config.link_concurrency.max(1),
            lock_ttl_seconds: config.lock_ttl_seconds,
        }
    }

    /// Password to submit for a leader
    ///
    /// A blank or too-short supplied password is replaced by the default one.
    pub fn password_for(&self, supplied: Option<&SecretString>) -> SecretString {
        match supplied {
            Some(p) if p.expose_secret().char_len() >= self.min_password_length => p.clone(),
            _ => self.default_password.clone(),
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

/// Everything a stage needs besides the run state
#[derive(Clone)]
pub struct RunContext {
    pub organization: OrganizationId,
    pub store: Arc<dyn OrganizationStore>,
    pub identity: Arc<dyn IdentityProvisioner>,
    pub settings: ImportSettings,
    pub progress: Arc<ProgressReporter>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_password_for_keeps_long_enough_password() {
        let settings = ImportSettings::default();
        let supplied = secret_string("Minha@Senha".to_string());
        let chosen = settings.password_for(Some(&supplied));
        assert_eq!(chosen.expose_secret().as_str(), "Minha@Senha");
    }

    #[test]
    fn test_password_for_replaces_short_or_missing_password() {
        let settings = ImportSettings::default();
        let default = settings.default_password.expose_secret().as_str().to_string();

        let short = secret_string("12345".to_string());
        assert_eq!(
            settings.password_for(Some(&short)).expose_secret().as_str(),
            default
        );
        assert_eq!(settings.password_for(None).expose_secret().as_str(), default);
    }

    #[test]
    fn test_password_length_counts_characters() {
        let settings = ImportSettings::default();
        // Six characters, more than six bytes
        let accented = secret_string("çãéíõú".to_string());
        assert_eq!(
            settings.password_for(Some(&accented)).expose_secret().as_str(),
            "çãéíõú"
        );
    }
}
