//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config runs validate() after substitution and overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Organization: {}",
            config
                .import
                .organization_id
                .as_deref()
                .unwrap_or("(pass --organization)")
        );
        println!(
            "  Identity Provider: {}",
            config
                .identity
                .provision_url()
                .map(|u| u.to_string())
                .unwrap_or_else(|e| e)
        );
        {
            use secrecy::ExposeSecret;
            println!(
                "  PostgreSQL Connection: {}",
                config
                    .postgresql
                    .connection_string
                    .expose_secret()
                    .as_str()
                    .split('@')
                    .next_back()
                    .unwrap_or("***")
            );
        }
        println!("  Max Connections: {}", config.postgresql.max_connections);
        println!("  Link Concurrency: {}", config.import.link_concurrency);
        println!("  Export Directory: {}", config.import.export_dir);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/cell-import.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[identity]
base_url = "https://auth.example.com"
service_key = "key"

[postgresql]
connection_string = "postgresql://user:pw@localhost:5432/cells"
"#
        )
        .unwrap();

        let args = ValidateArgs {};
        let code = args
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
