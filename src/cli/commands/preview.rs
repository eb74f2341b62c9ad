//! Preview command implementation
//!
//! Validates a file and compares it with the organization without writing
//! anything.

use super::{exit_code_for, read_input, resolve_organization};
use crate::adapters::factory::create_store;
use crate::config::load_config;
use crate::core::ingest::{validate_csv_with_default_color, ValidatedFile};
use crate::core::reconcile::{summarize, ReconciliationSummary};
use clap::Args;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Import file to preview
    pub file: String,

    /// Organization to compare against (defaults to import.organization_id)
    #[arg(long)]
    pub organization: Option<String>,
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let organization = match resolve_organization(self.organization.as_deref(), &config) {
            Ok(org) => org,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let text = match read_input(&self.file) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let validated =
            validate_csv_with_default_color(&text, &config.import.default_generation_color);
        if !validated.is_valid() {
            print_validation_errors(&validated);
            return Ok(2);
        }

        let store = match create_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to store");
                eprintln!("Failed to connect to store: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match summarize(store.as_ref(), &organization, &validated.rows).await {
            Ok(summary) => {
                print_summary(&summary);
                Ok(0)
            }
            Err(e) => {
                eprintln!("Preview failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Print the validation errors of a rejected file
pub fn print_validation_errors(validated: &ValidatedFile) {
    println!("❌ The file has {} validation error(s)", validated.errors.len());
    println!();
    for error in validated.errors.iter().take(50) {
        println!("  - {error}");
    }
    if validated.errors.len() > 50 {
        println!("  ... and {} more", validated.errors.len() - 50);
    }
    println!();
    println!("Fix the file and preview it again. Nothing was imported.");
}

/// Print the reconciliation summary
pub fn print_summary(summary: &ReconciliationSummary) {
    println!("📋 Import Preview:");
    println!("  Rows: {}", summary.total_rows);
    println!("  Generations: {}", summary.generation_count);
    println!("  Cells: {}", summary.cell_count);
    println!("  Leaders: {}", summary.leader_count);
    println!();

    if !summary.new_generations.is_empty() {
        println!("  New generations ({}):", summary.new_generations.len());
        for name in &summary.new_generations {
            println!("    + {name}");
        }
    }
    if !summary.existing_generations.is_empty() {
        println!(
            "  Existing generations ({}):",
            summary.existing_generations.len()
        );
        for generation in &summary.existing_generations {
            println!("    = {}", generation.name);
        }
    }
    if !summary.existing_emails.is_empty() {
        println!(
            "  ⚠️  Leaders already registered, their rows will be skipped ({}):",
            summary.existing_emails.len()
        );
        for email in &summary.existing_emails {
            println!("    ! {email}");
        }
    }
    println!();
    println!("  Accounts to create: {}", summary.rows_to_create());
    println!();
}
