//! Import command implementation
//!
//! Previews the file, asks for confirmation, runs the import while printing
//! progress and writes the credentials file.

use super::preview::{print_summary, print_validation_errors};
use super::{exit_code_for, read_input, resolve_organization};
use crate::config::load_config;
use crate::core::export::{discard_passwords, export_credentials};
use crate::core::import::ImportReport;
use crate::core::ingest::validate_csv_with_default_color;
use crate::core::pipeline::ImportPipeline;
use crate::core::progress::ProgressReporter;
use crate::core::reconcile::summarize;
use crate::domain::Result;
use chrono::NaiveDateTime;
use clap::Args;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Import file (CSV)
    pub file: String,

    /// Organization to import into (defaults to import.organization_id)
    #[arg(long)]
    pub organization: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Directory for the credentials file (overrides import.export_dir)
    #[arg(long)]
    pub export_dir: Option<String>,
}

impl ImportArgs {
    /// Execute the import command
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

        tracing::info!(organization = %organization, file = %self.file, "Creating import pipeline");
        let pipeline = match ImportPipeline::from_config(&config).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create import pipeline");
                eprintln!("Failed to initialize import: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let store = pipeline.store().as_ref();
        let summary = match summarize(store, &organization, &validated.rows).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Preview failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        if !self.yes {
            print!("Proceed with import? [y/N]: ");
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Import cancelled.");
                return Ok(0);
            }
        }

        println!("🚀 Starting import...");
        println!();

        let progress = Arc::new(ProgressReporter::new());
        let (done_tx, printer) = spawn_progress_printer(Arc::clone(&progress));

        let outcome = pipeline
            .import(&organization, &text, Arc::clone(&progress))
            .await;

        let _ = done_tx.send(());
        if let Err(e) = printer.await {
            tracing::debug!(error = %e, "Progress printer stopped");
        }

        let mut report = match outcome {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Import failed");
                eprintln!("Import failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_report(&report);

        let export_dir = self
            .export_dir
            .clone()
            .unwrap_or_else(|| config.import.export_dir.clone());
        let created_at = chrono::Local::now().naive_local();

        match write_credentials(&report, Path::new(&export_dir), created_at) {
            Ok((path, passwords)) => {
                discard_passwords(&mut report.results);
                println!("🔑 Credentials written to {}", path.display());
                if passwords > 0 {
                    println!(
                        "   ⚠️  The file holds {passwords} password(s) that cannot be shown again."
                    );
                    println!("   Hand it to the leaders and delete it afterwards.");
                }
                println!();
            }
            Err(e) => {
                tracing::error!(error = %e, "Credential export failed");
                eprintln!("❌ Failed to write credentials: {e}");
                eprintln!("   Passwords from this run cannot be recovered.");
                return Ok(5);
            }
        }

        if report.is_successful() {
            println!("✅ Import completed successfully!");
            Ok(0)
        } else {
            println!("⚠️  Import completed with failures");
            Ok(1)
        }
    }
}

/// Write the credentials file into `export_dir`, or into the system temp
/// directory when `export_dir` cannot be written
fn write_credentials(
    report: &ImportReport,
    export_dir: &Path,
    created_at: NaiveDateTime,
) -> Result<(PathBuf, usize)> {
    let export = export_credentials(&report.results, created_at)?;

    let path = match export.write_to_dir(export_dir) {
        Ok(path) => path,
        Err(e) => {
            let fallback = std::env::temp_dir();
            tracing::warn!(
                error = %e,
                export_dir = %export_dir.display(),
                fallback = %fallback.display(),
                "Export directory not writable, using temp directory"
            );
            eprintln!("⚠️  Could not write to {}: {e}", export_dir.display());
            export.write_to_dir(&fallback)?
        }
    };

    Ok((path, export.passwords))
}

/// Print progress entries as they arrive until `done` fires
fn spawn_progress_printer(progress: Arc<ProgressReporter>) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let (done_tx, mut done_rx) = oneshot::channel::<()>();
    let mut percent_rx = progress.subscribe();

    let handle = tokio::spawn(async move {
        let mut printed = 0;
        loop {
            let finished = tokio::select! {
                changed = percent_rx.changed() => changed.is_err(),
                _ = &mut done_rx => true,
            };

            let entries = progress.entries_since(printed);
            printed += entries.len();
            let percent = progress.percent();
            for entry in entries {
                println!(
                    "  [{:>3}%] {} {}",
                    percent,
                    entry.timestamp.format("%H:%M:%S"),
                    entry.message
                );
            }

            if finished {
                break;
            }
        }
    });

    (done_tx, handle)
}

fn print_report(report: &ImportReport) {
    println!();
    println!("📊 Import Summary:");
    println!("  Total Rows: {}", report.total_rows);
    println!("  Successful: {}", report.successful_rows);
    println!("  Failed: {}", report.failed_rows);
    println!("  Generations Created: {}", report.counters.generations_created);
    println!("  Accounts Created: {}", report.counters.accounts_provisioned);
    println!("  Cells Created: {}", report.counters.cells_created);
    println!("  Leaders Linked: {}", report.counters.links_created);
    println!("  Duration: {:.2}s", report.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", report.success_rate());
    println!();

    if report.failed_rows > 0 {
        println!("⚠️  Failed rows:");
        for result in report.results.iter().filter(|r| !r.is_success()) {
            println!(
                "  - row {} ({}): {}",
                result.row,
                result.email,
                result.message.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }

    if !report.stage_errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in report.stage_errors.iter().take(20) {
            println!("  - {}: {}", error.stage, error.message);
        }
        println!();
    }
}
