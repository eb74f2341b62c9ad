//! Import orchestrator
//!
//! Runs the four stages in order over one [`RunState`].

use super::context::RunContext;
use super::report::ImportReport;
use super::stages;
use super::state::RunState;
use crate::core::reconcile::ReconciliationSummary;
use crate::domain::{ImportRow, Result};
use std::time::Instant;

/// Drives one import run
///
/// # Example
///
/// ```rust,no_run
/// use cell_import::adapters::identity::InMemoryIdentityProvisioner;
/// use cell_import::adapters::store::InMemoryStore;
/// use cell_import::core::import::{ImportOrchestrator, ImportSettings, RunContext};
/// use cell_import::core::ingest::validate_csv;
/// use cell_import::core::progress::ProgressReporter;
/// use cell_import::core::reconcile::summarize;
/// use cell_import::domain::OrganizationId;
/// use std::sync::Arc;
///
/// # async fn example(text: &str) -> cell_import::domain::Result<()> {
/// let context = RunContext {
///     organization: OrganizationId::generate(),
///     store: Arc::new(InMemoryStore::new()),
///     identity: Arc::new(InMemoryIdentityProvisioner::new()),
///     settings: ImportSettings::default(),
///     progress: Arc::new(ProgressReporter::new()),
/// };
///
/// let rows = validate_csv(text).rows;
/// let summary = summarize(context.store.as_ref(), &context.organization, &rows).await?;
/// let report = ImportOrchestrator::new(context)
///     .run(rows, summary, "token")
///     .await?;
/// println!("{} of {} rows imported", report.successful_rows, report.total_rows);
/// # Ok(())
/// # }
/// ```
pub struct ImportOrchestrator {
    context: RunContext,
}

impl ImportOrchestrator {
    pub fn new(context: RunContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run every stage over validated `rows`
    ///
    /// # Errors
    ///
    /// Returns an error only when stage 1 fails; later failures are reflected
    /// into the per-row results of the report.
    pub async fn run(
        &self,
        rows: Vec<ImportRow>,
        summary: ReconciliationSummary,
        run_token: impl Into<String>,
    ) -> Result<ImportReport> {
        let ctx = &self.context;
        let run_token = run_token.into();
        let started = Instant::now();
        let total_rows = rows.len();

        tracing::info!(
            organization = %ctx.organization,
            run_token = %run_token,
            rows = total_rows,
            "Starting import run"
        );
        ctx.progress
            .log(format!("Starting import of {total_rows} row(s)"));

        let outcome = stages::create_generations(ctx, RunState::new(rows, summary)).await?;
        let mut stage_errors = outcome.errors;

        let outcome = stages::provision_leaders(ctx, outcome.state).await;
        stage_errors.extend(outcome.errors);

        let outcome = stages::create_cells(ctx, outcome.state).await;
        stage_errors.extend(outcome.errors);

        let outcome = stages::link_leaders(ctx, outcome.state).await;
        stage_errors.extend(outcome.errors);

        debug_assert_eq!(outcome.state.results.len(), total_rows);

        let report = ImportReport::from_state(
            ctx.organization,
            run_token,
            outcome.state,
            stage_errors,
            started.elapsed(),
        );

        ctx.progress.log(format!(
            "Import finished: {} succeeded, {} failed",
            report.successful_rows, report.failed_rows
        ));
        report.log_summary();

        Ok(report)
    }
}
