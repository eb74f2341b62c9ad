//! Final report of an import run

use super::state::{RunCounters, RunState, StageError};
use crate::domain::{ImportResultRow, OrganizationId};
use std::time::Duration;

/// Outcome of a completed run
///
/// Holds exactly one result per input row, in file order.
#[derive(Debug)]
pub struct ImportReport {
    /// Organization the run wrote to
    pub organization: OrganizationId,

    /// Idempotency token of the input file
    pub run_token: String,

    pub total_rows: usize,
    pub successful_rows: usize,
    pub failed_rows: usize,

    pub counters: RunCounters,

    /// Failures observed by the stages
    pub stage_errors: Vec<StageError>,

    pub duration: Duration,

    pub results: Vec<ImportResultRow>,
}

impl ImportReport {
    pub(crate) fn from_state(
        organization: OrganizationId,
        run_token: String,
        state: RunState,
        stage_errors: Vec<StageError>,
        duration: Duration,
    ) -> Self {
        let successful_rows = state.results.iter().filter(|r| r.is_success()).count();
        Self {
            organization,
            run_token,
            total_rows: state.results.len(),
            successful_rows,
            failed_rows: state.results.len() - successful_rows,
            counters: state.counters,
            stage_errors,
            duration,
            results: state.results,
        }
    }

    /// Whether every row succeeded
    pub fn is_successful(&self) -> bool {
        self.failed_rows == 0
    }

    /// Share of successful rows as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            return 100.0;
        }
        (self.successful_rows as f64 / self.total_rows as f64) * 100.0
    }

    /// Rows that still carry a password to export
    pub fn credentials_pending(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.password.is_present())
            .count()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            organization = %self.organization,
            run_token = %self.run_token,
            total_rows = self.total_rows,
            successful = self.successful_rows,
            failed = self.failed_rows,
            generations_created = self.counters.generations_created,
            accounts_provisioned = self.counters.accounts_provisioned,
            cells_created = self.counters.cells_created,
            links_created = self.counters.links_created,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Import completed"
        );

        if !self.stage_errors.is_empty() {
            tracing::warn!(
                error_count = self.stage_errors.len(),
                "Import completed with errors"
            );
            for error in self.stage_errors.iter().take(10) {
                tracing::warn!(stage = %error.stage, error = %error.message, "Stage error");
            }
        }
    }
}
