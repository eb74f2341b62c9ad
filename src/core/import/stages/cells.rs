//! Stage 3: row classification and cell creation

use crate::config::SecretString;
use crate::core::import::context::RunContext;
use crate::core::import::state::{PendingLink, RunState, Stage, StageError, StageOutcome, StagedCell};
use crate::domain::{
    CellId, CellRecord, GenerationId, ImportResultRow, ImportRow, LeaderId, LeaderLink,
    ProvisioningStatus,
};
use crate::{log_stage_complete, log_stage_start};

/// Message given to rows whose leader already has a profile
pub const ALREADY_REGISTERED: &str = "email already registered";

/// What stage 3 decided for one input row
#[derive(Debug, Clone)]
pub enum RowClassification {
    /// The leader email already belongs to the organization
    AlreadyRegistered,
    /// The identity provider did not create the account
    ProvisioningFailed(String),
    /// A generation or leader id could not be found in the run lookups
    Unresolved(String),
    /// The row gets a cell
    Eligible {
        generation_id: GenerationId,
        leader_id: LeaderId,
        password: SecretString,
    },
}

/// Classify one row against the run state
pub fn classify_row(row: &ImportRow, state: &RunState) -> RowClassification {
    if state.summary.is_existing_email(&row.leader_email) {
        return RowClassification::AlreadyRegistered;
    }

    let account = match state.accounts.get(&row.leader_email) {
        Some(account) => account,
        None => {
            return RowClassification::Unresolved(format!(
                "no provisioning result for '{}'",
                row.leader_email
            ))
        }
    };

    let leader_id = match &account.status {
        ProvisioningStatus::Created(id) => *id,
        ProvisioningStatus::Failed(reason) => {
            return RowClassification::ProvisioningFailed(reason.clone())
        }
    };

    match state.generation_ids.get(&row.generation) {
        Some(generation_id) => RowClassification::Eligible {
            generation_id: *generation_id,
            leader_id,
            password: account.password.clone(),
        },
        None => RowClassification::Unresolved(format!(
            "generation '{}' could not be resolved",
            row.generation
        )),
    }
}

/// Build one result per row and insert the eligible cells as one batch
///
/// The batch is all-or-nothing: when it fails every eligible row becomes an
/// error and none of them reaches stage 4.
pub async fn create_cells(ctx: &RunContext, mut state: RunState) -> StageOutcome {
    let stage = Stage::Cells;
    let mut errors = Vec::new();
    let mut results = Vec::with_capacity(state.rows.len());
    let mut staged = Vec::new();

    for row in &state.rows {
        let result = match classify_row(row, &state) {
            RowClassification::AlreadyRegistered => ImportResultRow::error(row, ALREADY_REGISTERED),
            RowClassification::ProvisioningFailed(reason) => {
                ImportResultRow::error(row, format!("account creation failed: {reason}"))
            }
            RowClassification::Unresolved(reason) => {
                errors.push(StageError::new(stage, format!("row {}: {}", row.index, reason)));
                ImportResultRow::error(row, reason)
            }
            RowClassification::Eligible {
                generation_id,
                leader_id,
                password,
            } => {
                staged.push(StagedCell {
                    result_index: results.len(),
                    record: CellRecord {
                        id: CellId::generate(),
                        organization_id: ctx.organization,
                        generation_id,
                        leader_id,
                        name: row.cell.clone(),
                        weekday: row.weekday,
                        time: row.time,
                        address: row.address.clone(),
                        target_audience: row.target_audience.clone(),
                        leader_name: row.leader_name.clone(),
                        leader_phone: row.leader_phone.clone(),
                        active: true,
                    },
                });
                ImportResultRow::success(row, leader_id, password)
            }
        };
        results.push(result);
    }

    state.results = results;
    log_stage_start!(stage.as_str(), staged.len());

    if staged.is_empty() {
        ctx.progress.log("No cells to create");
    } else {
        ctx.progress.log(format!("Creating {} cell(s)", staged.len()));

        let records: Vec<CellRecord> = staged.iter().map(|s| s.record.clone()).collect();
        match ctx.store.insert_cells(&records).await {
            Ok(()) => {
                state.counters.cells_created = records.len();
                state.pending_links = staged
                    .iter()
                    .map(|s| PendingLink {
                        result_index: s.result_index,
                        link: LeaderLink {
                            cell_id: s.record.id,
                            leader_id: s.record.leader_id,
                        },
                    })
                    .collect();
                ctx.progress
                    .log(format!("{} cell(s) created", records.len()));
            }
            Err(e) => {
                tracing::error!(error = %e, cells = records.len(), "Cell batch insert failed");
                errors.push(StageError::new(stage, format!("cell batch failed: {e}")));
                for s in &staged {
                    if let Some(result) = state.results.get_mut(s.result_index) {
                        result.fail(format!("cell creation failed: {e}"));
                    }
                }
                ctx.progress
                    .log(format!("Cell creation failed for {} row(s): {e}", records.len()));
            }
        }
    }

    state.staged_cells = staged;
    ctx.progress.set_percent(stage.completion_percent());
    log_stage_complete!(
        stage.as_str(),
        state.counters.cells_created,
        state.staged_cells.len() - state.counters.cells_created
    );
    StageOutcome::new(state, errors)
}
