//! Stage 1: generation creation

use crate::core::import::context::RunContext;
use crate::core::import::state::{RunState, Stage, StageOutcome};
use crate::domain::{CellImportError, GenerationRecord, Result};
use crate::{log_stage_complete, log_stage_start};
use futures::future::join_all;

/// Create every generation the summary marked as new
///
/// All inserts are issued together and awaited together; one failing insert
/// does not cancel the others. Any failure aborts the run.
pub async fn create_generations(ctx: &RunContext, mut state: RunState) -> Result<StageOutcome> {
    let stage = Stage::Generations;
    log_stage_start!(stage.as_str(), state.summary.new_generations.len());

    for existing in &state.summary.existing_generations {
        state
            .generation_ids
            .insert(existing.name.clone(), existing.id);
    }

    let records: Vec<GenerationRecord> = state
        .summary
        .new_generations
        .iter()
        .map(|name| {
            // Color comes from the first row naming the generation
            let color = state
                .rows
                .iter()
                .find(|r| r.generation == *name)
                .map(|r| r.generation_color.clone())
                .unwrap_or_else(|| ctx.settings.default_generation_color.clone());
            GenerationRecord::new(ctx.organization, name.clone(), color)
        })
        .collect();

    if records.is_empty() {
        ctx.progress.log("No new generations to create");
    } else {
        ctx.progress
            .log(format!("Creating {} new generation(s)", records.len()));
    }

    let results = join_all(records.iter().map(|r| ctx.store.insert_generation(r))).await;

    let mut failures = Vec::new();
    for (record, result) in records.into_iter().zip(results) {
        match result {
            Ok(()) => {
                tracing::debug!(generation = %record.name, id = %record.id, "Generation created");
                state.generation_ids.insert(record.name, record.id);
                state.counters.generations_created += 1;
            }
            Err(e) => {
                tracing::error!(generation = %record.name, error = %e, "Generation creation failed");
                failures.push(format!("'{}': {}", record.name, e));
            }
        }
    }

    if !failures.is_empty() {
        let message = format!("generation creation failed: {}", failures.join("; "));
        ctx.progress.log(format!("Import aborted: {message}"));
        return Err(CellImportError::Import(message));
    }

    ctx.progress.set_percent(stage.completion_percent());
    log_stage_complete!(stage.as_str(), state.counters.generations_created, 0);
    Ok(StageOutcome::new(state, Vec::new()))
}
