//! Stage 4: leader linking

use crate::adapters::store::OrganizationStore;
use crate::core::import::context::RunContext;
use crate::core::import::state::{RunState, Stage, StageError, StageOutcome};
use crate::domain::{LeaderLink, Result};
use crate::{log_stage_complete, log_stage_start};
use futures::stream::{self, StreamExt};

async fn link_one(store: &dyn OrganizationStore, link: &LeaderLink) -> Result<()> {
    store.insert_leader_link(link).await?;
    store.update_leader_profile(link).await
}

/// Link every created cell to its leader
///
/// Links run concurrently up to `link_concurrency`; each failure only
/// affects its own row.
pub async fn link_leaders(ctx: &RunContext, mut state: RunState) -> StageOutcome {
    let stage = Stage::Links;
    let pending = std::mem::take(&mut state.pending_links);
    log_stage_start!(stage.as_str(), pending.len());

    if pending.is_empty() {
        ctx.progress.set_percent(stage.completion_percent());
        log_stage_complete!(stage.as_str(), 0, 0);
        return StageOutcome::new(state, Vec::new());
    }

    ctx.progress
        .log(format!("Linking {} leader(s) to their cells", pending.len()));

    let store = ctx.store.as_ref();
    let outcomes: Vec<(usize, LeaderLink, Result<()>)> = stream::iter(pending)
        .map(|p| async move { (p.result_index, p.link, link_one(store, &p.link).await) })
        .buffer_unordered(ctx.settings.link_concurrency)
        .collect()
        .await;

    let mut errors = Vec::new();
    for (index, link, outcome) in outcomes {
        match outcome {
            Ok(()) => state.counters.links_created += 1,
            Err(e) => {
                tracing::warn!(cell = %link.cell_id, leader = %link.leader_id, error = %e, "Leader link failed");
                if let Some(result) = state.results.get_mut(index) {
                    errors.push(StageError::new(
                        stage,
                        format!("row {}: {}", result.row, e),
                    ));
                    result.fail(format!("cell created but leader link failed: {e}"));
                }
            }
        }
    }

    ctx.progress.log(format!(
        "{} leader link(s) created, {} failed",
        state.counters.links_created,
        errors.len()
    ));
    ctx.progress.set_percent(stage.completion_percent());
    log_stage_complete!(stage.as_str(), state.counters.links_created, errors.len());
    StageOutcome::new(state, errors)
}
