//! Per-run state carried from stage to stage

use crate::core::reconcile::ReconciliationSummary;
use crate::domain::{
    CellRecord, GenerationId, ImportResultRow, ImportRow, LeaderAccountResult, LeaderLink,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// The four ordered stages of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Generations,
    Provisioning,
    Cells,
    Links,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generations => "generations",
            Stage::Provisioning => "provisioning",
            Stage::Cells => "cells",
            Stage::Links => "links",
        }
    }

    /// Progress percentage reached once the stage has settled
    pub fn completion_percent(&self) -> u8 {
        match self {
            Stage::Generations => 25,
            Stage::Provisioning => 50,
            Stage::Cells => 75,
            Stage::Links => 100,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure observed by a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

/// A cell waiting for the batched insert, with the result row it belongs to
#[derive(Debug, Clone)]
pub struct StagedCell {
    pub result_index: usize,
    pub record: CellRecord,
}

/// A created cell waiting for its leader link
#[derive(Debug, Clone, Copy)]
pub struct PendingLink {
    pub result_index: usize,
    pub link: LeaderLink,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub generations_created: usize,
    pub accounts_provisioned: usize,
    pub cells_created: usize,
    pub links_created: usize,
}

/// State of one run
///
/// The name and email lookups live here and nowhere else; they are dropped
/// with the state when the run ends.
#[derive(Debug)]
pub struct RunState {
    pub rows: Vec<ImportRow>,
    pub summary: ReconciliationSummary,
    /// Generation name to id, for new and pre-existing generations
    pub generation_ids: HashMap<String, GenerationId>,
    /// Provisioning outcome per submitted email
    pub accounts: HashMap<String, LeaderAccountResult>,
    /// One result per input row once stage 3 has run
    pub results: Vec<ImportResultRow>,
    pub staged_cells: Vec<StagedCell>,
    pub pending_links: Vec<PendingLink>,
    pub counters: RunCounters,
}

impl RunState {
    pub fn new(rows: Vec<ImportRow>, summary: ReconciliationSummary) -> Self {
        Self {
            rows,
            summary,
            generation_ids: HashMap::new(),
            accounts: HashMap::new(),
            results: Vec::new(),
            staged_cells: Vec::new(),
            pending_links: Vec::new(),
            counters: RunCounters::default(),
        }
    }
}

/// New state plus the errors a stage observed
#[derive(Debug)]
pub struct StageOutcome {
    pub state: RunState,
    pub errors: Vec<StageError>,
}

impl StageOutcome {
    pub fn new(state: RunState, errors: Vec<StageError>) -> Self {
        Self { state, errors }
    }
}
