//! Import orchestration
//!
//! A run goes through four ordered stages:
//!
//! 1. **Generations** - create every new generation (fatal on failure)
//! 2. **Provisioning** - create leader accounts in one batched call
//! 3. **Cells** - classify each row and insert the eligible cells as one batch
//! 4. **Links** - link each created cell to its leader
//!
//! No stage starts before the previous one has settled and nothing is rolled
//! back when a later stage fails.

pub mod context;
pub mod orchestrator;
pub mod report;
pub mod stages;
pub mod state;

pub use context::{ImportSettings, RunContext};
pub use orchestrator::ImportOrchestrator;
pub use report::ImportReport;
pub use stages::RowClassification;
pub use state::{RunCounters, RunState, Stage, StageError, StageOutcome};
