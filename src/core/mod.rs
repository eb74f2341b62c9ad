//! Core import logic
//!
//! - [`ingest`] - file validation and the downloadable template
//! - [`reconcile`] - comparison with what already exists
//! - [`import`] - the four-stage orchestrator
//! - [`progress`] - run progress sink
//! - [`export`] - one-time credential export
//! - [`pipeline`] - facade tying them together

pub mod export;
pub mod import;
pub mod ingest;
pub mod pipeline;
pub mod progress;
pub mod reconcile;
