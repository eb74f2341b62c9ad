//! The four import stages
//!
//! Each stage takes the run context and the previous state and returns the
//! new state with the errors it observed. Only stage 1 can abort a run.

pub mod cells;
pub mod generations;
pub mod links;
pub mod provisioning;

pub use cells::{classify_row, create_cells, RowClassification, ALREADY_REGISTERED};
pub use generations::create_generations;
pub use links::link_leaders;
pub use provisioning::{leader_requests, provision_leaders, MISSING_RESULT};
