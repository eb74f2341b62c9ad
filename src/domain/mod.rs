//! Domain models and types.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`OrganizationId`], [`GenerationId`], [`CellId`], [`LeaderId`])
//! - **Input rows** ([`ImportRow`], [`Weekday`], [`ValidationError`])
//! - **Store and identity records** ([`GenerationRecord`], [`CellRecord`], [`LeaderLink`],
//!   [`LeaderAccountRequest`], [`LeaderAccountResult`])
//! - **Per-row results** ([`ImportResultRow`], [`ImportStatus`])
//! - **Error types** ([`CellImportError`], [`StoreError`], [`IdentityError`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CellImportError>`]:
//!
//! ```rust,no_run
//! use cell_import::domain::{CellImportError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = cell_import::config::load_config("cell-import.toml")?;
//!     Ok(())
//! }
//! ```

pub mod entities;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod result;
pub mod row;

// Re-export commonly used types for convenience
pub use entities::{
    CellRecord, GenerationRecord, GenerationRef, LeaderAccountRequest, LeaderAccountResult,
    LeaderLink, ProvisioningStatus,
};
pub use errors::{CellImportError, IdentityError, StoreError};
pub use ids::{CellId, GenerationId, LeaderId, OrganizationId};
pub use outcome::{ImportResultRow, ImportStatus};
pub use result::Result;
pub use row::{ImportRow, ValidationError, Weekday, DEFAULT_GENERATION_COLOR};
