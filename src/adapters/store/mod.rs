//! Organization store abstraction and the in-memory implementation

pub mod memory;
pub mod traits;

pub use memory::InMemoryStore;
pub use traits::OrganizationStore;
