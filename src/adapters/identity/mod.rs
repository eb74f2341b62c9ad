//! Identity provider adapters
//!
//! Leader accounts are created through [`IdentityProvisioner`]. The HTTP
//! implementation talks to the provisioning endpoint; the in-memory one backs
//! dry runs and tests.

pub mod http;
pub mod memory;
pub mod models;
pub mod traits;

pub use http::HttpIdentityProvisioner;
pub use memory::InMemoryIdentityProvisioner;
pub use traits::{IdentityProvisioner, ProvisionedAccount};
