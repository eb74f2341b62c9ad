//! External system integrations.
//!
//! The pipeline talks to two collaborators through trait seams:
//!
//! - [`store`] - the relational store holding generations, cells, links and
//!   leader profiles ([`store::OrganizationStore`])
//! - [`identity`] - the account provider that creates leader identities
//!   ([`identity::IdentityProvisioner`])
//!
//! Production implementations live in [`postgresql`] and
//! [`identity::http`]; in-memory implementations with scripted failures back
//! tests and rehearsals.
//!
//! # Example
//!
//! ```rust,no_run
//! use cell_import::adapters::factory::{create_identity_provisioner, create_store};
//! use cell_import::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cell-import.toml")?;
//! let store = create_store(&config).await?;
//! let identity = create_identity_provisioner(&config)?;
//! store.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod identity;
pub mod postgresql;
pub mod store;
