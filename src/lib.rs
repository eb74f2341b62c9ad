// Cell Import - Generation, cell and leader import pipeline
// Copyright (c) 2025 Cell Import Contributors
// Licensed under the MIT License

//! # Cell Import
//!
//! Cell Import materializes an organization's generation, cell and leader
//! hierarchy from a single spreadsheet file.
//!
//! ## Overview
//!
//! A run goes through:
//! - **Validation** of every row against the column rules, with all errors
//!   reported at once
//! - **Reconciliation** with the organization's existing generations and
//!   leader emails
//! - **Import** in four ordered stages: generations, leader accounts, cells
//!   and leader links
//! - **Export** of a one-time credentials file for the new leaders
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Validation, reconciliation, orchestration and export
//! - [`adapters`] - The organization store and the identity provider
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cell_import::config::load_config;
//! use cell_import::core::pipeline::ImportPipeline;
//! use cell_import::core::progress::ProgressReporter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cell-import.toml")?;
//!     let organization = config
//!         .import
//!         .default_organization()
//!         .ok_or("import.organization_id is not set")?;
//!
//!     let pipeline = ImportPipeline::from_config(&config).await?;
//!     let text = std::fs::read_to_string("celulas.csv")?;
//!
//!     let preview = pipeline.preview(&organization, &text).await?;
//!     if preview.summary.is_none() {
//!         for error in &preview.validated.errors {
//!             eprintln!("{error}");
//!         }
//!         return Ok(());
//!     }
//!
//!     let progress = Arc::new(ProgressReporter::new());
//!     let report = pipeline.import(&organization, &text, progress).await?;
//!     println!("{} of {} rows imported", report.successful_rows, report.total_rows);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], an alias over
//! [`domain::CellImportError`]. Row-level failures during an import are not
//! errors: they end up as error rows in the [`core::import::ImportReport`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
