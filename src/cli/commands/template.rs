//! Template command implementation

use crate::core::ingest::{template_csv, TEMPLATE_FILENAME};
use clap::Args;
use std::path::Path;

/// Arguments for the template command
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(short, long, default_value = TEMPLATE_FILENAME)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl TemplateArgs {
    /// Execute the template command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ File already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        std::fs::write(&self.output, template_csv())?;
        tracing::info!(output = %self.output, "Template written");

        println!("✅ Template written: {}", self.output);
        println!("   Fill one row per cell and run: cell-import preview {}", self.output);
        Ok(0)
    }
}
