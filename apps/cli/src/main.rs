//! ContactScout CLI: find contact emails for a CSV list of companies.
//!
//! Reads a company sheet, asks Gemini (with Google Search grounding) for each
//! company's contact address, and writes the sheet back with an `EMAIL` column.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
