//! brochure CLI — turn a company website into a short markdown brochure.
//!
//! Fetches the site, asks a local Ollama model which pages matter, and
//! renders the model's brochure to stdout.

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
