//! sitekit CLI — documentation site support tools.
//!
//! Generates in-page tables of contents, fills repository star-count widgets,
//! and builds or queries the client-side search index.

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
