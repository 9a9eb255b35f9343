mod cli;
mod commands;
mod mcp;
mod page_range;
mod pdf;
mod splitter;
mod warnings;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use splitter::SplitOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Split {
            path,
            output_dir,
            max_title_len,
        } => {
            let options = SplitOptions { max_title_len };
            commands::split::run(&path, &output_dir, &options)?;
        }
        Commands::Toc { path, all } => {
            commands::toc::run(&path, all)?;
        }
    }

    Ok(())
}

// stdout is reserved for command output and the MCP transport
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
