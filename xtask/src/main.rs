mod commands;
mod workspace;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Workspace maintenance tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format all code
    Fmt,
    /// Run clippy with warnings denied
    Clippy,
    /// Report per-crate source line counts against the workspace's budget
    Size,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let root = workspace_root();

    match cli.command {
        Commands::Fmt => commands::fmt::run_fmt(),
        Commands::Clippy => commands::clippy::run_clippy(),
        Commands::Size => commands::size::show_size_report(&root),
    }
}

/// `xtask` always runs from `cargo xtask ...` at the workspace root, one
/// level below this binary's own crate directory.
fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("xtask crate has a parent directory")
        .to_path_buf()
}
