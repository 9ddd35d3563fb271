//! CLI interface for commitgen

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commit;
pub mod models;

/// commitgen: AI-assisted commit messages from staged changes
#[derive(Parser)]
#[command(name = "commitgen")]
#[command(about = "Generate commit messages from staged changes with an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a commit message for staged changes
    Commit(commit::CommitCommand),
    /// List known models and providers
    Models(models::ModelsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Commit(commit_cmd) => commit_cmd.execute().await,
            Commands::Models(models_cmd) => models_cmd.execute(),
        }
    }
}
