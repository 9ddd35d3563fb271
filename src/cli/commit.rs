//! The `commit` subcommand: generate, confirm, and create the commit.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Select;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;

use crate::ai::{create_client, resolve_api_key, Provider};
use crate::error::GenerateError;
use crate::generate::{
    generate_commit_message, CommitMessageOptions, ConfirmAction, GeneratedMessage,
    DEFAULT_OUTPUT_RESERVE,
};
use crate::git::GitRepository;
use crate::prompts::CommitStyle;

/// Generate a commit message for staged changes
#[derive(Args)]
pub struct CommitCommand {
    /// Commit message style (conventional, detailed, simple)
    #[arg(short, long, default_value = "conventional")]
    pub style: CommitStyle,

    /// Provider to use (openai, groq, claude, openrouter)
    #[arg(short, long, default_value = "openai")]
    pub provider: Provider,

    /// Model override; the provider's default model when omitted
    #[arg(short, long)]
    pub model: Option<String>,

    /// API key; falls back to the provider's environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Stage all changes before generating
    #[arg(short = 'a', long)]
    pub stage_all: bool,

    /// Print the message without committing
    #[arg(long)]
    pub no_commit: bool,

    /// Cap on diff tokens sent to the model
    #[arg(long)]
    pub max_diff_tokens: Option<usize>,

    /// Tokens reserved for the model's reply
    #[arg(long, default_value_t = DEFAULT_OUTPUT_RESERVE)]
    pub output_tokens: usize,

    /// Commit without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl CommitCommand {
    /// Execute the commit command
    pub async fn execute(self) -> Result<()> {
        let repo = GitRepository::discover()?;

        if self.stage_all {
            repo.stage_all()?;
        }

        if !repo.has_staged_changes()? {
            println!("No staged changes. Stage files with 'git add' or pass --stage-all.");
            return Ok(());
        }

        let staged_files = repo.staged_files()?;
        let diff = repo.staged_diff()?;

        let api_key = resolve_api_key(self.provider, self.api_key.clone())?;
        let options = CommitMessageOptions {
            style: self.style,
            provider: self.provider,
            model: self.model.clone(),
            output_reserve: self.output_tokens,
            max_diff_tokens: self.max_diff_tokens,
        };
        let model = options.resolve_model();
        let client = create_client(self.provider, model.clone(), api_key)?;
        debug!(provider = %self.provider, model = %model, files = staged_files.len(), "generating commit message");

        let generated =
            match generate_commit_message(&options, &diff, &staged_files, client.as_ref()).await {
                Ok(generated) => generated,
                Err(e) if is_empty_diff(&e) => {
                    println!("Staged changes produced an empty diff; nothing to describe.");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

        report_usage(&generated)?;
        print_message(&generated.message)?;

        if self.no_commit {
            return Ok(());
        }

        let mut message = generated.message;
        loop {
            let action = if self.yes {
                ConfirmAction::Commit
            } else {
                ask_confirmation()?
            };
            match action {
                ConfirmAction::Commit => {
                    let hash = repo.commit(&message)?;
                    print_success(&format!("Created commit {hash}"))?;
                    return Ok(());
                }
                ConfirmAction::Edit => {
                    message = edit_in_editor(&message)?;
                    print_message(&message)?;
                }
                ConfirmAction::Cancel => {
                    println!("Commit cancelled.");
                    return Ok(());
                }
            }
        }
    }
}

fn is_empty_diff(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<GenerateError>(), Some(GenerateError::EmptyDiff))
}

/// Prints the token allocation summary, coloring the truncation warning.
fn report_usage(generated: &GeneratedMessage) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    writeln!(stdout, "{}", generated.usage.allocation_line())?;

    if generated.usage.truncated {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(stdout, "{}", generated.usage.diff_line())?;
        if generated.truncation.excluded_count > 0 {
            writeln!(
                stdout,
                "  {} file(s) omitted from the prompt",
                generated.truncation.excluded_count
            )?;
        }
        stdout.reset()?;
    } else {
        writeln!(stdout, "{}", generated.usage.diff_line())?;
    }
    Ok(())
}

fn print_message(message: &str) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    writeln!(stdout)?;
    stdout.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(stdout, "Proposed commit message:")?;
    stdout.reset()?;
    writeln!(stdout, "{message}")?;
    writeln!(stdout)?;
    Ok(())
}

fn print_success(line: &str) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(stdout, "{line}")?;
    stdout.reset()?;
    Ok(())
}

/// Asks what to do with the proposed message.
fn ask_confirmation() -> Result<ConfirmAction> {
    let choice = Select::new()
        .with_prompt("Use this message?")
        .items(&["Commit", "Edit", "Cancel"])
        .default(0)
        .interact()
        .context("Confirmation prompt failed")?;

    Ok(match choice {
        0 => ConfirmAction::Commit,
        1 => ConfirmAction::Edit,
        _ => ConfirmAction::Cancel,
    })
}

/// Opens the message in `$EDITOR` and returns the edited text.
fn edit_in_editor(message: &str) -> Result<String> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    let mut file = tempfile::Builder::new()
        .prefix("COMMIT_EDITMSG")
        .suffix(".txt")
        .tempfile()
        .context("Failed to create temporary file for editing")?;
    file.write_all(message.as_bytes())
        .context("Failed to write message for editing")?;
    file.flush()?;

    let status = Command::new(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;
    if !status.success() {
        anyhow::bail!("Editor '{editor}' exited with failure; keeping previous message");
    }

    let edited = std::fs::read_to_string(file.path())
        .context("Failed to read edited message")?;
    Ok(edited.trim().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    use super::*;

    fn parse_commit(args: &[&str]) -> CommitCommand {
        let mut full = vec!["commitgen", "commit"];
        full.extend_from_slice(args);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Commit(cmd) => cmd,
            Commands::Models(_) => panic!("expected commit subcommand"),
        }
    }

    #[test]
    fn defaults() {
        let cmd = parse_commit(&[]);
        assert_eq!(cmd.style, CommitStyle::Conventional);
        assert_eq!(cmd.provider, Provider::OpenAi);
        assert_eq!(cmd.output_tokens, DEFAULT_OUTPUT_RESERVE);
        assert!(cmd.model.is_none());
        assert!(cmd.max_diff_tokens.is_none());
        assert!(!cmd.stage_all);
        assert!(!cmd.no_commit);
        assert!(!cmd.yes);
    }

    #[test]
    fn flags_parse() {
        let cmd = parse_commit(&[
            "--style",
            "detailed",
            "--provider",
            "groq",
            "--model",
            "qwen/qwen3-32b",
            "--max-diff-tokens",
            "2000",
            "--output-tokens",
            "800",
            "-a",
            "--no-commit",
            "-y",
        ]);
        assert_eq!(cmd.style, CommitStyle::Detailed);
        assert_eq!(cmd.provider, Provider::Groq);
        assert_eq!(cmd.model.as_deref(), Some("qwen/qwen3-32b"));
        assert_eq!(cmd.max_diff_tokens, Some(2000));
        assert_eq!(cmd.output_tokens, 800);
        assert!(cmd.stage_all);
        assert!(cmd.no_commit);
        assert!(cmd.yes);
    }

    #[test]
    fn bad_provider_is_rejected() {
        let result = Cli::try_parse_from(["commitgen", "commit", "--provider", "gemini"]);
        assert!(result.is_err());
    }
}
