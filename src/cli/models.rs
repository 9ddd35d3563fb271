//! The `models` subcommand: list the known model catalog.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ai::Provider;
use crate::token::registry::model_registry;

/// List known models and providers
#[derive(Args)]
pub struct ModelsCommand {
    /// Only show models for this provider
    #[arg(short, long)]
    pub provider: Option<Provider>,
}

impl ModelsCommand {
    /// Execute the models command
    pub fn execute(self) -> Result<()> {
        let registry = model_registry();
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);

        let providers: Vec<Provider> = match self.provider {
            Some(p) => vec![p],
            None => Provider::all().to_vec(),
        };

        for provider in providers {
            let Some(config) = registry.provider(provider.as_str()) else {
                continue;
            };

            stdout.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Cyan)))?;
            writeln!(stdout, "{}", provider)?;
            stdout.reset()?;
            writeln!(stdout, "  key: {}", config.env_var)?;

            for model in registry.models_for_provider(provider.as_str()) {
                let marker = if model.id == config.default_model {
                    " (default)"
                } else {
                    ""
                };
                writeln!(
                    stdout,
                    "  {:<40} {:>7} tokens{}",
                    model.id, model.context_window, marker
                )?;
            }
            writeln!(stdout)?;
        }
        Ok(())
    }
}
