//! # commitgen
//!
//! AI-powered commit messages from staged git changes.
//!
//! The interesting part lives in [`token`]: a model registry, a token
//! counter, a budget calculator, and a diff truncator that together decide
//! how much of a (possibly huge) diff fits into a model's context window
//! while reserving room for the model's reply. Everything else — git
//! access, prompt templates, provider clients, the CLI — feeds that core
//! or consumes its output.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod error;
pub mod generate;
pub mod git;
pub mod prompts;
pub mod token;

pub use crate::cli::Cli;
pub use crate::error::GenerateError;

/// The current version of commitgen.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
