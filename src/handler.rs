//! The contract every command implements, and argument binding.

use std::io::Write;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::args::{ArgToken, ArgumentSpec, Bindings, TokenMatch, UnboundArgument};
use crate::pagination::PaginationError;
use crate::prompt::PromptError;
use crate::transport::{Response, TransportError};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Unexpected response: {0}")]
    Shape(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Unbound(#[from] UnboundArgument),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CommandError {
    /// Fatal errors end the process; the rest are reported and the command
    /// is abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::Transport(_) | CommandError::Output(_))
    }
}

impl From<PaginationError> for CommandError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::Transport(err) => CommandError::Transport(err),
            other => CommandError::Shape(other.to_string()),
        }
    }
}

/// Result of binding input arguments against a spec list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Bound(Bindings),
    /// Every input matched, but required arguments are absent.
    ValidationFailed { missing: Vec<&'static str> },
    /// An input matched no spec.
    HelpRequested { unmatched: String },
}

/// Bind `args` against `specs`.
///
/// A named input goes to the unbound spec whose token it spells out exactly;
/// failing that, to the unbound spec with the longest token it starts with.
/// A bare input goes to the first unbound spec declaring its position. An
/// input nobody takes stops binding at once.
pub fn bind(specs: &[ArgumentSpec], args: &[String]) -> BindOutcome {
    let mut slots: Vec<Option<String>> = vec![None; specs.len()];

    for (position, input) in args.iter().enumerate() {
        let unbound: Vec<(usize, &ArgumentSpec)> = specs
            .iter()
            .enumerate()
            .filter(|(index, _)| slots[*index].is_none())
            .collect();

        let matched = match ArgToken::parse(input) {
            ArgToken::Named(rest) => {
                let candidates: Vec<(usize, &ArgumentSpec, TokenMatch<'_>)> = unbound
                    .iter()
                    .filter_map(|&(index, spec)| {
                        spec.match_token(rest).map(|found| (index, spec, found))
                    })
                    .collect();
                candidates
                    .iter()
                    .find(|(_, _, found)| matches!(found, TokenMatch::Exact(_)))
                    .or_else(|| {
                        candidates
                            .iter()
                            .max_by_key(|(_, spec, _)| spec.token().len())
                    })
                    .map(|(index, _, found)| (*index, found.value()))
            }
            ArgToken::Positional(_) => unbound.iter().find_map(|&(index, spec)| {
                spec.fetch(input, position).map(|value| (index, value))
            }),
        };

        match matched {
            Some((index, value)) => slots[index] = Some(value.to_string()),
            None => {
                return BindOutcome::HelpRequested {
                    unmatched: input.clone(),
                };
            }
        }
    }

    let missing: Vec<&'static str> = specs
        .iter()
        .zip(&slots)
        .filter(|(spec, slot)| spec.is_required() && slot.is_none())
        .map(|(spec, _)| spec.token())
        .collect();
    if !missing.is_empty() {
        return BindOutcome::ValidationFailed { missing };
    }

    BindOutcome::Bound(Bindings::from_slots(specs, slots))
}

/// One-line usage for a command: its arguments followed by `help_text`.
pub fn render_help(command: &str, specs: &[ArgumentSpec], help_text: &str) -> String {
    let mut help = command.to_string();
    for spec in specs {
        help.push(' ');
        help.push_str(&spec.help());
    }
    help.push_str(" - ");
    help.push_str(help_text);
    help
}

pub trait CommandHandler {
    /// Name the command is invoked by; matched exactly.
    fn command(&self) -> &'static str;

    fn specs(&self) -> &[ArgumentSpec];

    fn help_text(&self) -> &'static str;

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError>;

    fn bind(&self, args: &[String]) -> BindOutcome {
        bind(self.specs(), args)
    }

    fn help(&self) -> String {
        render_help(self.command(), self.specs(), self.help_text())
    }
}

/// Decode a response body, treating a mismatch as a shape failure.
pub fn decode<T: DeserializeOwned>(response: &Response) -> Result<T, CommandError> {
    response
        .json()
        .map_err(|e| CommandError::Shape(e.to_string()))
}

/// Look up a field a successful mutation must echo back.
pub fn expect_field<'a>(body: &'a Value, field: &str) -> Result<&'a Value, CommandError> {
    body.get(field)
        .ok_or_else(|| CommandError::Shape(format!("response lacks field {field}")))
}
