//! Resolves the command word to a handler and runs it.

use std::io::Write;

use thiserror::Error;

use crate::args::{SpecError, validate_specs};
use crate::handler::{BindOutcome, CommandError, CommandHandler};

/// Command words answered with the full listing.
const HELP_COMMANDS: [&str; 2] = ["-h", "help"];

const HELP_HEADER: &str = "\
Help

[Req].. required parameter
[P<n>].. parameter may be given bare as argument n
-name=value or -namevalue passes a parameter by name

-h/help - show this listing
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command {0} is registered twice")]
    DuplicateCommand(&'static str),

    #[error("invalid arguments for command {command}: {source}")]
    InvalidSpecs {
        command: &'static str,
        source: SpecError,
    },
}

pub struct Dispatcher {
    program: String,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Box<dyn CommandHandler>) -> Result<(), RegistryError> {
        let command = handler.command();
        if self.resolve(command).is_some() {
            return Err(RegistryError::DuplicateCommand(command));
        }
        validate_specs(handler.specs())
            .map_err(|source| RegistryError::InvalidSpecs { command, source })?;

        self.handlers.push(handler);
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, command: &str) -> Option<&dyn CommandHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.command() == command)
            .map(|handler| handler.as_ref())
    }

    /// Legend followed by one help line per command, in registration order.
    pub fn help_listing(&self) -> String {
        let mut listing = String::from(HELP_HEADER);
        for handler in &self.handlers {
            listing.push_str(&handler.help());
            listing.push('\n');
        }
        listing
    }

    /// Run the command named by `argv[1]` with the remaining arguments.
    ///
    /// Usage problems and recoverable command failures are written to `out`;
    /// only fatal errors are returned.
    pub fn run(&mut self, argv: &[String], out: &mut dyn Write) -> Result<(), CommandError> {
        let Some(command) = argv.get(1) else {
            writeln!(out, "Usage: {} <command> [arg ...]\n", self.program)?;
            write!(out, "{}", self.help_listing())?;
            return Ok(());
        };

        if HELP_COMMANDS.contains(&command.as_str()) {
            write!(out, "{}", self.help_listing())?;
            return Ok(());
        }

        let Some(index) = self
            .handlers
            .iter()
            .position(|handler| handler.command() == command.as_str())
        else {
            writeln!(out, "Command not recognized: {command}\n")?;
            write!(out, "{}", self.help_listing())?;
            return Ok(());
        };

        let handler = &mut self.handlers[index];
        match handler.bind(&argv[2..]) {
            BindOutcome::Bound(bindings) => {
                tracing::debug!(command = %command, ?bindings, "executing");
                match handler.execute(&bindings, out) {
                    Ok(()) => Ok(()),
                    Err(err) if err.is_fatal() => Err(err),
                    Err(err) => {
                        tracing::debug!(command = %command, error = ?err, "command failed");
                        writeln!(out, "error: {err}")?;
                        Ok(())
                    }
                }
            }
            BindOutcome::HelpRequested { unmatched } => {
                writeln!(out, "Unknown argument for {command}: {unmatched}")?;
                writeln!(out, "{}", handler.help())?;
                Ok(())
            }
            BindOutcome::ValidationFailed { missing } => {
                let missing: Vec<String> = missing.iter().map(|token| format!("-{token}")).collect();
                writeln!(
                    out,
                    "Missing required argument(s) for {command}: {}",
                    missing.join(", ")
                )?;
                writeln!(out, "{}", handler.help())?;
                Ok(())
            }
        }
    }
}
