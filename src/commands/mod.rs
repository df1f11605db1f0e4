//! The commands `glc` understands.

mod answer;
mod assign;
mod branches;
mod delready;
mod issue;
mod list;
mod mr;
mod mv;
mod pipes;

use std::io::{self, Write};
use std::rc::Rc;

use chrono::DateTime;

use crate::dispatcher::{Dispatcher, RegistryError};
use crate::models::Note;
use crate::prompt::Prompt;
use crate::resources::Resources;
use crate::transport::Transport;

pub use answer::AnswerCommand;
pub use assign::{AssignCommand, UnassignCommand};
pub use branches::BranchesCommand;
pub use delready::DelReadyCommand;
pub use issue::IssueCommand;
pub use list::ListCommand;
pub use mr::MergeRequestCommand;
pub use mv::MoveCommand;
pub use pipes::PipesCommand;

/// What every command needs to reach GitLab.
#[derive(Clone)]
pub struct Api {
    transport: Rc<dyn Transport>,
    resources: Rc<Resources>,
}

impl Api {
    pub fn new(transport: Rc<dyn Transport>, resources: Resources) -> Self {
        Self {
            transport,
            resources: Rc::new(resources),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }
}

/// Registers every command, in help-listing order.
pub fn dispatcher(
    program: &str,
    api: Api,
    prompt: Box<dyn Prompt>,
) -> Result<Dispatcher, RegistryError> {
    let mut dispatcher = Dispatcher::new(program);
    dispatcher.register(Box::new(ListCommand::new(api.clone())))?;
    dispatcher.register(Box::new(AssignCommand::new(api.clone())))?;
    dispatcher.register(Box::new(UnassignCommand::new(api.clone())))?;
    dispatcher.register(Box::new(PipesCommand::new(api.clone())))?;
    dispatcher.register(Box::new(BranchesCommand::new(api.clone())))?;
    dispatcher.register(Box::new(MoveCommand::new(api.clone())))?;
    dispatcher.register(Box::new(DelReadyCommand::new(api.clone())))?;
    dispatcher.register(Box::new(MergeRequestCommand::new(api.clone())))?;
    dispatcher.register(Box::new(IssueCommand::new(api.clone())))?;
    dispatcher.register(Box::new(AnswerCommand::new(api, prompt)))?;
    Ok(dispatcher)
}

/// Prints user notes oldest first; system notes are skipped.
fn render_notes(out: &mut dyn Write, notes: &[Note]) -> io::Result<()> {
    for note in notes.iter().filter(|note| !note.system) {
        writeln!(out, "--------")?;
        writeln!(
            out,
            "author {} ({}): {}",
            note.author.username,
            format_timestamp(note.created_at.as_deref()),
            note.body
        )?;
    }
    Ok(())
}

fn format_timestamp(raw: Option<&str>) -> String {
    raw.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
