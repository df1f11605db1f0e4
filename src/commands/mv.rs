use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, decode, expect_field};
use crate::models::{Board, Issue};
use crate::pagination::fetch_all;

use super::Api;

pub struct MoveCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl MoveCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("iid", "issue iid").required().at(0),
                ArgumentSpec::new("list", "board list label").required().at(1),
            ],
        }
    }

    /// Labels of every labelled list on every project board.
    fn board_labels(&self) -> Result<Vec<String>, CommandError> {
        let boards: Vec<Board> = fetch_all(self.api.transport(), &self.api.resources().boards())?;
        let mut labels: Vec<String> = Vec::new();
        for label in boards
            .into_iter()
            .flat_map(|board| board.lists)
            .filter_map(|list| list.label)
        {
            if !labels.contains(&label.name) {
                labels.push(label.name);
            }
        }
        Ok(labels)
    }
}

impl CommandHandler for MoveCommand {
    fn command(&self) -> &'static str {
        "mv"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "move an issue to another board list"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let iid = args.require("iid")?;
        let target = args.require("list")?;

        let board_labels = self.board_labels()?;
        if !board_labels.iter().any(|label| label == target) {
            return Err(CommandError::NotFound(format!(
                "List {target} not known. Known lists: {}",
                board_labels.join(", ")
            )));
        }

        let response = self.api.transport().get(&self.api.resources().issue(iid))?;
        let issue: Issue = decode(&response)?;

        let mut labels = Vec::with_capacity(issue.labels.len() + 1);
        for label in issue.labels {
            if board_labels.contains(&label) {
                writeln!(out, "Remove list label {label}")?;
            } else {
                labels.push(label);
            }
        }
        labels.push(target.to_string());
        writeln!(out, "Set labels {}", labels.join(", "))?;

        let url = self.api.resources().issue_labels(iid, &labels);
        let response = self.api.transport().put(&url)?;
        expect_field(&response.body, "iid")?;

        Ok(())
    }
}
