use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, decode};
use crate::models::{Issue, Note};
use crate::pagination::fetch_all;

use super::{Api, render_notes};

pub struct IssueCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl IssueCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![ArgumentSpec::new("iid", "issue iid").required().at(0)],
        }
    }
}

impl CommandHandler for IssueCommand {
    fn command(&self) -> &'static str {
        "issue"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "show an issue with its comments"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let iid = args.require("iid")?;
        let resources = self.api.resources();

        let response = self.api.transport().get(&resources.issue(iid))?;
        let issue: Issue = decode(&response)?;
        writeln!(out, "Title: {}", issue.title)?;
        writeln!(out, "State: {}", issue.state.as_deref().unwrap_or("-"))?;
        writeln!(out, "Assignee: {}", issue.assignee_username().unwrap_or("-"))?;
        writeln!(out, "Labels: {}", issue.labels.join(", "))?;
        if let Some(url) = &issue.web_url {
            writeln!(out, "Url: {url}")?;
        }
        if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "Description: {description}")?;
        }

        let notes: Vec<Note> = fetch_all(self.api.transport(), &resources.issue_notes(iid))?;
        render_notes(out, &notes)?;
        Ok(())
    }
}
