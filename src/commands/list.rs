use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler};
use crate::models::Issue;
use crate::pagination::fetch_all;
use crate::table::Table;

use super::Api;

pub struct ListCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl ListCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("label", "board list label").required().at(0),
                ArgumentSpec::new("user", "assignee username").at(1),
            ],
        }
    }
}

impl CommandHandler for ListCommand {
    fn command(&self) -> &'static str {
        "list"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "list open issues with a label, optionally only those assigned to a user"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let label = args.require("label")?;
        let user = args.get("user");

        let url = self.api.resources().issues_with_labels(&[label]);
        let issues: Vec<Issue> = fetch_all(self.api.transport(), &url)?;

        let mut table = Table::new(["id", "title", "labels", "assigned to"]);
        for issue in issues
            .iter()
            .filter(|issue| user.is_none_or(|user| issue.assignee_username() == Some(user)))
        {
            table.push_row(vec![
                issue.iid.to_string(),
                issue.title.clone(),
                issue.labels.join(", "),
                issue.assignee_username().unwrap_or("-").to_string(),
            ]);
        }
        table.render(out)?;

        Ok(())
    }
}
