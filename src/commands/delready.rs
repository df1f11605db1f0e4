use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, expect_field};
use crate::models::Issue;
use crate::pagination::fetch_all;

use super::Api;

const DEFAULT_LABEL: &str = "Ready";

pub struct DelReadyCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl DelReadyCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("list", "board list label").required().at(0),
                ArgumentSpec::new("label", "label to remove, Ready if omitted").at(1),
            ],
        }
    }
}

impl CommandHandler for DelReadyCommand {
    fn command(&self) -> &'static str {
        "delready"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "remove the Ready label from every issue in a board list"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let list = args.require("list")?;
        let label = args.get("label").unwrap_or(DEFAULT_LABEL);

        let url = self.api.resources().issues_with_labels(&[list, label]);
        let issues: Vec<Issue> = fetch_all(self.api.transport(), &url)?;
        if issues.is_empty() {
            writeln!(out, "No issues in {list} carry {label}")?;
            return Ok(());
        }

        for issue in issues {
            let remaining: Vec<&str> = issue
                .labels
                .iter()
                .map(String::as_str)
                .filter(|name| *name != label)
                .collect();

            let iid = issue.iid.to_string();
            let response = self
                .api
                .transport()
                .put(&self.api.resources().issue_labels(&iid, &remaining))?;
            expect_field(&response.body, "iid")?;
            writeln!(out, "Removed {label} from {iid} {}", issue.title)?;
        }

        Ok(())
    }
}
