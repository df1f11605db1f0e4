use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler};
use crate::models::Branch;
use crate::pagination::fetch_all;
use crate::table::Table;

use super::Api;

pub struct BranchesCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl BranchesCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("search", "only branches whose name contains this").at(0),
                ArgumentSpec::new("id", "branch id"),
            ],
        }
    }

    /// Query string of the bound filters, in declaration order.
    fn filters(&self, args: &Bindings) -> String {
        self.specs
            .iter()
            .map(|spec| args.serialize(spec.token()))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl CommandHandler for BranchesCommand {
    fn command(&self) -> &'static str {
        "branches"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "list repository branches with their last commit"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let url = self.api.resources().branches(&self.filters(args));
        let branches: Vec<Branch> = fetch_all(self.api.transport(), &url)?;

        let mut table = Table::new(["name", "merged", "author", "commit", "hash"]);
        for branch in branches {
            table.push_row(vec![
                branch.name,
                branch.merged.to_string(),
                branch.commit.author_name,
                branch.commit.title,
                branch.commit.short_id,
            ]);
        }
        table.render(out)?;

        Ok(())
    }
}
