use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, decode};
use crate::models::Pipeline;
use crate::table::Table;

use super::Api;

pub struct PipesCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl PipesCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("user", "only pipelines triggered by this username")
                    .at(0)
                    .display_as("username"),
            ],
        }
    }
}

impl CommandHandler for PipesCommand {
    fn command(&self) -> &'static str {
        "pipes"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "show the latest pipelines"
    }

    /// Only the first page is shown; it holds the most recent pipelines.
    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let url = self.api.resources().pipelines(&args.query());
        let response = self.api.transport().get(&url)?;
        let pipelines: Vec<Pipeline> = decode(&response)?;

        let mut table = Table::new(["id", "status", "ref", "url"]);
        for pipeline in pipelines {
            table.push_row(vec![
                pipeline.id.to_string(),
                pipeline.status,
                pipeline.git_ref,
                pipeline.web_url,
            ]);
        }
        table.render(out)?;

        Ok(())
    }
}
