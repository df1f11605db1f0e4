use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, decode};
use crate::models::{MergeRequest, Note};
use crate::pagination::fetch_all;
use crate::table::Table;

use super::{Api, render_notes};

pub struct MergeRequestCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl MergeRequestCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![ArgumentSpec::new("iid", "merge request iid").at(0)],
        }
    }

    fn list_open(&self, out: &mut dyn Write) -> Result<(), CommandError> {
        let url = self.api.resources().open_merge_requests();
        let merge_requests: Vec<MergeRequest> = fetch_all(self.api.transport(), &url)?;

        let mut table = Table::new([
            "id", "upvotes", "title", "author", "notes", "draft", "status", "url",
        ]);
        for mr in merge_requests {
            let draft = if mr.is_draft() { "yes" } else { "no" };
            table.push_row(vec![
                mr.iid.to_string(),
                mr.upvotes.to_string(),
                mr.title,
                mr.author.username,
                mr.user_notes_count.to_string(),
                draft.to_string(),
                mr.merge_status,
                mr.web_url,
            ]);
        }
        table.render(out)?;
        Ok(())
    }

    fn show(&self, iid: &str, out: &mut dyn Write) -> Result<(), CommandError> {
        let resources = self.api.resources();
        let response = self.api.transport().get(&resources.merge_request(iid))?;
        let mr: MergeRequest = decode(&response)?;

        writeln!(out, "Title: {}", mr.title)?;
        writeln!(out, "Description: {}", mr.description.as_deref().unwrap_or(""))?;
        writeln!(out, "Author: {}", mr.author.username)?;
        writeln!(out, "Branch: {}", mr.source_branch)?;
        writeln!(out, "Upvotes: {}", mr.upvotes)?;
        writeln!(out, "MR-Status: {}", mr.merge_status)?;
        writeln!(out, "Draft: {}", mr.is_draft())?;

        let notes: Vec<Note> = fetch_all(self.api.transport(), &resources.merge_request_notes(iid))?;
        render_notes(out, &notes)?;
        Ok(())
    }
}

impl CommandHandler for MergeRequestCommand {
    fn command(&self) -> &'static str {
        "mr"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "list open merge requests, or show one with its comments"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        match args.get("iid") {
            Some(iid) => self.show(iid, out),
            None => self.list_open(out),
        }
    }
}
