use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, decode, expect_field};
use crate::models::User;

use super::Api;

/// Assignee id GitLab interprets as "nobody".
const NO_ASSIGNEE: u64 = 0;

pub struct AssignCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl AssignCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![
                ArgumentSpec::new("iid", "issue iid").required().at(0),
                ArgumentSpec::new("user", "username").required().at(1),
            ],
        }
    }
}

impl CommandHandler for AssignCommand {
    fn command(&self) -> &'static str {
        "assign"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "assign an issue to a user"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let iid = args.require("iid")?;
        let username = args.require("user")?;

        let response = self
            .api
            .transport()
            .get(&self.api.resources().users_by_name(username))?;
        let users: Vec<User> = decode(&response)?;
        // the users endpoint also matches partial names
        let user = users
            .into_iter()
            .find(|user| user.username == username)
            .ok_or_else(|| CommandError::NotFound(format!("No user found: {username}")))?;

        set_assignee(&self.api, iid, user.id)?;
        writeln!(out, "Assigned issue {iid} to {}", user.username)?;
        Ok(())
    }
}

pub struct UnassignCommand {
    api: Api,
    specs: Vec<ArgumentSpec>,
}

impl UnassignCommand {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            specs: vec![ArgumentSpec::new("iid", "issue iid").required().at(0)],
        }
    }
}

impl CommandHandler for UnassignCommand {
    fn command(&self) -> &'static str {
        "unassign"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "remove all assignees from an issue"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let iid = args.require("iid")?;

        set_assignee(&self.api, iid, NO_ASSIGNEE)?;
        writeln!(out, "Unassigned issue {iid}")?;
        Ok(())
    }
}

fn set_assignee(api: &Api, iid: &str, user_id: u64) -> Result<(), CommandError> {
    let url = api.resources().assign_issue(iid, user_id);
    let response = api.transport().put(&url)?;
    expect_field(&response.body, "iid")?;
    Ok(())
}
