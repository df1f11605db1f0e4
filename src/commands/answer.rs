use std::io::Write;

use crate::args::{ArgumentSpec, Bindings};
use crate::handler::{CommandError, CommandHandler, expect_field};
use crate::models::Discussion;
use crate::pagination::fetch_all;
use crate::prompt::Prompt;

use super::{Api, render_notes};

const QUIT: &str = "q";
const QUESTION: &str = "reply (empty to skip, q to quit)> ";

pub struct AnswerCommand {
    api: Api,
    prompt: Box<dyn Prompt>,
    specs: Vec<ArgumentSpec>,
}

/// What the user typed in response to a thread.
enum Reply {
    Skip,
    Quit,
    Text(String),
}

impl Reply {
    fn from_input(input: Option<String>) -> Self {
        let Some(line) = input else {
            return Reply::Quit;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            Reply::Skip
        } else if trimmed == QUIT {
            Reply::Quit
        } else {
            Reply::Text(line)
        }
    }
}

impl AnswerCommand {
    pub fn new(api: Api, prompt: Box<dyn Prompt>) -> Self {
        Self {
            api,
            prompt,
            specs: vec![ArgumentSpec::new("iid", "merge request iid").required().at(0)],
        }
    }
}

impl CommandHandler for AnswerCommand {
    fn command(&self) -> &'static str {
        "answer"
    }

    fn specs(&self) -> &[ArgumentSpec] {
        &self.specs
    }

    fn help_text(&self) -> &'static str {
        "walk the unresolved threads of a merge request and reply to them"
    }

    fn execute(&mut self, args: &Bindings, out: &mut dyn Write) -> Result<(), CommandError> {
        let iid = args.require("iid")?;
        let resources = self.api.resources();

        let discussions: Vec<Discussion> =
            fetch_all(self.api.transport(), &resources.merge_request_discussions(iid))?;
        let open: Vec<Discussion> = discussions
            .into_iter()
            .filter(Discussion::is_unresolved)
            .collect();
        if open.is_empty() {
            writeln!(out, "No unresolved threads on !{iid}")?;
            return Ok(());
        }

        for (index, discussion) in open.iter().enumerate() {
            writeln!(out, "Thread {} of {}", index + 1, open.len())?;
            render_notes(out, &discussion.notes)?;
            // the prompt writes to the terminal directly
            out.flush()?;

            match Reply::from_input(self.prompt.ask(QUESTION)?) {
                Reply::Quit => break,
                Reply::Skip => continue,
                Reply::Text(body) => {
                    let url = resources.discussion_notes(iid, &discussion.id);
                    let response = self.api.transport().post(&url, &[("body", body.as_str())])?;
                    expect_field(&response.body, "id")?;
                    tracing::debug!(status = response.status, discussion = %discussion.id, "reply posted");
                    writeln!(out, "Replied")?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTransport, PROJECT, ScriptedPrompt, api, execute};
    use serde_json::json;
    use std::rc::Rc;

    fn discussions_url() -> String {
        format!("{PROJECT}/merge_requests/8/discussions")
    }

    fn thread(id: &str, body: &str, resolved: bool) -> serde_json::Value {
        json!({
            "id": id,
            "notes": [{
                "body": body, "author": {"id": 2, "username": "bob"},
                "resolvable": true, "resolved": resolved
            }]
        })
    }

    fn seed(fake: &FakeTransport) {
        fake.respond_page(
            &discussions_url(),
            json!([
                thread("d1", "Rename this?", false),
                thread("d2", "Done already", true),
                thread("d3", "Add a test", false),
                {"id": "d4", "notes": [{"body": "Nice", "author": {"id": 2, "username": "bob"}}]}
            ]),
            1,
            1,
            4,
        );
    }

    fn reply_url(discussion: &str) -> String {
        format!("{PROJECT}/merge_requests/8/discussions/{discussion}/notes")
    }

    #[test]
    fn replies_to_unresolved_threads_only() {
        let fake = Rc::new(FakeTransport::new());
        seed(&fake);
        fake.respond("POST", &reply_url("d1"), json!({"id": 100}))
            .respond("POST", &reply_url("d3"), json!({"id": 101}));
        let prompt = ScriptedPrompt::new(&["Sure", "Added"]);
        let questions = prompt.questions();

        let mut command = AnswerCommand::new(api(&fake), Box::new(prompt));
        let (result, output) = execute(&mut command, &["8"]);

        assert!(result.is_ok(), "{result:?}");
        assert_eq!(questions.borrow().len(), 2);
        let posted: Vec<(String, Vec<(String, String)>)> = fake
            .mutations()
            .into_iter()
            .map(|request| (request.url, request.form))
            .collect();
        assert_eq!(
            posted,
            [
                (reply_url("d1"), vec![("body".to_string(), "Sure".to_string())]),
                (reply_url("d3"), vec![("body".to_string(), "Added".to_string())]),
            ]
        );
        assert!(output.contains("Thread 1 of 2\n--------\nauthor bob (-): Rename this?\n"));
        assert!(!output.contains("Done already"));
    }

    #[test]
    fn empty_reply_skips_and_q_stops() {
        let fake = Rc::new(FakeTransport::new());
        seed(&fake);
        let prompt = ScriptedPrompt::new(&["  ", "q"]);
        let questions = prompt.questions();

        let mut command = AnswerCommand::new(api(&fake), Box::new(prompt));
        let (result, _) = execute(&mut command, &["8"]);

        assert!(result.is_ok());
        assert_eq!(questions.borrow().len(), 2);
        assert!(fake.mutations().is_empty());
    }

    #[test]
    fn end_of_input_stops() {
        let fake = Rc::new(FakeTransport::new());
        seed(&fake);
        let prompt = ScriptedPrompt::default();
        let questions = prompt.questions();

        let mut command = AnswerCommand::new(api(&fake), Box::new(prompt));
        let (result, output) = execute(&mut command, &["8"]);

        assert!(result.is_ok());
        assert_eq!(questions.borrow().as_slice(), [QUESTION]);
        assert!(!output.contains("Thread 2"));
    }

    #[test]
    fn reply_without_id_is_a_shape_failure() {
        let fake = Rc::new(FakeTransport::new());
        seed(&fake);
        fake.respond("POST", &reply_url("d1"), json!({"message": "accepted"}));

        let mut command = AnswerCommand::new(api(&fake), Box::new(ScriptedPrompt::new(&["ok"])));
        let (result, _) = execute(&mut command, &["8"]);

        assert!(matches!(result, Err(CommandError::Shape(_))));
    }

    #[test]
    fn nothing_to_answer() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond_page(&discussions_url(), json!([thread("d2", "Done", true)]), 1, 1, 1);

        let mut command = AnswerCommand::new(api(&fake), Box::new(ScriptedPrompt::default()));
        let (result, output) = execute(&mut command, &["8"]);

        assert!(result.is_ok());
        assert_eq!(output, "No unresolved threads on !8\n");
    }
}
