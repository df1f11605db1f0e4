//! Interactive console input.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read input: {0}")]
    Readline(#[from] ReadlineError),
}

pub trait Prompt {
    /// Show `question` and wait for a line. `None` means the user ended input
    /// (Ctrl-C or Ctrl-D).
    fn ask(&mut self, question: &str) -> Result<Option<String>, PromptError>;
}

/// Line editor on the terminal, created on first use.
#[derive(Default)]
pub struct ConsolePrompt {
    editor: Option<DefaultEditor>,
}

impl Prompt for ConsolePrompt {
    fn ask(&mut self, question: &str) -> Result<Option<String>, PromptError> {
        let mut editor = match self.editor.take() {
            Some(editor) => editor,
            None => DefaultEditor::new()?,
        };

        let line = editor.readline(question);
        self.editor = Some(editor);

        match line {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
