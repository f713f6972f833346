use crate::utils::config::Config;
use log::{debug, warn};
pub use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use rustyline::{CompletionType, Config as RLConfig};

pub struct ReadlineManager<'a> {
    config: &'a Config,
    editor: Editor<(), FileHistory>,
}

impl<'a> ReadlineManager<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let editor = Editor::with_config(rl_config)?;
        Ok(Self { config, editor })
    }

    /// A missing history file is normal on first start.
    pub fn load_history(&mut self) {
        match self.editor.load_history(&self.config.history_file) {
            Ok(()) => debug!("history loaded from {}", self.config.history_file.display()),
            Err(err) => warn!(
                "cannot load history {}: {}",
                self.config.history_file.display(),
                err
            ),
        }
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: &str) -> Result<bool, ReadlineError> {
        self.editor.add_history_entry(line)
    }

    pub fn save_history(&mut self) {
        match self.editor.save_history(&self.config.history_file) {
            Ok(()) => debug!("history saved"),
            Err(err) => warn!(
                "cannot save history {}: {}",
                self.config.history_file.display(),
                err
            ),
        }
    }
}
