//! Terminal line input for the chat loop.
//!
//! `ChatInput` owns the `rustyline_async` prompt. Every line is classified
//! into a [`LineEvent`] before the loop sees it, and the prompt text follows
//! the session phase (signed out, idle, waiting for a reply).

use bookchat_core::chat::{ChatState, SessionPhase};
use console::style;
use rustyline_async::{Readline, ReadlineError, ReadlineEvent, SharedWriter};
use tracing::debug;

use super::commands::{self, ChatCommand};

/// One thing the user did at the prompt.
#[derive(Debug, PartialEq)]
pub enum LineEvent {
    /// Text for the recommender, trimmed. May be empty; the controller
    /// decides what a blank submission means.
    Message(String),
    /// A slash command.
    Command(ChatCommand),
    /// Ctrl+C.
    Interrupted,
    /// Ctrl+D, or the terminal went away.
    Closed,
}

impl LineEvent {
    /// Classify one raw line.
    pub fn from_line(line: &str) -> Self {
        match commands::parse(line) {
            Some(command) => LineEvent::Command(command),
            None => LineEvent::Message(line.trim().to_string()),
        }
    }

    fn worth_remembering(&self) -> bool {
        match self {
            LineEvent::Message(text) => !text.is_empty(),
            LineEvent::Command(_) => true,
            LineEvent::Interrupted | LineEvent::Closed => false,
        }
    }
}

/// Prompt reflecting who is signed in and whether a reply is pending.
pub fn prompt_for(state: &ChatState) -> String {
    match (state.identity(), state.phase()) {
        (None, _) => format!("  {} ", style("(signed out) >").dim()),
        (Some(identity), SessionPhase::Idle) => {
            format!("  {} ", style(format!("{} >", identity.display_name)).green().bold())
        }
        (Some(identity), _) => {
            format!("  {} ", style(format!("{} (waiting) >", identity.display_name)).dim())
        }
    }
}

pub struct ChatInput {
    rl: Readline,
    prompt: String,
}

impl ChatInput {
    /// Open the prompt for `state`. The returned `SharedWriter` prints above
    /// the prompt without clobbering what the user is typing.
    pub fn new(state: &ChatState) -> Result<(Self, SharedWriter), ReadlineError> {
        let prompt = prompt_for(state);
        let (rl, out) = Readline::new(prompt.clone())?;
        Ok((Self { rl, prompt }, out))
    }

    /// Redraw the prompt if the session phase changed its text.
    pub fn follow(&mut self, state: &ChatState) {
        let prompt = prompt_for(state);
        if prompt == self.prompt {
            return;
        }
        if let Err(e) = self.rl.update_prompt(&prompt) {
            debug!(error = %e, "Failed to update prompt");
        }
        self.prompt = prompt;
    }

    /// Wait for the next line. Cancel-safe.
    pub async fn next_event(&mut self) -> LineEvent {
        match self.rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => {
                let event = LineEvent::from_line(&line);
                if event.worth_remembering() {
                    let _ = self.rl.add_history_entry(line.trim().to_string());
                }
                event
            }
            Ok(ReadlineEvent::Eof) => LineEvent::Closed,
            Ok(ReadlineEvent::Interrupted) => LineEvent::Interrupted,
            Err(e) => {
                debug!(error = %e, "Readline failed, closing chat");
                LineEvent::Closed
            }
        }
    }

    pub fn clear_screen(&mut self) {
        let _ = self.rl.clear();
    }

    /// Restore the terminal before exit.
    pub fn close(&mut self) {
        let _ = self.rl.flush();
    }
}
