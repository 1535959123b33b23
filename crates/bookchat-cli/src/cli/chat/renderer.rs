//! Transcript rendering.
//!
//! `ChatRenderer` formats single messages (bot replies go through `termimad`
//! as markdown). `TranscriptView` decides what to print after each state
//! change so the terminal always ends with the newest entry.

use bookchat_core::chat::HistoryStatus;
use bookchat_types::chat::{Author, ChatMessage};
use chrono::Local;
use console::style;
use termimad::MadSkin;

/// Label shown in front of bot-authored messages.
pub const BOT_LABEL: &str = "Librarian";

/// Terminal markdown renderer for chat messages.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        Self { skin }
    }

    /// Render markdown for the terminal.
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }

    /// Format one transcript entry, including its label and timestamp.
    pub fn render_message(&self, message: &ChatMessage) -> String {
        let stamp = message
            .timestamp
            .map(|ts| format!(" {}", style(ts.with_timezone(&Local).format("%H:%M")).dim()))
            .unwrap_or_default();

        match message.author {
            Author::User => format!(
                "  {}{} {}",
                style("You").green().bold(),
                stamp,
                message.text
            ),
            Author::Bot => {
                let body = self.render_markdown(&message.text);
                format!(
                    "  {}{}\n{}",
                    style(BOT_LABEL).cyan().bold(),
                    stamp,
                    indent(body.trim_end())
                )
            }
        }
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Something the loop should print.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewItem {
    /// A transcript entry not yet on screen.
    Message(ChatMessage),
    /// The list was replaced by something that does not extend what is on
    /// screen; everything after this marker is the new list.
    Divider(usize),
    /// History could not be read.
    Unavailable(String),
}

/// Tracks what is already on screen.
///
/// A reload that only confirms what was shown optimistically prints nothing;
/// a reload that changes earlier entries reprints the whole list.
#[derive(Debug, Default)]
pub struct TranscriptView {
    revision: u64,
    shown: Vec<(Author, String)>,
    status: HistoryStatus,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the controller's current view and return what to print.
    pub fn sync(
        &mut self,
        revision: u64,
        rendered: &[ChatMessage],
        status: &HistoryStatus,
    ) -> Vec<ViewItem> {
        let mut out = Vec::new();

        if revision != self.revision {
            self.revision = revision;
            let extends_shown = self.shown.len() <= rendered.len()
                && self
                    .shown
                    .iter()
                    .zip(rendered)
                    .all(|((author, text), message)| *author == message.author && *text == message.text);
            if !extends_shown {
                let had_output = !self.shown.is_empty();
                self.shown.clear();
                if had_output && !rendered.is_empty() {
                    out.push(ViewItem::Divider(rendered.len()));
                }
            }
        }
        self.shown.truncate(rendered.len());

        for message in &rendered[self.shown.len()..] {
            self.shown.push((message.author, message.text.clone()));
            out.push(ViewItem::Message(message.clone()));
        }

        if *status != self.status {
            if let HistoryStatus::Unavailable(reason) = status {
                out.push(ViewItem::Unavailable(reason.clone()));
            }
            self.status = status.clone();
        }

        out
    }
}
