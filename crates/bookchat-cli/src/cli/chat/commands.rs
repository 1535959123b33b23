//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`; anything else is a query for the recommender.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Sign in as the given user.
    Login {
        user_id: String,
        display_name: Option<String>,
    },
    /// Sign out.
    Logout,
    /// Re-read saved history.
    Reload,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Unknown or malformed command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/login" | "/signin" => {
            let (user_id, name) = match arg.split_once(char::is_whitespace) {
                Some((id, name)) => (id, Some(name.trim().to_string())),
                None => (arg, None),
            };
            if user_id.is_empty() {
                return Some(ChatCommand::Unknown("/login requires a user id".to_string()));
            }
            Some(ChatCommand::Login {
                user_id: user_id.to_string(),
                display_name: name.filter(|n| !n.is_empty()),
            })
        }
        "/logout" | "/signout" => Some(ChatCommand::Logout),
        "/reload" | "/r" => Some(ChatCommand::Reload),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Help text listing all available commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/login <id> [name]", "Sign in"),
        ("/logout", "Sign out"),
        ("/reload", "Re-read saved history"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat session"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (command, description) in rows {
        out.push_str(&format!("  {:<20} {description}\n", style(command).cyan()));
    }
    out.push_str(&format!("\n  {}\n", style("Ctrl+D to exit").dim()));
    out
}
