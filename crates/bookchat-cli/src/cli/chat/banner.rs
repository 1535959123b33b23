//! Welcome banner for chat sessions.

use bookchat_types::identity::Identity;
use console::style;

/// Banner shown when the chat loop starts.
pub fn welcome_banner(endpoint: &str, identity: Option<&Identity>) -> String {
    let who = match identity {
        Some(identity) => format!("{}", style(&identity.display_name).cyan().bold()),
        None => format!(
            "{} (use {} to start)",
            style("signed out").yellow(),
            style("/login <id>").yellow()
        ),
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("  * {}\n", style("bookchat").cyan().bold()));
    out.push_str(&format!("  {}\n\n", style("Ask for book recommendations").dim()));
    out.push_str(&format!("  {}     {}\n", style("User:").bold(), who));
    out.push_str(&format!("  {} {}\n\n", style("Backend:").bold(), style(endpoint).dim()));
    out.push_str(&format!("  {}\n", style("Type /help for commands, Ctrl+D to exit").dim()));
    out.push_str(&format!("  {}\n", style("---").dim()));
    out
}
