//! `bchat ask`: one exchange without the interactive loop.
//!
//! Runs the same controller as the chat loop, so the exchange is persisted
//! and subject to the same guards.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use bookchat_core::chat::{SessionPhase, SubmitOutcome};
use bookchat_core::session::store::SessionStore;
use bookchat_types::chat::SEND_ERROR_TEXT;

use super::chat::renderer::ChatRenderer;
use crate::state::AppState;

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub async fn ask(state: &AppState, query: &str, json: bool, quiet: bool) -> Result<()> {
    let Some(identity) = state.session.current() else {
        bail!("Not signed in. Sign in with `bchat login`.");
    };
    let user_id = identity.user_id.clone();

    let mut controller = state.controller();
    controller.on_identity_changed(Some(identity));
    controller.settle().await;

    if let SubmitOutcome::Rejected(reason) = controller.submit(query) {
        bail!("Query not sent: {reason}");
    }

    let waiting = (!json && !quiet).then(|| spinner("thinking..."));
    while controller.state().phase() == SessionPhase::AwaitingResponse {
        if !controller.next_completion().await {
            break;
        }
    }
    // Persisting means the recommendation arrived; Idle means it failed.
    let succeeded = controller.state().phase() == SessionPhase::Persisting;
    let reply = controller
        .state()
        .rendered()
        .last()
        .filter(|message| !message.is_user())
        .map(|message| message.text.clone())
        .ok_or_else(|| anyhow!("no reply was rendered"))?;

    if let Some(spinner) = &waiting {
        spinner.set_message("saving...");
    }
    controller.settle().await;
    if let Some(spinner) = waiting {
        spinner.finish_and_clear();
    }

    if !succeeded {
        bail!("{SEND_ERROR_TEXT} to {}", state.config.recommendation.endpoint);
    }

    if json {
        let out = serde_json::json!({
            "user_id": user_id,
            "query": query,
            "response": reply,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if quiet {
        println!("{reply}");
    } else {
        let renderer = ChatRenderer::new();
        println!();
        println!("  {}", style("Recommendation").cyan().bold());
        println!("{}", renderer.render_markdown(&reply).trim_end());
        println!();
    }
    Ok(())
}
