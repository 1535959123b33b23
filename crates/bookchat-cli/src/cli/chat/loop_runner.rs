//! The interactive chat loop.
//!
//! Owns the chat controller and multiplexes identity notifications, user
//! input, and controller completions with `tokio::select!`. After every
//! step the transcript view prints whatever changed.

use std::io::Write;

use anyhow::Result;
use console::style;
use tracing::debug;

use bookchat_core::chat::{ChatController, RejectReason, SubmitOutcome};
use bookchat_core::history::repository::HistoryRepository;
use bookchat_core::recommend::client::RecommendationClient;
use bookchat_core::session::store::SessionStore;
use bookchat_types::identity::SignInRequest;

use super::banner::welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, LineEvent};
use super::renderer::{ChatRenderer, TranscriptView, ViewItem};
use crate::state::AppState;

/// What the loop should do after handling a line.
#[derive(Debug, PartialEq)]
pub(crate) enum Flow {
    Continue,
    ClearScreen,
    Exit,
}

/// Run the interactive chat session until `/exit` or Ctrl+D.
pub async fn run_chat_loop(state: &AppState, quiet: bool) -> Result<()> {
    let mut controller = state.controller();
    let mut identities = state.session.subscribe();
    let renderer = ChatRenderer::new();
    let mut view = TranscriptView::new();

    let (mut input, mut out) = ChatInput::new(controller.state())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    if !quiet {
        let current = state.session.current();
        write!(
            out,
            "{}",
            welcome_banner(&state.config.recommendation.endpoint, current.as_ref())
        )?;
    }

    loop {
        let flow = tokio::select! {
            Some(identity) = identities.next() => {
                controller.on_identity_changed(identity);
                Flow::Continue
            }
            _ = controller.next_completion(), if controller.in_flight() > 0 => Flow::Continue,
            event = input.next_event() => {
                handle_line_event(state.session.as_ref(), &mut controller, &mut out, event).await?
            }
        };

        if flow == Flow::ClearScreen {
            input.clear_screen();
        }
        for item in view.sync(
            controller.state().revision(),
            controller.state().rendered(),
            controller.state().history_status(),
        ) {
            print_item(&mut out, &renderer, item)?;
        }
        input.follow(controller.state());

        if flow == Flow::Exit {
            break;
        }
    }

    if controller.in_flight() > 0 {
        writeln!(out, "  {}", style("Saving...").dim())?;
        controller.settle().await;
    }
    writeln!(out, "\n  {}", style("Session ended.").dim())?;
    input.close();
    Ok(())
}

fn print_item(out: &mut impl Write, renderer: &ChatRenderer, item: ViewItem) -> Result<()> {
    match item {
        ViewItem::Message(message) => {
            writeln!(out, "{}", renderer.render_message(&message))?;
        }
        ViewItem::Divider(count) => {
            writeln!(
                out,
                "\n  {}",
                style(format!("--- saved history ({count} messages) ---")).dim()
            )?;
        }
        ViewItem::Unavailable(reason) => {
            writeln!(
                out,
                "  {} History unavailable: {}. Try /reload.",
                style("!").yellow().bold(),
                style(reason).dim()
            )?;
        }
    }
    Ok(())
}

/// Act on one line event. Sign-in and sign-out go through `session`; the
/// identity subscription carries the result back to the controller.
pub(crate) async fn handle_line_event<S, H, R, W>(
    session: &S,
    controller: &mut ChatController<H, R>,
    out: &mut W,
    event: LineEvent,
) -> Result<Flow>
where
    S: SessionStore,
    H: HistoryRepository + 'static,
    R: RecommendationClient + 'static,
    W: Write,
{
    let command = match event {
        LineEvent::Closed => return Ok(Flow::Exit),
        LineEvent::Interrupted => {
            writeln!(out, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            return Ok(Flow::Continue);
        }
        LineEvent::Message(text) => {
            controller.set_draft(text);
            match controller.submit_draft() {
                SubmitOutcome::Accepted => {}
                // Blank lines are ignored, like an empty input box.
                SubmitOutcome::Rejected(RejectReason::Blank) => debug!("Ignoring blank line"),
                SubmitOutcome::Rejected(reason) => {
                    writeln!(out, "  {} {}", style("!").yellow().bold(), reason)?;
                }
            }
            return Ok(Flow::Continue);
        }
        LineEvent::Command(command) => command,
    };

    match command {
        ChatCommand::Help => write!(out, "{}", commands::help_text())?,
        ChatCommand::Login {
            user_id,
            display_name,
        } => {
            let request = SignInRequest {
                user_id,
                display_name,
                email: None,
            };
            if let Err(e) = session.sign_in(&request).await {
                writeln!(out, "  {} Sign-in failed: {e}", style("!").red().bold())?;
            }
        }
        ChatCommand::Logout => {
            if let Err(e) = session.sign_out().await {
                writeln!(out, "  {} Sign-out failed: {e}", style("!").red().bold())?;
            }
        }
        ChatCommand::Reload => {
            if !controller.reload() {
                writeln!(out, "  {} Sign in to load history.", style("i").blue().bold())?;
            }
        }
        ChatCommand::Clear => return Ok(Flow::ClearScreen),
        ChatCommand::Exit => return Ok(Flow::Exit),
        ChatCommand::Unknown(name) => {
            writeln!(
                out,
                "  {} Unknown command: {}. Type /help for available commands.",
                style("?").yellow().bold(),
                style(name).dim()
            )?;
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use bookchat_core::chat::{ControllerConfig, SessionPhase};
    use bookchat_core::session::channel::{IdentityChannel, IdentitySubscription};
    use bookchat_core::session::store::identity_from_request;
    use bookchat_types::chat::{Author, ExchangeRecord};
    use bookchat_types::error::{AuthError, HistoryError, RecommendError};
    use bookchat_types::identity::{Identity, UserId};

    use crate::cli::chat::input::prompt_for;

    struct FakeSession {
        channel: IdentityChannel,
        failure: Option<AuthError>,
    }

    impl FakeSession {
        fn new() -> Self {
            Self {
                channel: IdentityChannel::new(None),
                failure: None,
            }
        }

        fn failing(error: AuthError) -> Self {
            Self {
                failure: Some(error),
                ..Self::new()
            }
        }
    }

    impl SessionStore for FakeSession {
        fn current(&self) -> Option<Identity> {
            self.channel.current()
        }

        fn subscribe(&self) -> IdentitySubscription {
            self.channel.subscribe()
        }

        async fn sign_in(&self, request: &SignInRequest) -> Result<Identity, AuthError> {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            let identity = identity_from_request(request)?;
            self.channel.publish(Some(identity.clone()));
            Ok(identity)
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }
            self.channel.publish(None);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeHistory {
        records: Mutex<Vec<ExchangeRecord>>,
    }

    impl HistoryRepository for FakeHistory {
        async fn append(&self, record: &ExchangeRecord) -> Result<(), HistoryError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn list_all(&self, user_id: &UserId) -> Result<Vec<ExchangeRecord>, HistoryError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    struct FakeRecommender;

    impl RecommendationClient for FakeRecommender {
        async fn ask(&self, query: &str, _user_id: &UserId) -> Result<String, RecommendError> {
            Ok(format!("Try Dune for {query}"))
        }
    }

    fn controller() -> ChatController<FakeHistory, FakeRecommender> {
        ChatController::new(
            Arc::new(FakeHistory::default()),
            Arc::new(FakeRecommender),
            ControllerConfig::default(),
        )
    }

    async fn signed_in_controller() -> ChatController<FakeHistory, FakeRecommender> {
        let mut controller = controller();
        controller.on_identity_changed(Some(Identity::new("u1", "Ada")));
        controller.settle().await;
        controller
    }

    fn plain(out: Vec<u8>) -> String {
        console::strip_ansi_codes(&String::from_utf8(out).unwrap()).to_string()
    }

    fn login(user_id: &str) -> LineEvent {
        LineEvent::Command(ChatCommand::Login {
            user_id: user_id.to_string(),
            display_name: None,
        })
    }

    #[tokio::test]
    async fn test_message_is_submitted_and_answered() {
        let session = FakeSession::new();
        let mut controller = signed_in_controller().await;
        let mut out = Vec::new();

        let flow = handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::Message("sci-fi books".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(controller.state().phase(), SessionPhase::AwaitingResponse);
        assert!(out.is_empty());

        controller.settle().await;
        let rendered: Vec<(Author, &str)> = controller
            .state()
            .rendered()
            .iter()
            .map(|m| (m.author, m.text.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                (Author::User, "sci-fi books"),
                (Author::Bot, "Try Dune for sci-fi books"),
            ]
        );
    }

    #[tokio::test]
    async fn test_message_while_signed_out_explains_rejection() {
        let session = FakeSession::new();
        let mut controller = controller();
        let mut out = Vec::new();

        handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::Message("sci-fi books".to_string()),
        )
        .await
        .unwrap();

        assert!(plain(out).contains("sign in to send messages"));
        assert!(controller.state().rendered().is_empty());
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_blank_message_prints_nothing() {
        let session = FakeSession::new();
        let mut controller = signed_in_controller().await;
        let mut out = Vec::new();

        handle_line_event(&session, &mut controller, &mut out, LineEvent::Message(String::new()))
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_failure_reports_auth_error() {
        let session = FakeSession::failing(AuthError::Storage("disk full".to_string()));
        let mut controller = controller();
        let mut out = Vec::new();

        let flow = handle_line_event(&session, &mut controller, &mut out, login("u1"))
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        let text = plain(out);
        assert!(text.contains("Sign-in failed"), "got: {text}");
        assert!(text.contains("disk full"), "got: {text}");
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_reaches_controller_through_subscription() {
        let session = FakeSession::new();
        let mut identities = session.subscribe();
        assert_eq!(identities.next().await, Some(None));
        let mut controller = controller();
        let mut out = Vec::new();

        handle_line_event(&session, &mut controller, &mut out, login("u1"))
            .await
            .unwrap();
        assert!(out.is_empty());

        let identity = identities.next().await.unwrap();
        controller.on_identity_changed(identity);
        controller.settle().await;

        assert_eq!(controller.state().phase(), SessionPhase::Idle);
        let prompt = console::strip_ansi_codes(&prompt_for(controller.state())).to_string();
        assert_eq!(prompt, "  u1 > ");
    }

    #[tokio::test]
    async fn test_sign_out_failure_is_reported() {
        let session = FakeSession::failing(AuthError::Storage("read-only".to_string()));
        let mut controller = controller();
        let mut out = Vec::new();

        handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::Command(ChatCommand::Logout),
        )
        .await
        .unwrap();

        assert!(plain(out).contains("Sign-out failed"));
    }

    #[tokio::test]
    async fn test_reload_while_signed_out_hints_at_sign_in() {
        let session = FakeSession::new();
        let mut controller = controller();
        let mut out = Vec::new();

        handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::Command(ChatCommand::Reload),
        )
        .await
        .unwrap();

        assert!(plain(out).contains("Sign in to load history."));
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_reload_while_signed_in_starts_a_read() {
        let session = FakeSession::new();
        let mut controller = signed_in_controller().await;
        let mut out = Vec::new();

        handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::Command(ChatCommand::Reload),
        )
        .await
        .unwrap();

        assert!(out.is_empty());
        assert_eq!(controller.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_flow_commands() {
        let session = FakeSession::new();
        let mut controller = controller();

        for (event, expected) in [
            (LineEvent::Command(ChatCommand::Exit), Flow::Exit),
            (LineEvent::Closed, Flow::Exit),
            (LineEvent::Command(ChatCommand::Clear), Flow::ClearScreen),
            (LineEvent::Interrupted, Flow::Continue),
        ] {
            let mut out = Vec::new();
            let flow = handle_line_event(&session, &mut controller, &mut out, event)
                .await
                .unwrap();
            assert_eq!(flow, expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_command_is_named() {
        let session = FakeSession::new();
        let mut controller = controller();
        let mut out = Vec::new();

        handle_line_event(
            &session,
            &mut controller,
            &mut out,
            LineEvent::from_line("/shelve"),
        )
        .await
        .unwrap();

        assert!(plain(out).contains("Unknown command: /shelve"));
    }

    #[test]
    fn test_unavailable_item_suggests_reload() {
        let mut out = Vec::new();
        print_item(
            &mut out,
            &ChatRenderer::new(),
            ViewItem::Unavailable("database is locked".to_string()),
        )
        .unwrap();
        let text = plain(out);
        assert!(text.contains("History unavailable: database is locked"));
        assert!(text.contains("/reload"));
    }
}
