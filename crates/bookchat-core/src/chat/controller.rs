//! Chat session controller: runs the state machine against real collaborators.
//!
//! Each effect returned by `transition` is spawned as a tokio task that calls
//! one collaborator and sends the completion back over an mpsc channel. State
//! is only ever touched by the task that owns the controller.

use std::sync::Arc;

use bookchat_types::config::HistoryConfig;
use bookchat_types::error::{HistoryError, RecommendError};
use bookchat_types::identity::Identity;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::history::repository::HistoryRepository;
use crate::recommend::client::RecommendationClient;

use super::effect::Effect;
use super::event::ChatEvent;
use super::state::{ChatState, SubmitOutcome};
use super::transition::transition;

/// Tunables for the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Total write attempts per exchange (first write plus retries).
    pub persist_attempts: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            persist_attempts: 2,
        }
    }
}

impl From<&HistoryConfig> for ControllerConfig {
    fn from(config: &HistoryConfig) -> Self {
        Self {
            persist_attempts: config.persist_attempts.max(1),
        }
    }
}

/// Mediates between the session store, the history repository, the
/// recommendation client, and a rendered message list.
///
/// Generic over the collaborator traits so tests can inject fakes.
pub struct ChatController<H: HistoryRepository, R: RecommendationClient> {
    state: ChatState,
    config: ControllerConfig,
    history: Arc<H>,
    recommender: Arc<R>,
    completions_tx: mpsc::UnboundedSender<ChatEvent>,
    completions_rx: mpsc::UnboundedReceiver<ChatEvent>,
    in_flight: usize,
}

impl<H, R> ChatController<H, R>
where
    H: HistoryRepository + 'static,
    R: RecommendationClient + 'static,
{
    /// Create a signed-out controller.
    pub fn new(history: Arc<H>, recommender: Arc<R>, config: ControllerConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: ChatState::new(),
            config,
            history,
            recommender,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Number of collaborator calls whose completion has not been applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply an event and start whatever effects it produces.
    pub fn dispatch(&mut self, event: ChatEvent) {
        let effects = transition(&mut self.state, event, Utc::now(), &self.config);
        for effect in effects {
            self.spawn(effect);
        }
    }

    /// Feed a session store notification.
    pub fn on_identity_changed(&mut self, identity: Option<Identity>) {
        self.dispatch(ChatEvent::IdentityChanged(identity));
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.dispatch(ChatEvent::DraftChanged(text.into()));
    }

    /// Submit `text`. Rejected submissions leave the state untouched.
    pub fn submit(&mut self, text: impl Into<String>) -> SubmitOutcome {
        let text = text.into();
        if let Err(reason) = self.state.check_submit(&text) {
            return SubmitOutcome::Rejected(reason);
        }
        self.dispatch(ChatEvent::Submit(text));
        SubmitOutcome::Accepted
    }

    /// Submit whatever is in the draft.
    pub fn submit_draft(&mut self) -> SubmitOutcome {
        let draft = self.state.draft().to_string();
        self.submit(draft)
    }

    /// Re-read history. Returns `false` when signed out.
    pub fn reload(&mut self) -> bool {
        if !self.state.is_signed_in() {
            return false;
        }
        self.dispatch(ChatEvent::Reload);
        true
    }

    /// Wait for one in-flight call to finish and apply its result.
    ///
    /// Returns `false` immediately when nothing is in flight. Cancel-safe.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(event) => {
                self.in_flight -= 1;
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight, including any
    /// follow-up work they start.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn spawn(&mut self, effect: Effect) {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();

        // Every call runs on its own task and the completion is sent from the
        // outer one, so a panicking collaborator still yields an event and
        // `in_flight` always returns to zero.
        match effect {
            Effect::Ask {
                exchange_id,
                query,
                user_id,
            } => {
                let recommender = Arc::clone(&self.recommender);
                tokio::spawn(async move {
                    let call = tokio::spawn(async move { recommender.ask(&query, &user_id).await });
                    let result = call.await.unwrap_or_else(|e| {
                        tracing::error!(%exchange_id, error = %e, "Recommendation task failed");
                        Err(RecommendError::Network(format!("request task failed: {e}")))
                    });
                    let _ = tx.send(ChatEvent::ResponseReceived {
                        exchange_id,
                        result,
                    });
                });
            }
            Effect::Persist {
                exchange_id,
                record,
                attempt,
            } => {
                let history = Arc::clone(&self.history);
                tokio::spawn(async move {
                    let call = tokio::spawn(async move { history.append(&record).await });
                    let result = call.await.unwrap_or_else(|e| {
                        tracing::error!(%exchange_id, attempt, error = %e, "History write task failed");
                        Err(HistoryError::Write(format!("write task failed: {e}")))
                    });
                    let _ = tx.send(ChatEvent::ExchangePersisted {
                        exchange_id,
                        attempt,
                        result,
                    });
                });
            }
            Effect::LoadHistory { seq, user_id } => {
                let history = Arc::clone(&self.history);
                let owner = user_id.clone();
                tokio::spawn(async move {
                    let call = tokio::spawn(async move { history.list_all(&owner).await });
                    let result = call.await.unwrap_or_else(|e| {
                        tracing::error!(seq, error = %e, "History read task failed");
                        Err(HistoryError::Read(format!("read task failed: {e}")))
                    });
                    let _ = tx.send(ChatEvent::HistoryLoaded {
                        seq,
                        user_id,
                        result,
                    });
                });
            }
        }
    }
}
