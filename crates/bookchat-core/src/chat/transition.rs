//! Pure state transitions for a chat session.
//!
//! `transition` applies one event to a `ChatState` and returns the effects
//! the controller must start. No IO happens here; the current time is passed
//! in so tests can pin it.

use bookchat_types::chat::{ChatMessage, ExchangeRecord, SEND_ERROR_TEXT};
use bookchat_types::identity::{Identity, UserId};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::controller::ControllerConfig;
use super::effect::Effect;
use super::event::ChatEvent;
use super::state::{ChatState, Exchange, ExchangePhase, HistoryStatus};

/// Apply `event` to `state`, returning the effects to start.
pub fn transition(
    state: &mut ChatState,
    event: ChatEvent,
    now: DateTime<Utc>,
    config: &ControllerConfig,
) -> Vec<Effect> {
    match event {
        ChatEvent::IdentityChanged(identity) => identity_changed(state, identity),
        ChatEvent::DraftChanged(text) => {
            state.draft = text;
            Vec::new()
        }
        ChatEvent::Submit(text) => submit(state, text),
        ChatEvent::Reload => issue_reload(state).into_iter().collect(),
        ChatEvent::ResponseReceived {
            exchange_id,
            result,
        } => response_received(state, exchange_id, result, now),
        ChatEvent::ExchangePersisted {
            exchange_id,
            attempt,
            result,
        } => exchange_persisted(state, exchange_id, attempt, result, config),
        ChatEvent::HistoryLoaded {
            seq,
            user_id,
            result,
        } => history_loaded(state, seq, user_id, result),
    }
}

fn identity_changed(state: &mut ChatState, identity: Option<Identity>) -> Vec<Effect> {
    let unchanged = match (&state.identity, &identity) {
        (None, None) => true,
        (Some(current), Some(next)) => current.same_user(next),
        _ => false,
    };
    if unchanged {
        // Same user, possibly refreshed display metadata.
        state.identity = identity;
        return Vec::new();
    }

    match &identity {
        Some(next) => info!(user_id = %next.user_id, "Signed in, loading history"),
        None => info!("Signed out, clearing chat"),
    }

    state.identity = identity;
    state.rendered.clear();
    state.exchange = None;
    state.history = HistoryStatus::Idle;
    state.revision += 1;
    // Anything still in flight belongs to the previous identity.
    state.reload_applied = state.reload_issued;

    issue_reload(state).into_iter().collect()
}

fn issue_reload(state: &mut ChatState) -> Option<Effect> {
    let user_id = state.identity.as_ref()?.user_id.clone();
    state.reload_issued += 1;
    state.history = HistoryStatus::Loading;
    debug!(seq = state.reload_issued, user_id = %user_id, "Reload issued");
    Some(Effect::LoadHistory {
        seq: state.reload_issued,
        user_id,
    })
}

fn submit(state: &mut ChatState, text: String) -> Vec<Effect> {
    if let Err(reason) = state.check_submit(&text) {
        debug!(%reason, "Submission ignored");
        return Vec::new();
    }
    let Some(identity) = state.identity.as_ref() else {
        return Vec::new();
    };

    let exchange = Exchange {
        id: Uuid::now_v7(),
        user_id: identity.user_id.clone(),
        query: text.clone(),
        phase: ExchangePhase::AwaitingResponse,
    };
    let effect = Effect::Ask {
        exchange_id: exchange.id,
        query: exchange.query.clone(),
        user_id: exchange.user_id.clone(),
    };

    state.rendered.push(ChatMessage::user(text));
    state.draft.clear();
    state.exchange = Some(exchange);
    vec![effect]
}

fn response_received(
    state: &mut ChatState,
    exchange_id: Uuid,
    result: Result<String, bookchat_types::error::RecommendError>,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let Some(exchange) = state
        .exchange
        .as_mut()
        .filter(|ex| ex.id == exchange_id && ex.phase == ExchangePhase::AwaitingResponse)
    else {
        debug!(%exchange_id, "Discarding response for an exchange that is no longer current");
        return Vec::new();
    };

    match result {
        Ok(response) => {
            let record = ExchangeRecord::new(
                exchange.user_id.clone(),
                exchange.query.clone(),
                Some(response.clone()),
                now,
            );
            exchange.phase = ExchangePhase::Persisting {
                record: record.clone(),
                attempt: 1,
            };
            state.rendered.push(ChatMessage::bot(response));
            vec![Effect::Persist {
                exchange_id,
                record,
                attempt: 1,
            }]
        }
        Err(e) => {
            // The error entry in the transcript is what the user sees.
            debug!(%exchange_id, error = %e, "Recommendation request failed");
            state.rendered.push(ChatMessage::bot(SEND_ERROR_TEXT));
            state.exchange = None;
            Vec::new()
        }
    }
}

fn exchange_persisted(
    state: &mut ChatState,
    exchange_id: Uuid,
    attempt: u32,
    result: Result<(), bookchat_types::error::HistoryError>,
    config: &ControllerConfig,
) -> Vec<Effect> {
    let Some(exchange) = state.exchange.as_mut().filter(|ex| ex.id == exchange_id) else {
        debug!(%exchange_id, "Discarding write result for an exchange that is no longer current");
        return Vec::new();
    };
    let ExchangePhase::Persisting {
        record,
        attempt: current,
    } = &mut exchange.phase
    else {
        return Vec::new();
    };
    if *current != attempt {
        return Vec::new();
    }

    match result {
        Ok(()) => {
            info!(%exchange_id, attempt, "Exchange persisted");
        }
        Err(e) if attempt < config.persist_attempts => {
            warn!(%exchange_id, attempt, error = %e, "History write failed, retrying");
            *current = attempt + 1;
            return vec![Effect::Persist {
                exchange_id,
                record: record.clone(),
                attempt: attempt + 1,
            }];
        }
        Err(e) => {
            error!(%exchange_id, attempt, error = %e, "History write failed, giving up");
        }
    }

    state.exchange = None;
    issue_reload(state).into_iter().collect()
}

fn history_loaded(
    state: &mut ChatState,
    seq: u64,
    user_id: UserId,
    result: Result<Vec<ExchangeRecord>, bookchat_types::error::HistoryError>,
) -> Vec<Effect> {
    let owner_matches = state
        .identity
        .as_ref()
        .is_some_and(|identity| identity.user_id == user_id);
    // Only the newest outstanding read may be applied. Anything older was
    // issued before a write or sign-in that it cannot reflect.
    if seq != state.reload_issued || seq <= state.reload_applied || !owner_matches {
        debug!(
            seq,
            issued = state.reload_issued,
            applied = state.reload_applied,
            "Discarding stale history result"
        );
        return Vec::new();
    }
    state.reload_applied = seq;

    let mut records = match result {
        Ok(records) => records,
        Err(e) => {
            // Surfaced through `HistoryStatus`; the view prints it once.
            debug!(seq, error = %e, "History unavailable");
            state.history = HistoryStatus::Unavailable(e.to_string());
            return Vec::new();
        }
    };

    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut rendered: Vec<ChatMessage> = Vec::with_capacity(records.len() * 2 + 2);
    if let Some(exchange) = &state.exchange {
        // Keep the outstanding exchange visible on top of what was read,
        // unless its record already made it into the read.
        let pending_record = match &exchange.phase {
            ExchangePhase::Persisting { record, .. } => Some(record),
            ExchangePhase::AwaitingResponse => None,
        };
        let already_persisted =
            pending_record.is_some_and(|pending| records.iter().any(|r| r.id == pending.id));

        rendered.extend(records.into_iter().flat_map(ExchangeRecord::into_messages));
        if !already_persisted {
            rendered.push(ChatMessage::user(exchange.query.clone()));
            if let Some(response) = pending_record.and_then(|r| r.response.clone()) {
                rendered.push(ChatMessage::bot(response));
            }
        }
    } else {
        rendered.extend(records.into_iter().flat_map(ExchangeRecord::into_messages));
    }

    debug!(seq, messages = rendered.len(), "History applied");
    state.rendered = rendered;
    state.revision += 1;
    state.history = HistoryStatus::Loaded;
    Vec::new()
}
