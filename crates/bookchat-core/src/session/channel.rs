//! Identity change notification built on `tokio::sync::watch`.
//!
//! A session store owns an `IdentityChannel` and publishes every sign-in and
//! sign-out to it. Subscribers get the current identity immediately, then
//! each change. Dropping an `IdentitySubscription` unsubscribes.

use bookchat_types::identity::Identity;
use tokio::sync::watch;

/// Single-producer, multi-consumer holder of the current identity.
///
/// Cloning the channel clones the sender, so several handles can publish.
#[derive(Clone)]
pub struct IdentityChannel {
    sender: watch::Sender<Option<Identity>>,
}

impl IdentityChannel {
    /// Create a channel holding `initial` as the current identity.
    pub fn new(initial: Option<Identity>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Snapshot of the current identity.
    pub fn current(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    /// Replace the current identity.
    ///
    /// Returns `true` if the value changed. Publishing a value equal to the
    /// current one does not wake subscribers.
    pub fn publish(&self, identity: Option<Identity>) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                *current = identity;
                true
            }
        })
    }

    /// Create a subscription whose first `next()` yields the current value.
    pub fn subscribe(&self) -> IdentitySubscription {
        IdentitySubscription {
            receiver: self.sender.subscribe(),
            primed: false,
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl std::fmt::Debug for IdentityChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityChannel")
            .field("signed_in", &self.sender.borrow().is_some())
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}

/// A live subscription to identity changes.
pub struct IdentitySubscription {
    receiver: watch::Receiver<Option<Identity>>,
    primed: bool,
}

impl IdentitySubscription {
    /// Wait for the next identity notification.
    ///
    /// The first call returns the current identity without waiting. Later
    /// calls wait for a change. Returns `None` once the store is gone.
    /// Cancel-safe, so it can sit in a `tokio::select!` loop.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        if !self.primed {
            self.primed = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_next_yields_current_immediately() {
        let channel = IdentityChannel::new(Some(Identity::new("u1", "Ada")));
        let mut sub = channel.subscribe();

        let first = sub.next().await.unwrap();
        assert_eq!(first.unwrap().user_id.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_first_next_yields_signed_out() {
        let channel = IdentityChannel::new(None);
        let mut sub = channel.subscribe();
        assert_eq!(sub.next().await, Some(None));
    }

    #[tokio::test]
    async fn test_subsequent_next_waits_for_change() {
        let channel = IdentityChannel::new(None);
        let mut sub = channel.subscribe();
        sub.next().await.unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(20), sub.next()).await;
        assert!(pending.is_err(), "no change published yet");

        assert!(channel.publish(Some(Identity::new("u1", "Ada"))));
        let next = sub.next().await.unwrap();
        assert_eq!(next.unwrap().user_id.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_publishing_equal_value_does_not_notify() {
        let identity = Identity::new("u1", "Ada");
        let channel = IdentityChannel::new(Some(identity.clone()));
        let mut sub = channel.subscribe();
        sub.next().await.unwrap();

        assert!(!channel.publish(Some(identity)));
        let pending = tokio::time::timeout(Duration::from_millis(20), sub.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_next_returns_none_after_channel_dropped() {
        let channel = IdentityChannel::new(None);
        let mut sub = channel.subscribe();
        sub.next().await.unwrap();

        drop(channel);
        assert_eq!(sub.next().await, None);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let channel = IdentityChannel::new(None);
        let sub = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 1);
        drop(sub);
        assert_eq!(channel.subscriber_count(), 0);
    }
}
