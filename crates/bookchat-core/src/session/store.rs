//! SessionStore trait definition.

use bookchat_types::error::AuthError;
use bookchat_types::identity::{Identity, SignInRequest, UserId};
use chrono::Utc;

use super::channel::IdentitySubscription;

/// Holds the signed-in identity and notifies subscribers of changes.
///
/// Implementations live in bookchat-infra (e.g., `FileSessionStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait SessionStore: Send + Sync {
    /// The identity signed in right now, if any.
    fn current(&self) -> Option<Identity>;

    /// Subscribe to identity changes. The first notification is the current
    /// state; drop the subscription to unsubscribe.
    fn subscribe(&self) -> IdentitySubscription;

    /// Sign in, replacing any current identity.
    fn sign_in(
        &self,
        request: &SignInRequest,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send;

    /// Sign out. A no-op when nobody is signed in.
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}

/// Validate a sign-in request and build the identity it describes.
///
/// The user id is trimmed and must be non-empty. A missing or blank display
/// name falls back to the user id.
pub fn identity_from_request(request: &SignInRequest) -> Result<Identity, AuthError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AuthError::InvalidIdentity("user id is blank".to_string()));
    }

    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(user_id)
        .to_string();

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string);

    Ok(Identity {
        user_id: UserId::new(user_id),
        display_name,
        email,
        signed_in_at: Utc::now(),
    })
}
