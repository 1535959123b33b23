//! File-backed session store.
//!
//! Keeps the signed-in identity in `{data_dir}/session.json` so a sign-in
//! survives across `bchat` invocations. Changes are published through an
//! [`IdentityChannel`] for live subscribers in the same process.

use std::path::{Path, PathBuf};

use bookchat_core::session::channel::{IdentityChannel, IdentitySubscription};
use bookchat_core::session::store::{SessionStore, identity_from_request};
use bookchat_types::error::AuthError;
use bookchat_types::identity::{Identity, SignInRequest};
use tokio::sync::Mutex;

const SESSION_FILE: &str = "session.json";

/// `SessionStore` persisted as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
    channel: IdentityChannel,
    /// Serializes file writes so the file and the channel never disagree.
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open the store in `data_dir`, restoring a saved identity if present.
    ///
    /// A missing file means signed out. An unreadable or malformed file is
    /// logged and also treated as signed out.
    pub async fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(SESSION_FILE);
        let restored = read_session(&path).await;
        if let Some(identity) = &restored {
            tracing::debug!(user_id = %identity.user_id, "Restored session");
        }
        Self {
            path,
            channel: IdentityChannel::new(restored),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_session(path: &Path) -> Option<Identity> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, starting signed out", path.display());
            return None;
        }
    };

    match serde_json::from_str::<Identity>(&content) {
        Ok(identity) if !identity.user_id.is_blank() => Some(identity),
        Ok(_) => {
            tracing::warn!("{} holds a blank user id, starting signed out", path.display());
            None
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, starting signed out", path.display());
            None
        }
    }
}

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(format!("{action} {}: {err}", path.display()))
}

impl SessionStore for FileSessionStore {
    fn current(&self) -> Option<Identity> {
        self.channel.current()
    }

    fn subscribe(&self) -> IdentitySubscription {
        self.channel.subscribe()
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<Identity, AuthError> {
        let identity = identity_from_request(request)?;
        let json = serde_json::to_string_pretty(&identity)
            .map_err(|e| storage_error("serialize", &self.path, e))?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", &self.path, e))?;
        }
        // Write then rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;

        tracing::info!(user_id = %identity.user_id, "Signed in");
        self.channel.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(storage_error("remove", &self.path, err)),
        }

        if self.channel.publish(None) {
            tracing::info!("Signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(user_id: &str) -> SignInRequest {
        SignInRequest {
            user_id: user_id.to_string(),
            display_name: Some("Ada".to_string()),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_open_without_file_is_signed_out() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::open(tmp.path()).await;
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::open(tmp.path()).await;
        let identity = store.sign_in(&request("u1")).await.unwrap();
        assert_eq!(identity.user_id.as_str(), "u1");
        assert!(store.path().exists());

        let reopened = FileSessionStore::open(tmp.path()).await;
        assert_eq!(reopened.current(), Some(identity));
    }

    #[tokio::test]
    async fn test_sign_out_removes_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::open(tmp.path()).await;
        store.sign_in(&request("u1")).await.unwrap();

        store.sign_out().await.unwrap();
        assert!(store.current().is_none());
        assert!(!store.path().exists());

        // Signing out again is a no-op.
        store.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_blank_user_id_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::open(tmp.path()).await;

        let err = store.sign_in(&request("   ")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidIdentity(_)));
        assert!(store.current().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_malformed_file_starts_signed_out() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(SESSION_FILE), "{ not json")
            .await
            .unwrap();

        let store = FileSessionStore::open(tmp.path()).await;
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_out() {
        let tmp = TempDir::new().unwrap();
        let store = FileSessionStore::open(tmp.path()).await;
        let mut sub = store.subscribe();

        assert_eq!(sub.next().await, Some(None));

        store.sign_in(&request("u1")).await.unwrap();
        let seen = sub.next().await.unwrap().unwrap();
        assert_eq!(seen.user_id.as_str(), "u1");

        store.sign_out().await.unwrap();
        assert_eq!(sub.next().await, Some(None));
    }

    #[tokio::test]
    async fn test_sign_in_creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("fresh").join("data");
        let store = FileSessionStore::open(&nested).await;

        store.sign_in(&request("u1")).await.unwrap();
        assert!(nested.join(SESSION_FILE).exists());
    }
}
