use std::fs;
use std::io;
use std::path::PathBuf;

use crate::api::types::{AuthPayload, UserInfo};
use crate::api::{ApiClient, ApiError};

pub const DEFAULT_SESSION_FILE: &str = "session.json";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not persist session: {0}")]
    Storage(#[from] io::Error),
}

/// On-disk home of the signed-in session (token plus user record), the
/// terminal counterpart of the app's keychain-backed storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        let path = std::env::var("SYMBIHELP_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        Self::new(path)
    }

    /// Restores the saved session. A missing file means signed out; an
    /// unreadable entry or one without a token is cleared on the spot.
    pub fn load(&self) -> Option<AuthPayload> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<AuthPayload>(&raw) {
            Ok(saved) if !saved.token.is_empty() => Some(saved),
            Ok(_) => {
                log::warn!("saved session has no token, clearing it");
                let _ = fs::remove_file(&self.path);
                None
            }
            Err(err) => {
                log::warn!("saved session is unreadable ({}), clearing it", err);
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn save(&self, session: &AuthPayload) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Puts a previously saved token back on the client. Returns the user record
/// for the greeting; None means the sign-in dialogue has to run.
pub fn restore(api: &mut ApiClient, store: &SessionStore) -> Option<UserInfo> {
    let saved = store.load()?;
    api.set_token(saved.token);
    Some(saved.user)
}

pub async fn sign_in(
    api: &mut ApiClient,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<UserInfo, AuthError> {
    let payload = api.login(email, password).await?;
    api.set_token(payload.token.clone());
    store.save(&payload)?;
    Ok(payload.user)
}

pub async fn sign_up(
    api: &mut ApiClient,
    store: &SessionStore,
    full_name: &str,
    email: &str,
    password: &str,
) -> Result<UserInfo, AuthError> {
    let payload = api.register(full_name, email, password).await?;
    api.set_token(payload.token.clone());
    store.save(&payload)?;
    Ok(payload.user)
}

pub fn sign_out(api: &mut ApiClient, store: &SessionStore) -> io::Result<()> {
    api.clear_token();
    store.clear()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> SessionStore {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "symbihelp-session-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        SessionStore::new(path)
    }

    fn payload(token: &str) -> AuthPayload {
        AuthPayload {
            token: token.to_string(),
            user: UserInfo {
                id: 1,
                email: "mother@example.com".to_string(),
                full_name: "Test Mother".to_string(),
                role: "mother".to_string(),
                is_admin: false,
            },
        }
    }

    #[test]
    fn saved_session_round_trips() {
        let store = temp_store("roundtrip");
        store.save(&payload("jwt-token")).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "jwt-token");
        assert_eq!(loaded.user.email, "mother@example.com");
    }

    #[test]
    fn missing_session_means_signed_out() {
        let store = temp_store("missing");
        assert!(store.load().is_none());
    }

    #[test]
    fn tokenless_session_is_cleared() {
        let store = temp_store("tokenless");
        store.save(&payload("")).unwrap();
        assert!(store.load().is_none());
        // The invalid entry must be gone, not just skipped
        assert!(store.load().is_none());
    }

    #[test]
    fn restore_sets_the_client_token() {
        let store = temp_store("restore");
        store.save(&payload("jwt-token")).unwrap();

        let mut api = ApiClient::new("http://localhost:5000");
        assert!(!api.has_token());
        let user = restore(&mut api, &store).unwrap();
        assert!(api.has_token());
        assert_eq!(user.full_name, "Test Mother");
    }

    #[test]
    fn clear_is_idempotent() {
        let store = temp_store("clear");
        store.save(&payload("jwt-token")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
