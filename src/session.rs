//! Who is logged in, and where that survives between runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::api::AuthService;
use crate::error::SessionError;
use crate::user::{Credentials, User};

/// The persisted session: the two well-known keys, `token` and `user`.
/// `user` is kept as raw JSON text so a damaged record reads as "nobody".
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl StoredSession {
    pub fn user(&self) -> Option<User> {
        let raw = self.user.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "stored user record is unreadable");
                None
            }
        }
    }
}

pub trait SessionStore {
    fn load(&self) -> Result<StoredSession, SessionError>;
    fn save(&self, session: &StoredSession) -> Result<(), SessionError>;
    /// Removes token and user together.
    fn clear(&self) -> Result<(), SessionError>;
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<StoredSession, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(StoredSession::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(err) => Err(self.io(err)),
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io(e))?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content).map_err(|e| self.io(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(self.io(err)),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn snapshot(&self) -> StoredSession {
        self.inner
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<StoredSession, SessionError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Ok(mut inner) = self.inner.lock() {
            *inner = session.clone();
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.save(&StoredSession::default())
    }
}

/// Result of a login or register attempt. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Success(Option<User>),
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Failure(msg) => Some(msg),
            AuthOutcome::Success(_) => None,
        }
    }
}

/// Process-wide session state. Many views read it; only login, register
/// and logout write it.
pub struct AuthContext<S> {
    store: S,
    user: Option<User>,
    token: Option<String>,
}

impl<S: SessionStore> AuthContext<S> {
    /// Hydrates from storage. Unreadable storage starts logged out.
    pub fn init(store: S) -> Self {
        let stored = store.load().unwrap_or_else(|err| {
            warn!(error = %err, "could not read session, starting logged out");
            StoredSession::default()
        });
        Self {
            user: stored.user(),
            token: stored.token,
            store,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the persisted user afresh.
    pub fn current_user(&self) -> Option<User> {
        self.store.load().ok().and_then(|s| s.user())
    }

    pub async fn login<A>(&mut self, api: &A, credentials: &Credentials) -> AuthOutcome
    where
        A: AuthService + ?Sized,
    {
        let payload = match api.login(credentials).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "login failed");
                return AuthOutcome::Failure(err.user_message("Login failed"));
            }
        };
        let stored = StoredSession {
            token: payload.token.clone(),
            user: serde_json::to_string(&payload.user).ok(),
        };
        if let Err(err) = self.store.save(&stored) {
            warn!(error = %err, "could not persist session");
        }
        info!(user_id = payload.user.id, "logged in");
        self.token = payload.token;
        self.user = Some(payload.user.clone());
        AuthOutcome::Success(Some(payload.user))
    }

    pub async fn register<A>(&mut self, api: &A, credentials: &Credentials) -> AuthOutcome
    where
        A: AuthService + ?Sized,
    {
        match api.register(credentials).await {
            Ok(_) => {
                info!(email = %credentials.email, "registered");
                AuthOutcome::Success(None)
            }
            Err(err) => {
                warn!(error = %err, "registration failed");
                AuthOutcome::Failure(err.user_message("Failed to create account"))
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "could not clear session storage");
        }
        self.user = None;
        self.token = None;
        info!("logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{user, FakeBackend};
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_persists_token_and_user() {
        let api = FakeBackend::new().with_user(user(1, "Ada"));
        let mut ctx = AuthContext::init(MemorySessionStore::new());

        let outcome = ctx
            .login(&api, &Credentials::new("Ada", "ada@example.com"))
            .await;

        assert!(outcome.is_success());
        assert_eq!(ctx.user().map(|u| u.id), Some(1));
        assert_eq!(ctx.store().snapshot().token.as_deref(), Some("token-1"));
        assert_eq!(ctx.current_user().map(|u| u.name), Some("Ada".to_string()));
    }

    #[tokio::test]
    async fn failed_login_reports_server_message_and_keeps_state() {
        let api = FakeBackend::new();
        let mut ctx = AuthContext::init(MemorySessionStore::new());

        let outcome = ctx
            .login(&api, &Credentials::new("Nobody", "no@example.com"))
            .await;

        assert_eq!(outcome.error(), Some("Invalid credentials"));
        assert!(ctx.user().is_none());
        assert_eq!(ctx.store().snapshot(), StoredSession::default());
    }

    #[tokio::test]
    async fn register_does_not_log_in() {
        let api = FakeBackend::new();
        let mut ctx = AuthContext::init(MemorySessionStore::new());

        let outcome = ctx
            .register(&api, &Credentials::new("Bo", "bo@example.com"))
            .await;

        assert_eq!(outcome, AuthOutcome::Success(None));
        assert!(ctx.user().is_none());

        api.fail("register");
        let outcome = ctx
            .register(&api, &Credentials::new("Bo", "bo@example.com"))
            .await;
        assert_eq!(outcome.error(), Some("register exploded"));
    }

    #[test]
    fn hydrates_and_logs_out_through_the_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("session.json");
        let store = FileSessionStore::new(&path);
        store
            .save(&StoredSession {
                token: Some("t".into()),
                user: Some(r#"{"id":9,"name":"Cy","email":"cy@x.io"}"#.into()),
            })
            .unwrap();

        let mut ctx = AuthContext::init(FileSessionStore::new(&path));
        assert_eq!(ctx.user().map(|u| u.id), Some(9));
        assert_eq!(ctx.token(), Some("t"));

        ctx.logout();
        assert!(ctx.user().is_none());
        assert!(!path.exists());
        assert!(ctx.current_user().is_none());
    }

    #[test]
    fn corrupt_user_record_reads_as_logged_out() {
        let store = MemorySessionStore::with(StoredSession {
            token: Some("t".into()),
            user: Some("{not json".into()),
        });
        let ctx = AuthContext::init(store);
        assert!(ctx.user().is_none());
        assert!(ctx.current_user().is_none());
    }

    #[test]
    fn missing_file_is_an_empty_session() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), StoredSession::default());
        store.clear().unwrap();
    }
}
