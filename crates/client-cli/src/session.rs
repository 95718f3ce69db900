//! Session store.
//!
//! The only shared mutable state in the client. Views read it through
//! [`SessionStore::snapshot`] or a [`SessionStore::subscribe`] receiver and never
//! keep their own copy; every mutation goes through the methods below.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::UserSummary;
use tokio::sync::watch;

use crate::auth::AuthClient;
use crate::error::{AuthError, ClientError, ClientResult};

/// Token plus the last server copy of the user it belongs to
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserSummary) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"****")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    SignedOut,
    /// `verified` is false while a cached session awaits its startup check
    SignedIn { session: Session, verified: bool },
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn { session, .. } => Some(session),
            SessionState::SignedOut => None,
        }
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.session().map(|s| &s.user)
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, SessionState::SignedIn { verified: true, .. })
    }

    pub fn is_admin(&self) -> bool {
        self.user().map(|u| u.is_admin).unwrap_or(false)
    }
}

/// Where the session survives between runs
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> ClientResult<Option<Session>>;
    async fn save(&self, session: &Session) -> ClientResult<()>;
    async fn clear(&self) -> ClientResult<()>;
}

/// JSON file in the platform data directory
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_data_dir() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::Config::data_dir()?.join("session.json")))
    }

    fn storage_error(&self, action: &str, err: impl fmt::Display) -> ClientError {
        ClientError::Storage(format!("{} {}: {}", action, self.path.display(), err))
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> ClientResult<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_error("could not read", e)),
        };
        let session = serde_json::from_str(&content)
            .map_err(|e| self.storage_error("could not parse", e))?;
        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error("could not create directory for", e))?;
        }
        let content = serde_json::to_string_pretty(session)
            .map_err(|e| self.storage_error("could not encode", e))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| self.storage_error("could not write", e))
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("could not remove", e)),
        }
    }
}

/// Process-local storage, nothing survives the run
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn poisoned() -> ClientError {
        ClientError::Storage("session slot poisoned".to_string())
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.slot.lock().map_err(|_| Self::poisoned())?.clone())
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        *self.slot.lock().map_err(|_| Self::poisoned())? = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.slot.lock().map_err(|_| Self::poisoned())? = None;
        Ok(())
    }
}

pub struct SessionStore {
    auth: AuthClient,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    /// Bumped whenever the signed-in identity changes
    epoch: AtomicU64,
    verify_timeout: Duration,
}

impl SessionStore {
    pub fn new(auth: AuthClient, storage: Arc<dyn SessionStorage>, verify_timeout: Duration) -> Self {
        let (state, _) = watch::channel(SessionState::SignedOut);
        Self {
            auth,
            storage,
            state,
            epoch: AtomicU64::new(0),
            verify_timeout,
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn replace_identity(&self, state: SessionState) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(state);
    }

    async fn persist(&self, session: &Session) {
        if let Err(e) = self.storage.save(session).await {
            tracing::warn!("Could not cache session: {}", e);
        }
    }

    /// Drop the session in memory and on disk
    async fn drop_session(&self) {
        if let Err(e) = self.storage.clear().await {
            tracing::warn!("Could not clear cached session: {}", e);
        }
        self.replace_identity(SessionState::SignedOut);
    }

    /// Restore the cached session and check it with the server.
    ///
    /// Never leaves an unverified session behind: a rejected token clears the
    /// cache, and a transport failure or timeout signs out in memory while
    /// keeping the cache for the next run. The error, if any, says why the
    /// cached session was not restored.
    pub async fn load(&self) -> ClientResult<()> {
        let cached = match self.storage.load().await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session cache: {}", e);
                None
            }
        };
        let Some(cached) = cached else {
            self.replace_identity(SessionState::SignedOut);
            return Ok(());
        };

        self.replace_identity(SessionState::SignedIn {
            session: cached.clone(),
            verified: false,
        });
        self.verify_current(cached.token).await
    }

    /// Re-check the current session, picking up server-side balance changes
    pub async fn refresh(&self) -> ClientResult<()> {
        let token = match self.snapshot().session() {
            Some(session) => session.token.clone(),
            None => return Err(AuthError::NotSignedIn.into()),
        };
        self.verify_current(token).await
    }

    async fn verify_current(&self, token: String) -> ClientResult<()> {
        let outcome = tokio::time::timeout(self.verify_timeout, self.auth.verify(&token)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ClientError::Transport(format!(
                "session check timed out after {}s",
                self.verify_timeout.as_secs()
            ))),
        };

        // A concurrent login or logout wins over this check
        let still_current = self
            .snapshot()
            .session()
            .map(|s| s.token == token)
            .unwrap_or(false);
        if !still_current {
            return result.map(|_| ());
        }

        match result {
            Ok(user) => {
                let session = Session::new(token, user);
                self.persist(&session).await;
                self.state.send_replace(SessionState::SignedIn {
                    session,
                    verified: true,
                });
                Ok(())
            }
            Err(e) if e.invalidates_session() => {
                tracing::info!("Cached session rejected: {}", e);
                self.drop_session().await;
                Err(e)
            }
            Err(e) if self.snapshot().is_verified() => {
                tracing::warn!("Could not refresh session, keeping it: {}", e);
                Err(e)
            }
            Err(e) => {
                tracing::warn!("Could not verify session, continuing signed out: {}", e);
                self.replace_identity(SessionState::SignedOut);
                Err(e)
            }
        }
    }

    /// The verified session, checking with the server first if needed
    pub async fn ensure_verified(&self) -> ClientResult<Session> {
        match self.snapshot() {
            SessionState::SignedIn {
                session,
                verified: true,
            } => Ok(session),
            SessionState::SignedIn { session, .. } => {
                self.verify_current(session.token).await?;
                self.snapshot()
                    .session()
                    .cloned()
                    .ok_or_else(|| AuthError::NotSignedIn.into())
            }
            SessionState::SignedOut => Err(AuthError::NotSignedIn.into()),
        }
    }

    /// On failure the existing session, if any, is left untouched
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.auth.login(email, password).await?;
        self.persist(&session).await;
        self.replace_identity(SessionState::SignedIn {
            session: session.clone(),
            verified: true,
        });
        Ok(session)
    }

    /// Always succeeds; there is nothing to tell the server
    pub async fn logout(&self) {
        self.drop_session().await;
        tracing::info!("signed out");
    }

    /// Called when a protected call reported the token dead
    pub async fn invalidate(&self) {
        if self.snapshot().is_signed_in() {
            tracing::info!("session invalidated by server");
            self.drop_session().await;
        }
    }

    /// Overwrite the credit balance with a server-reported value
    pub async fn apply_credit_delta(&self, new_credits: u32) {
        self.update_user(|user| user.credits = new_credits).await;
    }

    /// Overwrite the free-tier counter with a server-reported remaining count
    pub async fn apply_free_remaining(&self, remaining: u32) {
        self.update_user(|user| {
            user.free_generations_used = user.free_generations_limit.saturating_sub(remaining);
        })
        .await;
    }

    async fn update_user(&self, apply: impl FnOnce(&mut UserSummary)) {
        let mut updated = None;
        self.state.send_if_modified(|state| match state {
            SessionState::SignedIn { session, .. } => {
                apply(&mut session.user);
                updated = Some(session.clone());
                true
            }
            SessionState::SignedOut => false,
        });
        if let Some(session) = updated {
            self.persist(&session).await;
        }
    }
}
