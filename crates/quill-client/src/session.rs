//! Authentication session: a small state machine, its persistence, and a
//! process-wide shared context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use quill_shared::dto::{AuthResponse, RegisterRequest, UserResponse};

use crate::api::BlogClient;
use crate::error::ClientError;

/// A signed-in user and the token the server issued for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            user: auth.user,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(Session),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Success(Session),
    Failure(String),
    Logout,
    ClearError,
}

impl SessionState {
    /// Apply one event. Events that make no sense in the current state leave it unchanged.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Anonymous | S::Error(_), E::Start) => S::Authenticating,
            (S::Authenticating, E::Success(session)) => S::Authenticated(session),
            (S::Authenticating, E::Failure(message)) => S::Error(message),
            (S::Authenticated(_) | S::Error(_), E::Logout) => S::Anonymous,
            (S::Error(_), E::ClearError) => S::Anonymous,
            (state, _) => {
                tracing::debug!("Ignoring session event");
                state
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Where a session survives between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, ClientError>;
    async fn save(&self, session: &Session) -> Result<(), ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Session persisted as a JSON file.
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
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, ClientError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable session file"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes =
            serde_json::to_vec_pretty(session).map_err(|e| ClientError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Session kept only for the life of the process.
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.session.write().await = None;
        Ok(())
    }
}

/// Process-wide session shared by every view.
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn SessionStore>,
    client: BlogClient,
}

impl SessionContext {
    /// Start from whatever session `store` has persisted.
    pub async fn load(
        client: BlogClient,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let state = match store.load().await? {
            Some(session) => {
                tracing::debug!(user_id = %session.user.id, "Restored persisted session");
                SessionState::Authenticated(session)
            }
            None => SessionState::Anonymous,
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            store,
            client,
        })
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserResponse> {
        self.state.read().await.session().map(|s| s.user.clone())
    }

    /// A client carrying the current token, if any.
    pub async fn client(&self) -> BlogClient {
        match self.state.read().await.session() {
            Some(session) => self.client.authenticated(session.token.clone()),
            None => self.client.anonymous(),
        }
    }

    /// Apply an event and persist the outcome when the signed-in session changes.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<SessionState, ClientError> {
        let (before, after) = {
            let mut state = self.state.write().await;
            let before = state.clone();
            *state = before.clone().apply(event);
            (before, state.clone())
        };

        match (before.session(), after.session()) {
            (_, Some(session)) if before.session() != Some(session) => {
                self.store.save(session).await?
            }
            (Some(_), None) => self.store.clear().await?,
            _ => {}
        }

        Ok(after)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse, ClientError> {
        self.begin().await?;
        let result = self.client.anonymous().login(email, password).await;
        self.finish(result).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, ClientError> {
        self.begin().await?;
        let result = self.client.anonymous().register(req).await;
        self.finish(result).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.dispatch(SessionEvent::Logout).await.map(|_| ())
    }

    pub async fn clear_error(&self) -> Result<(), ClientError> {
        self.dispatch(SessionEvent::ClearError).await.map(|_| ())
    }

    async fn begin(&self) -> Result<(), ClientError> {
        match self.dispatch(SessionEvent::Start).await? {
            SessionState::Authenticating => Ok(()),
            SessionState::Authenticated(_) => Err(ClientError::InvalidState("Already signed in")),
            _ => Err(ClientError::InvalidState("Sign-in already in progress")),
        }
    }

    async fn finish(
        &self,
        result: Result<AuthResponse, ClientError>,
    ) -> Result<UserResponse, ClientError> {
        match result {
            Ok(auth) => {
                let session = Session::from(auth);
                let user = session.user.clone();
                self.dispatch(SessionEvent::Success(session)).await?;
                Ok(user)
            }
            Err(e) => {
                self.dispatch(SessionEvent::Failure(e.to_string())).await?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn session(name: &str) -> Session {
        Session {
            token: format!("token-{}", name),
            user: UserResponse {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: format!("{}@example.com", name),
                avatar: None,
                role: "user".to_string(),
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let s = SessionState::Anonymous.apply(SessionEvent::Start);
        assert_eq!(s, SessionState::Authenticating);

        let ada = session("ada");
        let s = s.apply(SessionEvent::Success(ada.clone()));
        assert_eq!(s.session(), Some(&ada));

        let s = s.apply(SessionEvent::Logout);
        assert_eq!(s, SessionState::Anonymous);
    }

    #[test]
    fn test_failure_then_clear_error() {
        let s = SessionState::Authenticating
            .apply(SessionEvent::Failure("Invalid credentials".into()));
        assert_eq!(s.error(), Some("Invalid credentials"));

        // Retrying straight from the error state is allowed.
        assert_eq!(s.clone().apply(SessionEvent::Start), SessionState::Authenticating);

        assert_eq!(s.apply(SessionEvent::ClearError), SessionState::Anonymous);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let ada = session("ada");

        assert_eq!(
            SessionState::Anonymous.apply(SessionEvent::Success(ada.clone())),
            SessionState::Anonymous
        );
        assert_eq!(
            SessionState::Anonymous.apply(SessionEvent::Logout),
            SessionState::Anonymous
        );
        assert_eq!(
            SessionState::Authenticating.apply(SessionEvent::Logout),
            SessionState::Authenticating
        );

        let signed_in = SessionState::Authenticated(ada);
        assert_eq!(signed_in.clone().apply(SessionEvent::Start), signed_in);
        assert_eq!(signed_in.clone().apply(SessionEvent::ClearError), signed_in);
    }

    #[tokio::test]
    async fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().await.unwrap().is_none());

        let ada = session("ada");
        store.save(&ada).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(ada));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_context_restores_persisted_session() {
        let store = Arc::new(MemorySessionStore::new());
        let ada = session("ada");
        store.save(&ada).await.unwrap();

        let ctx = SessionContext::load(BlogClient::new("http://localhost:1"), store)
            .await
            .unwrap();

        assert!(ctx.state().await.is_authenticated());
        assert_eq!(ctx.current_user().await.unwrap().name, "ada");
        assert_eq!(ctx.client().await.token(), Some("token-ada"));
    }

    #[tokio::test]
    async fn test_dispatch_persists_and_clears() {
        let store = Arc::new(MemorySessionStore::new());
        let ctx = SessionContext::load(BlogClient::new("http://localhost:1"), store.clone())
            .await
            .unwrap();

        let ada = session("ada");
        ctx.dispatch(SessionEvent::Start).await.unwrap();
        ctx.dispatch(SessionEvent::Success(ada.clone())).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(ada));

        // Clones share state.
        let other = ctx.clone();
        other.logout().await.unwrap();
        assert_eq!(ctx.state().await, SessionState::Anonymous);
        assert!(store.load().await.unwrap().is_none());
        assert_eq!(ctx.client().await.token(), None);
    }

    #[tokio::test]
    async fn test_login_transport_failure_lands_in_error_state() {
        // Nothing listens on port 1.
        let ctx = SessionContext::load(
            BlogClient::new("http://127.0.0.1:1"),
            Arc::new(MemorySessionStore::new()),
        )
        .await
        .unwrap();

        assert!(ctx.login("ada@example.com", "password1").await.is_err());
        assert!(ctx.state().await.error().is_some());

        ctx.clear_error().await.unwrap();
        assert_eq!(ctx.state().await, SessionState::Anonymous);
    }
}
