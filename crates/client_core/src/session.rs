use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{auth::BasicAuthToken, EmployeeBackend};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    Authenticated {
        username: String,
        token: BasicAuthToken,
    },
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { username, .. } => Some(username),
            Self::LoggedOut => None,
        }
    }

    pub fn token(&self) -> Option<&BasicAuthToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::LoggedOut => None,
        }
    }
}

/// Owns the authentication state and the backend's credential rule.
///
/// Consumers receive the manager by reference (or `Arc`) rather than reading
/// process-wide state. Logging out drops the username and token together.
pub struct SessionManager {
    backend: Arc<dyn EmployeeBackend>,
    state: RwLock<Session>,
    /// Serializes every login and logout, so the session state and the
    /// interceptor slot always change together.
    gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn EmployeeBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(Session::LoggedOut),
            gate: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> Arc<dyn EmployeeBackend> {
        Arc::clone(&self.backend)
    }

    /// Verifies the credentials and, on HTTP 200, makes them the credential
    /// attached to every later request. Any other outcome logs the session out.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let _gate = self.gate.lock().await;
        let token = BasicAuthToken::from_credentials(username, password);

        match self.backend.authenticate(&token).await {
            Ok(200) => {
                let mut state = self.state.write().await;
                self.backend.interceptor().install(token.clone()).await;
                *state = Session::Authenticated {
                    username: username.to_string(),
                    token,
                };
                drop(state);
                info!(username, "session: login succeeded");
                true
            }
            Ok(status) => {
                warn!(username, status, "session: login rejected by backend");
                self.logout_locked().await;
                false
            }
            Err(err) => {
                warn!(username, error = %format!("{err:#}"), "session: login request failed");
                self.logout_locked().await;
                false
            }
        }
    }

    pub async fn logout(&self) {
        let _gate = self.gate.lock().await;
        self.logout_locked().await;
    }

    /// Caller must hold `gate`.
    async fn logout_locked(&self) {
        let previous = {
            let mut state = self.state.write().await;
            self.backend.interceptor().clear().await;
            std::mem::take(&mut *state)
        };
        if let Session::Authenticated { username, .. } = previous {
            info!(username = %username, "session: logged out");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn username(&self) -> Option<String> {
        self.state.read().await.username().map(str::to_string)
    }

    pub async fn token(&self) -> Option<BasicAuthToken> {
        self.state.read().await.token().cloned()
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }
}
