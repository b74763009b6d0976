//! Basic-auth credentials and the request rule that attaches them.

use std::{fmt, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::AUTHORIZATION, RequestBuilder};
use tokio::sync::RwLock;

/// Full `Authorization` header value: `"Basic " + base64(username:password)`.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthToken(String);

impl BasicAuthToken {
    pub fn from_credentials(username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        Self(format!("Basic {encoded}"))
    }

    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BasicAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BasicAuthToken(Basic <redacted>)")
    }
}

/// Holds at most one credential and stamps it onto outgoing requests.
///
/// Clones share the same slot, so the session manager and the HTTP backend
/// always agree on the active credential. Installing a token replaces the
/// previous one; clearing it leaves requests unauthenticated.
#[derive(Debug, Clone, Default)]
pub struct AuthInterceptor {
    slot: Arc<RwLock<Option<BasicAuthToken>>>,
}

impl AuthInterceptor {
    pub async fn install(&self, token: BasicAuthToken) {
        *self.slot.write().await = Some(token);
    }

    pub async fn clear(&self) {
        self.slot.write().await.take();
    }

    pub async fn current(&self) -> Option<BasicAuthToken> {
        self.slot.read().await.clone()
    }

    pub async fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.current().await {
            Some(token) => request.header(AUTHORIZATION, token.header_value()),
            None => request,
        }
    }
}
