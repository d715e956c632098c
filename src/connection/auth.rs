use std::sync::{Arc, RwLock};

/// Source of the bearer token attached to outgoing requests
///
/// Queried once per physical attempt. `None` or an empty string means the
/// request goes out unauthenticated.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Never authenticates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenStore for NoToken {
    fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenStore for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

impl<F> TokenStore for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Mutable token slot shared between the client and the login flow
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedTokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token returned by a successful login
    pub fn set(&self, token: impl Into<String>) {
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
    }

    /// Forget the token (logout)
    pub fn clear(&self) {
        let mut slot = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

impl TokenStore for SharedTokenStore {
    fn token(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

/// Render the `Authorization` header value, if any
pub(crate) fn bearer(store: &dyn TokenStore) -> Option<String> {
    store
        .token()
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("Bearer {}", t.trim()))
}
