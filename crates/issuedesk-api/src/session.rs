// Session context
//
// The bearer token and the current user, with an explicit lifecycle:
// `begin` at login, read by the client on every request, `evict` on
// logout or on a `401`. Shared by `Arc` and passed in explicitly; there
// is no ambient global.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<Value>,
    evicted: bool,
}

/// Authenticated session shared between the API client and its owner.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// An empty session (not logged in).
    pub fn new() -> Self {
        Self::default()
    }

    /// A session resumed from a previously stored token.
    pub fn with_token(token: SecretString) -> Self {
        Self {
            state: RwLock::new(SessionState {
                token: Some(token),
                user: None,
                evicted: false,
            }),
        }
    }

    /// Start a session with a freshly issued token.
    pub fn begin(&self, token: SecretString) {
        debug!("session started");
        let mut state = self.write();
        state.token = Some(token);
        state.user = None;
        state.evicted = false;
    }

    /// Record the authenticated user as reported by `/auth/me`.
    pub fn set_user(&self, user: Value) {
        self.write().user = Some(user);
    }

    /// The current bearer token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.read().token.clone()
    }

    /// The raw user record from `/auth/me`, if one was fetched.
    pub fn user(&self) -> Option<Value> {
        self.read().user.clone()
    }

    pub fn is_active(&self) -> bool {
        self.read().token.is_some()
    }

    /// `true` once the server rejected this session with a `401`.
    ///
    /// Owners that persist the token use this to discard it.
    pub fn was_evicted(&self) -> bool {
        self.read().evicted
    }

    /// Drop the token and user after a `401`.
    pub fn evict(&self) {
        debug!("session evicted");
        let mut state = self.write();
        let had_token = state.token.take().is_some();
        state.user = None;
        state.evicted = state.evicted || had_token;
    }

    /// Drop the token and user on an explicit logout.
    pub fn end(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    /// Header value for the `Authorization` header, if logged in.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.read()
            .token
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret()))
    }

    // Lock poisoning only happens if a writer panicked mid-update; the
    // state is plain data, so recover the guard instead of propagating.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn begin_then_evict() {
        let session = Session::new();
        assert!(!session.is_active());

        session.begin(SecretString::from("abc".to_owned()));
        session.set_user(json!({"id": 1}));
        assert!(session.is_active());
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));

        session.evict();
        assert!(!session.is_active());
        assert!(session.user().is_none());
        assert!(session.was_evicted());
    }

    #[test]
    fn evict_without_token_is_not_flagged() {
        let session = Session::new();
        session.evict();
        assert!(!session.was_evicted());
    }

    #[test]
    fn logout_is_not_an_eviction() {
        let session = Session::with_token(SecretString::from("t".to_owned()));
        session.end();
        assert!(!session.is_active());
        assert!(!session.was_evicted());
    }

    #[test]
    fn begin_clears_eviction_flag() {
        let session = Session::with_token(SecretString::from("old".to_owned()));
        session.evict();
        session.begin(SecretString::from("new".to_owned()));
        assert!(!session.was_evicted());
    }
}
