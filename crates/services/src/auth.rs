//! Identity boundary: who is signed in and when that changes.

use std::fmt;

use vocab_core::model::UserId;

/// A signed-in user and the token used for remote requests on their behalf.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
    access_token: String,
}

impl AuthUser {
    #[must_use]
    pub fn new(id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            id,
            email: None,
            access_token: access_token.into(),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Session changes reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthUser),
    SessionRestored(AuthUser),
    SignedOut,
}

impl AuthEvent {
    /// The user a sync should run for, if this event starts a session.
    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthEvent::SignedIn(user) | AuthEvent::SessionRestored(user) => Some(user),
            AuthEvent::SignedOut => None,
        }
    }
}

pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;
}

/// A session fixed at startup, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<AuthUser>,
}

impl StaticSession {
    #[must_use]
    pub fn new(user: Option<AuthUser>) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// The event a freshly started process reports for this session.
    #[must_use]
    pub fn initial_event(&self) -> AuthEvent {
        match &self.user {
            Some(user) => AuthEvent::SessionRestored(user.clone()),
            None => AuthEvent::SignedOut,
        }
    }
}

impl AuthProvider for StaticSession {
    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_the_token() {
        let user = AuthUser::new(UserId::random(), "secret-token").with_email("a@b.c");
        let rendered = format!("{user:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("a@b.c"));
    }

    #[test]
    fn static_session_restores_its_user() {
        let user = AuthUser::new(UserId::random(), "token");
        let session = StaticSession::new(Some(user.clone()));

        assert_eq!(session.current_user(), Some(user.clone()));
        assert_eq!(session.initial_event(), AuthEvent::SessionRestored(user.clone()));
        assert_eq!(session.initial_event().user(), Some(&user));
        assert_eq!(StaticSession::signed_out().initial_event(), AuthEvent::SignedOut);
    }
}
