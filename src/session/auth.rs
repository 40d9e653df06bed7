//! Authentication gate - who is signed in right now.
//!
//! Reads are always allowed; mutations require a current identity. The gate
//! publishes identity changes through a `tokio::sync::watch` channel.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id from the provider
    pub uid: String,
    /// Email address, when the provider has one
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    /// Identity with only a uid (e.g. an anonymous session).
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }

    /// Identity with an email address.
    #[must_use]
    pub fn with_email(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
        }
    }

    /// Label written to the audit log: the email if known, otherwise the uid.
    #[must_use]
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.uid)
    }
}

/// Anything that can tell who is signed in.
pub trait IdentityProvider: Send + Sync {
    /// The current identity, or `None` when signed out.
    fn current_identity(&self) -> Option<Identity>;
}

/// In-process identity holder with change notifications.
#[derive(Debug)]
pub struct AuthGate {
    identity: watch::Sender<Option<Identity>>,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    /// A gate with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self { identity }
    }

    /// A gate with `identity` already signed in.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        let (identity, _) = watch::channel(Some(identity));
        Self { identity }
    }

    /// Signs `identity` in, replacing any previous one.
    pub fn sign_in(&self, identity: Identity) {
        info!("Signed in as {}", identity.label());
        self.identity.send_replace(Some(identity));
    }

    /// Signs the current identity out.
    pub fn sign_out(&self) {
        if let Some(previous) = self.identity.send_replace(None) {
            info!("Signed out {}", previous.label());
        }
    }

    /// Receiver that observes every identity change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}

impl IdentityProvider for AuthGate {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_label_prefers_email() {
        assert_eq!(Identity::new("uid-1").label(), "uid-1");
        assert_eq!(
            Identity::with_email("uid-1", "a@example.com").label(),
            "a@example.com"
        );
    }

    #[test]
    fn test_sign_in_and_out() {
        let gate = AuthGate::new();
        assert!(gate.current_identity().is_none());
        gate.sign_in(Identity::new("u"));
        assert_eq!(gate.current_identity(), Some(Identity::new("u")));
        gate.sign_out();
        assert!(gate.current_identity().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_identity_changes() {
        let gate = AuthGate::new();
        let mut rx = gate.subscribe();
        gate.sign_in(Identity::new("u"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(Identity::new("u")));
        gate.sign_out();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }
}
