use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::store::{CredentialKey, SessionStore};

/// Capacity of the session event channel. Events are rare; a lagging
/// subscriber only needs the most recent ones.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Credentials issued by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Session lifecycle notifications for the outer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    /// The user asked to end the session.
    LoggedOut,
    /// Renewal was impossible; both credentials are already gone.
    Expired,
}

/// Handle over the credential store plus the event channel.
/// Clone is cheap and all clones share the same store and subscribers.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current access credential. Store errors are logged and read as absent.
    pub fn access_token(&self) -> Option<String> {
        self.read(CredentialKey::Access)
    }

    /// Current refresh credential. Store errors are logged and read as absent.
    pub fn refresh_token(&self) -> Option<String> {
        self.read(CredentialKey::Refresh)
    }

    /// Route guard: only the access credential counts.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Store a freshly issued credential pair. On a failed write nothing
    /// is left behind.
    pub fn begin(&self, tokens: &TokenPair) -> Result<()> {
        // Refresh first: the route guard only looks at the access credential
        let stored = self
            .store
            .set(CredentialKey::Refresh, &tokens.refresh)
            .and_then(|_| self.store.set(CredentialKey::Access, &tokens.access));
        if let Err(e) = stored {
            self.clear();
            return Err(e);
        }
        info!("Session started");
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Overwrite the access credential after a renewal.
    pub fn set_access(&self, token: &str) -> Result<()> {
        self.store.set(CredentialKey::Access, token)
    }

    /// Clear both credentials and notify subscribers.
    pub fn logout(&self) {
        self.clear();
        info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    /// End the session after an unrecoverable authorization failure.
    /// Storage is cleared before `Expired` is sent.
    pub fn terminate(&self) {
        self.clear();
        warn!("Session terminated, login required");
        self.emit(SessionEvent::Expired);
    }

    fn clear(&self) {
        // Attempt every key even if one removal fails
        for key in CredentialKey::ALL {
            if let Err(e) = self.store.remove(key) {
                error!(key = %key, error = %e, "Failed to remove credential");
            }
        }
    }

    fn read(&self, key: CredentialKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read credential");
                None
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        if self.events.send(event).is_err() {
            debug!(?event, "No session event subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FailingStore;
    use crate::auth::MemoryStore;

    fn tokens() -> TokenPair {
        TokenPair {
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
        }
    }

    #[test]
    fn test_guard_tracks_access_only() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());
        assert!(!session.is_authenticated());

        store.set(CredentialKey::Refresh, "r").unwrap();
        assert!(!session.is_authenticated());

        store.set(CredentialKey::Access, "a").unwrap();
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_begin_stores_both_and_notifies() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut events = session.subscribe();

        session.begin(&tokens()).unwrap();

        assert_eq!(session.access_token().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedIn);
    }

    #[test]
    fn test_begin_failure_leaves_no_session() {
        let store = Arc::new(FailingStore::default().failing_set(CredentialKey::Refresh));
        let session = Session::new(store.clone());
        let mut events = session.subscribe();

        assert!(session.begin(&tokens()).is_err());

        assert!(!session.is_authenticated());
        assert_eq!(store.get(CredentialKey::Access).unwrap(), None);
        assert_eq!(store.get(CredentialKey::Refresh).unwrap(), None);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_begin_clears_refresh_when_access_write_fails() {
        let store = Arc::new(FailingStore::default().failing_set(CredentialKey::Access));
        let session = Session::new(store.clone());

        assert!(session.begin(&tokens()).is_err());

        assert!(!session.is_authenticated());
        assert_eq!(store.get(CredentialKey::Refresh).unwrap(), None);
    }

    #[test]
    fn test_logout_clears_both() {
        let session = Session::new(Arc::new(MemoryStore::with_tokens("a", "r")));
        let mut events = session.subscribe();

        session.logout();

        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
    }

    #[test]
    fn test_logout_when_already_empty() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut events = session.subscribe();

        session.logout();
        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::LoggedOut);
    }

    #[test]
    fn test_terminate_clears_before_emitting() {
        let session = Session::new(Arc::new(MemoryStore::with_tokens("a", "r")));
        let mut events = session.subscribe();

        session.terminate();

        assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
    }
}
