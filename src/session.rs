//! Session capability injected into API clients and list controllers.
//!
//! The session is the only holder of the bearer credential. Consumers get a
//! read-only view (`token`) plus one write: `expire`, called when the backend
//! answers 401. Expiry clears the credential and schedules a single reload
//! after a short delay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use secrecy::SecretString;
use tokio::sync::broadcast;

use crate::events::ListEvent;

pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(1500);

pub trait Session: Send + Sync {
    /// Current bearer credential, if signed in.
    fn token(&self) -> Option<SecretString>;

    /// Handle an authentication expiry reported by the backend.
    fn expire(&self);
}

/// In-process credential holder.
pub struct CredentialStore {
    token: RwLock<Option<SecretString>>,
    reload_delay: Duration,
    reload_scheduled: AtomicBool,
    events: broadcast::Sender<ListEvent>,
}

impl CredentialStore {
    pub fn new(
        token: Option<String>,
        reload_delay: Duration,
        events: broadcast::Sender<ListEvent>,
    ) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty()).map(SecretString::from)),
            reload_delay,
            reload_scheduled: AtomicBool::new(false),
            events,
        }
    }

    /// Install a fresh credential (after sign-in). Re-arms reload scheduling.
    pub fn sign_in(&self, token: String) {
        *self.token.write() = Some(SecretString::from(token));
        self.reload_scheduled.store(false, Ordering::SeqCst);
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn reload_scheduled(&self) -> bool {
        self.reload_scheduled.load(Ordering::SeqCst)
    }
}

impl Session for CredentialStore {
    fn token(&self) -> Option<SecretString> {
        use secrecy::ExposeSecret;

        self.token
            .read()
            .as_ref()
            .map(|t| SecretString::from(t.expose_secret().to_string()))
    }

    fn expire(&self) {
        self.token.write().take();

        if self.reload_scheduled.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::info!(
            delay_ms = self.reload_delay.as_millis() as u64,
            "session expired, credential cleared; reload scheduled"
        );

        let events = self.events.clone();
        let delay = self.reload_delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(ListEvent::Reload);
                });
            }
            Err(_) => {
                tracing::warn!("no async runtime available, reloading immediately");
                let _ = events.send(ListEvent::Reload);
            }
        }
    }
}

/// A session that never carries a credential. Useful for public endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl Session for Anonymous {
    fn token(&self) -> Option<SecretString> {
        None
    }

    fn expire(&self) {}
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::events::EventBus;

    #[test]
    fn test_empty_token_is_signed_out() {
        let bus = EventBus::new();
        let store = CredentialStore::new(Some(String::new()), DEFAULT_RELOAD_DELAY, bus.sender());
        assert!(!store.is_signed_in());
        assert!(store.token().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_clears_token_and_schedules_one_reload() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let store = CredentialStore::new(
            Some("tok_live".to_string()),
            Duration::from_millis(1500),
            bus.sender(),
        );
        assert_eq!(store.token().unwrap().expose_secret(), "tok_live");

        store.expire();
        store.expire();
        assert!(store.token().is_none());
        assert!(store.reload_scheduled());

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await.unwrap(), ListEvent::Reload);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_rearms_reload() {
        let bus = EventBus::new();
        let store = CredentialStore::new(None, Duration::from_millis(10), bus.sender());
        store.expire();
        assert!(store.reload_scheduled());

        store.sign_in("tok_new".to_string());
        assert!(store.is_signed_in());
        assert!(!store.reload_scheduled());
    }
}
