//! Side-channel events that ask list controllers to refetch.
//!
//! Controllers never listen to ambient globals. Each one is handed a
//! `broadcast::Receiver<ListEvent>` at construction and reacts to exactly
//! two event names:
//!
//! - `refetch`: a record (or a whole collection) changed elsewhere, e.g. a
//!   socket push or another tab. Controllers whose endpoint matches refetch.
//! - `reload`: the session was reset. Every controller refetches.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// Data behind `resource` (an endpoint such as `/order`) changed.
    /// `id` narrows it to one record when known.
    Refetch {
        resource: String,
        id: Option<String>,
    },
    Reload,
}

impl ListEvent {
    pub fn refetch(resource: impl Into<String>, id: Option<String>) -> Self {
        ListEvent::Refetch {
            resource: resource.into(),
            id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListEvent::Refetch { .. } => "refetch",
            ListEvent::Reload => "reload",
        }
    }

    /// Whether a controller listing `endpoint` should react to this event.
    pub fn applies_to(&self, endpoint: &str) -> bool {
        match self {
            ListEvent::Refetch { resource, .. } => {
                resource.trim_end_matches('/') == endpoint.trim_end_matches('/')
            }
            ListEvent::Reload => true,
        }
    }
}

/// Fan-out point for [`ListEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ListEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.sender.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<ListEvent> {
        self.sender.clone()
    }

    /// Publish an event. Returns how many subscribers received it.
    pub fn publish(&self, event: ListEvent) -> usize {
        tracing::debug!(event = event.name(), "publishing list event");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refetch_matches_endpoint() {
        let event = ListEvent::refetch("/order", Some("12".to_string()));
        assert_eq!(event.name(), "refetch");
        assert!(event.applies_to("/order"));
        assert!(event.applies_to("/order/"));
        assert!(!event.applies_to("/billing"));
    }

    #[test]
    fn test_reload_applies_everywhere() {
        assert!(ListEvent::Reload.applies_to("/campaign"));
        assert_eq!(ListEvent::Reload.name(), "reload");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(ListEvent::Reload), 0);

        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(ListEvent::Reload), 1);
        assert_eq!(rx.recv().await.unwrap(), ListEvent::Reload);
    }
}
