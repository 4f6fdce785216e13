//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>`; the services see it only as
//! a [`Notifier`].

use adpilot_core::notify::{Notification, Notifier};
use adpilot_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// CampaignEvent
// ---------------------------------------------------------------------------

/// Something that happened to a campaign, addressed to a set of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignEvent {
    /// Dot-separated event name, e.g. `"content.generated"`.
    pub event_type: String,

    pub campaign_id: Option<DbId>,

    /// User that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Users the event is delivered to. Not part of the pushed message.
    #[serde(skip)]
    pub recipients: Vec<DbId>,

    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl CampaignEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            campaign_id: None,
            actor_user_id: None,
            recipients: Vec::new(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_campaign(mut self, campaign_id: DbId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<DbId>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

impl From<Notification> for CampaignEvent {
    fn from(n: Notification) -> Self {
        CampaignEvent::new(n.event)
            .with_campaign(n.campaign_id)
            .with_actor(n.actor_id)
            .with_recipients(n.recipients)
            .with_payload(n.payload)
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use adpilot_events::bus::{CampaignEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(CampaignEvent::new("campaign.updated"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<CampaignEvent>,
}

impl EventBus {
    /// Slow receivers past `capacity` observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently without any.
    pub fn publish(&self, event: CampaignEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CampaignEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier for EventBus {
    fn notify(&self, notification: Notification) {
        self.publish(notification.into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            CampaignEvent::new("content.generated")
                .with_campaign(42)
                .with_actor(7)
                .with_recipients(vec![7, 9])
                .with_payload(serde_json::json!({"count": 3})),
        );

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "content.generated");
        assert_eq!(received.campaign_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.recipients, vec![7, 9]);
        assert_eq!(received.payload["count"], 3);
    }

    #[tokio::test]
    async fn notifier_impl_forwards_to_subscribers() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let notifier: &dyn Notifier = &bus;
        notifier.notify(Notification::new("campaign.archived", 5, 1).to(vec![1]));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event_type, "campaign.archived");
        assert_eq!(e2.campaign_id, Some(5));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(CampaignEvent::new("orphan.event"));
    }

    #[test]
    fn recipients_are_not_serialized() {
        let event = CampaignEvent::new("x").with_recipients(vec![1, 2]);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("recipients").is_none());
        assert_eq!(json["eventType"], "x");
    }
}
