//! Best-effort real-time notification contract.

use serde::Serialize;

use crate::types::DbId;

/// Event names pushed to connected clients.
pub mod events {
    pub const CONTENT_GENERATED: &str = "content.generated";
    pub const CONTENT_ADDED: &str = "content.added";
    pub const BATCH_COMPLETED: &str = "batch.completed";
    pub const CAMPAIGN_UPDATED: &str = "campaign.updated";
    pub const CAMPAIGN_ARCHIVED: &str = "campaign.archived";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub event: String,
    pub campaign_id: DbId,
    pub actor_id: DbId,
    /// Users that should receive the event.
    #[serde(skip)]
    pub recipients: Vec<DbId>,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(event: &str, campaign_id: DbId, actor_id: DbId) -> Self {
        Self {
            event: event.to_string(),
            campaign_id,
            actor_id,
            recipients: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn to(mut self, recipients: Vec<DbId>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Fire-and-forget delivery. Implementations must not block and must
/// swallow their own failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}
