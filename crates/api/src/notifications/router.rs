//! Event-to-WebSocket routing.
//!
//! [`NotificationRouter`] consumes [`CampaignEvent`]s from the bus and
//! pushes each one to every open connection of its recipients. Delivery is
//! best-effort: offline users simply miss the push.

use std::collections::BTreeSet;
use std::sync::Arc;

use adpilot_events::CampaignEvent;
use axum::extract::ws::Message;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](adpilot_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<CampaignEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.route_event(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Push one event to its recipients. Returns the number of connections
    /// reached.
    pub async fn route_event(&self, event: &CampaignEvent) -> usize {
        let message = serde_json::json!({
            "type": "notification",
            "event": event.event_type,
            "campaignId": event.campaign_id,
            "actorId": event.actor_user_id,
            "payload": event.payload,
            "timestamp": event.timestamp,
        });
        let text = message.to_string();

        let recipients: BTreeSet<_> = event.recipients.iter().copied().collect();
        let mut delivered = 0;
        for user_id in recipients {
            delivered += self
                .ws_manager
                .send_to_user(user_id, Message::Text(text.clone().into()))
                .await;
        }
        tracing::debug!(
            event_type = %event.event_type,
            campaign_id = ?event.campaign_id,
            delivered,
            "Routed campaign event"
        );
        delivered
    }
}
