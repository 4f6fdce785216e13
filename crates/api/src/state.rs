use std::sync::Arc;

use adpilot_core::store::CampaignStore;
use adpilot_events::EventBus;
use adpilot_pipeline::Services;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Campaign, persona, query and generation services.
    pub services: Services,
    /// Store handle used by the health check.
    pub campaign_store: Arc<dyn CampaignStore>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// In-process event bus; also the services' notifier.
    pub event_bus: Arc<EventBus>,
}
