use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::ws::manager::WsManager;

const HEARTBEAT_PERIOD: Duration = Duration::from_secs(30);

/// Ping all clients every 30 seconds, pruning connections whose socket
/// task has already ended. Aborted through the handle at shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; nobody is connected yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pruned = ws_manager.ping_all().await;
            let connections = ws_manager.connection_count().await;
            let users = ws_manager.user_count().await;
            tracing::debug!(
                connections,
                users,
                pruned,
                "WebSocket heartbeat",
            );
        }
    })
}
