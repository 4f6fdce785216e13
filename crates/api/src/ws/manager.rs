use std::collections::{BTreeSet, HashMap};

use adpilot_core::types::DbId;
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Outbound half of one connection's message channel.
pub type WsSender = mpsc::UnboundedSender<Message>;

#[derive(Default)]
struct Registry {
    /// conn_id -> (owner, sender)
    connections: HashMap<String, (DbId, WsSender)>,
    /// user_id -> that user's open conn_ids (one per browser tab).
    by_user: HashMap<DbId, BTreeSet<String>>,
}

impl Registry {
    fn detach(&mut self, conn_id: &str) {
        let Some((user_id, _)) = self.connections.remove(conn_id) else {
            return;
        };
        if let Some(ids) = self.by_user.get_mut(&user_id) {
            ids.remove(conn_id);
            if ids.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
    }
}

/// Tracks authenticated WebSocket connections, indexed by user so that
/// campaign notifications reach every tab of each recipient.
///
/// Shared as `Arc<WsManager>`.
#[derive(Default)]
pub struct WsManager {
    registry: RwLock<Registry>,
}

impl WsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for `user_id`, replacing any previous
    /// connection with the same id. Returns the receiver the socket task
    /// drains into its sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.registry.write().await;
        registry.detach(&conn_id);
        registry
            .by_user
            .entry(user_id)
            .or_default()
            .insert(conn_id.clone());
        registry.connections.insert(conn_id, (user_id, tx));
        rx
    }

    /// Forget a connection. Unknown ids are ignored.
    pub async fn remove(&self, conn_id: &str) {
        self.registry.write().await.detach(conn_id);
    }

    /// Push `message` to every open connection of `user_id`. Returns how
    /// many connections accepted it.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let registry = self.registry.read().await;
        let Some(ids) = registry.by_user.get(&user_id) else {
            return 0;
        };
        let mut delivered = 0;
        for (_, sender) in ids.iter().filter_map(|id| registry.connections.get(id)) {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Number of distinct users with at least one open connection.
    pub async fn user_count(&self) -> usize {
        self.registry.read().await.by_user.len()
    }

    /// Send a Close frame everywhere and drop all connections.
    pub async fn shutdown_all(&self) {
        let mut registry = self.registry.write().await;
        let count = registry.connections.len();
        for (_, sender) in registry.connections.values() {
            let _ = sender.send(Message::Close(None));
        }
        *registry = Registry::default();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Ping every connection and drop those whose receiver is gone.
    /// Returns the number of connections pruned.
    pub async fn ping_all(&self) -> usize {
        let mut registry = self.registry.write().await;
        let dead: Vec<String> = registry
            .connections
            .iter()
            .filter(|(_, (_, sender))| sender.send(Message::Ping(Bytes::new())).is_err())
            .map(|(id, _)| id.clone())
            .collect();
        for id in &dead {
            registry.detach(id);
        }
        dead.len()
    }
}
