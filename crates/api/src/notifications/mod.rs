//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the event bus and pushes each
//! campaign event to the WebSocket connections of its recipients.

pub mod router;

pub use router::NotificationRouter;
