//! In-process event bus for adpilot.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`,
//!   also the production [`Notifier`](adpilot_core::notify::Notifier).
//! - [`CampaignEvent`]: the event envelope carried on the bus.

pub mod bus;

pub use bus::{CampaignEvent, EventBus};
