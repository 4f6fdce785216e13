//! Application services for adpilot.
//!
//! Each service works purely against the traits in `adpilot_core`
//! ([`CampaignStore`], [`PersonaStore`], [`GenerationCapability`],
//! [`Notifier`]); concrete implementations are injected once at startup.
//!
//! - [`CampaignService`]: campaign aggregate operations.
//! - [`PersonaService`]: persona catalog operations.
//! - [`CampaignQueryService`]: listing, stats, dashboard.
//! - [`GenerationOrchestrator`]: AI-assisted content generation.

use std::sync::Arc;

use adpilot_core::error::CoreError;
use adpilot_core::generation::GenerationCapability;
use adpilot_core::notify::Notifier;
use adpilot_core::store::{CampaignStore, PersonaStore};
use adpilot_core::types::DbId;

pub mod campaigns;
pub mod orchestrator;
pub mod personas;
pub mod queries;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use campaigns::CampaignService;
pub use orchestrator::{AiStatus, BatchOutcome, GenerationOrchestrator};
pub use personas::PersonaService;
pub use queries::CampaignQueryService;

/// All services, wired to the same stores.
#[derive(Clone)]
pub struct Services {
    pub campaigns: Arc<CampaignService>,
    pub personas: Arc<PersonaService>,
    pub queries: Arc<CampaignQueryService>,
    pub generation: Arc<GenerationOrchestrator>,
}

impl Services {
    pub fn new(
        campaign_store: Arc<dyn CampaignStore>,
        persona_store: Arc<dyn PersonaStore>,
        capability: Arc<dyn GenerationCapability>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            campaigns: Arc::new(CampaignService::new(
                campaign_store.clone(),
                persona_store.clone(),
                notifier.clone(),
            )),
            personas: Arc::new(PersonaService::new(persona_store.clone())),
            queries: Arc::new(CampaignQueryService::new(campaign_store.clone())),
            generation: Arc::new(GenerationOrchestrator::new(
                campaign_store,
                persona_store,
                capability,
                notifier,
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared lookups
// ---------------------------------------------------------------------------

pub(crate) async fn require_campaign(
    store: &dyn CampaignStore,
    id: DbId,
) -> Result<adpilot_core::campaign::Campaign, CoreError> {
    store
        .find_campaign(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Campaign",
            id,
        })
}

pub(crate) async fn require_persona(
    store: &dyn PersonaStore,
    id: DbId,
) -> Result<adpilot_core::persona::Persona, CoreError> {
    store
        .find_persona(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Persona",
            id,
        })
}

pub(crate) fn forbidden(message: &str) -> CoreError {
    CoreError::Forbidden(message.to_string())
}
