//! Service-level tests against the in-memory doubles.

mod campaigns;

use std::sync::Arc;

use adpilot_core::campaign::{Campaign, CreateCampaign, Objective};
use adpilot_core::persona::{predefined_personas, CreatePersona, Persona};
use adpilot_core::types::DbId;
use chrono::{Duration, Utc};

use crate::testing::{FakeCapability, InMemoryStore, RecordingNotifier};
use crate::Services;

pub(crate) const OWNER: DbId = 1;
pub(crate) const STRANGER: DbId = 2;
pub(crate) const EDITOR: DbId = 3;
pub(crate) const VIEWER: DbId = 4;

pub(crate) struct Harness {
    pub store: Arc<InMemoryStore>,
    pub capability: Arc<FakeCapability>,
    pub notifier: Arc<RecordingNotifier>,
    pub services: Services,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_capability(FakeCapability::available())
    }

    pub fn with_capability(capability: FakeCapability) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let capability = Arc::new(capability);
        let notifier = Arc::new(RecordingNotifier::default());
        let services = Services::new(
            store.clone(),
            store.clone(),
            capability.clone(),
            notifier.clone(),
        );
        Self {
            store,
            capability,
            notifier,
            services,
        }
    }

    /// A custom persona owned by `owner`.
    pub async fn persona(&self, owner: DbId) -> Persona {
        self.services
            .personas
            .create(owner, persona_input("Weekend Gardener"))
            .await
            .expect("persona create")
    }

    /// A draft campaign owned by `owner`, targeting its own persona.
    pub async fn campaign(&self, owner: DbId) -> (Campaign, Persona) {
        let persona = self.persona(owner).await;
        let campaign = self
            .services
            .campaigns
            .create(owner, campaign_input(persona.id))
            .await
            .expect("campaign create");
        (campaign, persona)
    }
}

pub(crate) fn persona_input(name: &str) -> CreatePersona {
    let mut input = predefined_personas().remove(0);
    input.name = name.to_string();
    input
}

pub(crate) fn campaign_input(persona_id: DbId) -> CreateCampaign {
    let tomorrow = Utc::now() + Duration::days(1);
    CreateCampaign {
        name: "Q4 Launch".into(),
        description: None,
        objective: Objective::Awareness,
        persona_id,
        start_date: tomorrow,
        end_date: tomorrow + Duration::days(30),
        budget: Some(5000.0),
        currency: None,
        tone: None,
        keywords: None,
        target_audience: None,
        generation_settings: None,
        tags: None,
    }
}
