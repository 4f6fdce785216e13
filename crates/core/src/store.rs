//! Persistence contracts consumed by the services.
//!
//! Implementations: `adpilot_db::PgStore` (PostgreSQL) and the in-memory
//! store behind the `testing` feature of `adpilot-pipeline`.

use async_trait::async_trait;

use crate::ab_test::AbTest;
use crate::campaign::{Campaign, NewCampaign};
use crate::content::Content;
use crate::error::CoreError;
use crate::persona::{NewPersona, Persona};
use crate::query::{CampaignQuery, Page};
use crate::types::DbId;

#[async_trait]
pub trait PersonaStore: Send + Sync {
    async fn find_persona(&self, id: DbId) -> Result<Option<Persona>, CoreError>;

    /// Predefined personas plus those owned by `user_id`, optionally
    /// filtered by a case-insensitive search over name and description.
    async fn list_visible_personas(
        &self,
        user_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<Persona>, CoreError>;

    async fn insert_persona(&self, persona: NewPersona) -> Result<Persona, CoreError>;

    /// Replace the mutable fields of an existing persona.
    async fn save_persona(&self, persona: &Persona) -> Result<Persona, CoreError>;

    /// Returns false when the row did not exist.
    async fn delete_persona(&self, id: DbId) -> Result<bool, CoreError>;

    /// Number of campaigns (archived or not) referencing the persona.
    async fn count_campaigns_using_persona(&self, persona_id: DbId) -> Result<i64, CoreError>;

    /// Whether a predefined persona with this name already exists.
    async fn predefined_persona_exists(&self, name: &str) -> Result<bool, CoreError>;
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Cheap round-trip used by the health check.
    async fn ping(&self) -> Result<(), CoreError>;

    async fn find_campaign(&self, id: DbId) -> Result<Option<Campaign>, CoreError>;

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, CoreError>;

    /// Persist every field except `content` and `ab_tests`, which only
    /// change through the append primitives below.
    async fn save_campaign(&self, campaign: &Campaign) -> Result<Campaign, CoreError>;

    async fn delete_campaign(&self, id: DbId) -> Result<bool, CoreError>;

    /// Atomically append all `items` to the campaign's content sequence.
    ///
    /// Either every item is appended or none is. Concurrent appends from
    /// other requests must all survive.
    async fn append_content(&self, campaign_id: DbId, items: &[Content]) -> Result<(), CoreError>;

    /// Atomically append one A/B test.
    async fn append_ab_test(&self, campaign_id: DbId, test: &AbTest) -> Result<(), CoreError>;

    /// Owner-scoped, non-archived page of campaigns.
    async fn list_campaigns(
        &self,
        owner_id: DbId,
        query: &CampaignQuery,
    ) -> Result<Page<Campaign>, CoreError>;

    /// Every non-archived campaign of the owner, for stats and dashboard.
    async fn list_all_for_owner(&self, owner_id: DbId) -> Result<Vec<Campaign>, CoreError>;
}
