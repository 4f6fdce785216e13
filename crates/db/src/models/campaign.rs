//! Campaign row model.
//!
//! Enum columns hold the same strings the API emits; embedded collections
//! are JSONB arrays in the camelCase wire shape.

use adpilot_core::ab_test::AbTest;
use adpilot_core::campaign::{
    Campaign, CampaignMetrics, Collaborator, GenerationJob, GenerationSettings, TargetAudience,
};
use adpilot_core::content::Content;
use adpilot_core::error::CoreError;
use adpilot_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use super::parse_column;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow)]
pub struct CampaignRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub persona_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub objective: String,
    pub status: String,
    pub budget: f64,
    pub currency: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub tone: String,
    pub keywords: Option<String>,
    pub target_audience: Json<TargetAudience>,
    pub content: Json<Vec<Content>>,
    pub ab_tests: Json<Vec<AbTest>>,
    pub metrics: Json<CampaignMetrics>,
    pub generation_settings: Json<GenerationSettings>,
    pub generation_job: Json<GenerationJob>,
    pub collaborators: Json<Vec<Collaborator>>,
    pub is_archived: bool,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = CoreError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        Ok(Campaign {
            id: row.id,
            owner_id: row.owner_id,
            persona_id: row.persona_id,
            name: row.name,
            description: row.description,
            objective: parse_column("campaigns.objective", &row.objective)?,
            status: parse_column("campaigns.status", &row.status)?,
            budget: row.budget,
            currency: parse_column("campaigns.currency", &row.currency)?,
            start_date: row.start_date,
            end_date: row.end_date,
            tone: parse_column("campaigns.tone", &row.tone)?,
            keywords: row.keywords,
            target_audience: row.target_audience.0,
            content: row.content.0,
            ab_tests: row.ab_tests.0,
            metrics: row.metrics.0,
            generation_settings: row.generation_settings.0,
            generation_job: row.generation_job.0,
            collaborators: row.collaborators.0,
            is_archived: row.is_archived,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
