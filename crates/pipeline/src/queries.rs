//! Owner-scoped campaign reads: list, stats, dashboard.
//!
//! Collaborators get no list-level visibility; only owned, non-archived
//! campaigns are returned.

use std::sync::Arc;

use adpilot_core::campaign::Campaign;
use adpilot_core::error::CoreError;
use adpilot_core::query::{CampaignListParams, CampaignQuery, Page};
use adpilot_core::stats::{campaign_stats, dashboard, CampaignStats, Dashboard};
use adpilot_core::store::CampaignStore;
use adpilot_core::types::DbId;
use chrono::Utc;

pub struct CampaignQueryService {
    campaigns: Arc<dyn CampaignStore>,
}

impl CampaignQueryService {
    pub fn new(campaigns: Arc<dyn CampaignStore>) -> Self {
        Self { campaigns }
    }

    pub async fn list(
        &self,
        actor: DbId,
        params: CampaignListParams,
    ) -> Result<Page<Campaign>, CoreError> {
        let query = CampaignQuery::from(params);
        self.campaigns.list_campaigns(actor, &query).await
    }

    pub async fn stats(&self, actor: DbId) -> Result<CampaignStats, CoreError> {
        let campaigns = self.campaigns.list_all_for_owner(actor).await?;
        Ok(campaign_stats(&campaigns))
    }

    pub async fn dashboard(&self, actor: DbId) -> Result<Dashboard, CoreError> {
        let campaigns = self.campaigns.list_all_for_owner(actor).await?;
        Ok(dashboard(&campaigns, Utc::now()))
    }
}
