//! Campaign aggregate operations: create, read, update, delete, archive,
//! manual content, A/B tests and collaborators.

use std::sync::Arc;

use adpilot_core::ab_test::{AbTest, NewAbTest};
use adpilot_core::access::{
    campaign_deletable, campaign_editable, campaign_readable, is_owner, persona_readable,
};
use adpilot_core::campaign::{
    AddCollaborator, Campaign, Collaborator, CreateCampaign, NewCampaign, UpdateCampaign,
};
use adpilot_core::content::{Content, NewContent};
use adpilot_core::error::CoreError;
use adpilot_core::notify::{events, Notification, Notifier};
use adpilot_core::store::{CampaignStore, PersonaStore};
use adpilot_core::types::DbId;
use chrono::Utc;
use serde_json::json;

use crate::{forbidden, require_campaign, require_persona};

pub struct CampaignService {
    campaigns: Arc<dyn CampaignStore>,
    personas: Arc<dyn PersonaStore>,
    notifier: Arc<dyn Notifier>,
}

impl CampaignService {
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        personas: Arc<dyn PersonaStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            campaigns,
            personas,
            notifier,
        }
    }

    /// Create a draft campaign owned by `actor`.
    pub async fn create(&self, actor: DbId, input: CreateCampaign) -> Result<Campaign, CoreError> {
        let new = NewCampaign::from_input(actor, input, Utc::now())?;

        let persona = require_persona(self.personas.as_ref(), new.persona_id).await?;
        if !persona_readable(&persona, actor) {
            return Err(forbidden("You do not have access to this persona"));
        }

        let campaign = self.campaigns.insert_campaign(new).await?;
        tracing::info!(campaign_id = campaign.id, user_id = actor, "Campaign created");
        Ok(campaign)
    }

    pub async fn get(&self, id: DbId, actor: DbId) -> Result<Campaign, CoreError> {
        let campaign = require_campaign(self.campaigns.as_ref(), id).await?;
        if !campaign_readable(&campaign, actor) {
            return Err(forbidden("You do not have access to this campaign"));
        }
        Ok(campaign)
    }

    pub async fn update(
        &self,
        id: DbId,
        actor: DbId,
        patch: UpdateCampaign,
    ) -> Result<Campaign, CoreError> {
        let mut campaign = self.load_editable(id, actor).await?;

        if let Some(persona_id) = patch.persona_id.filter(|p| *p != campaign.persona_id) {
            let persona = require_persona(self.personas.as_ref(), persona_id).await?;
            if !persona_readable(&persona, actor) {
                return Err(forbidden("You do not have access to this persona"));
            }
        }

        campaign.apply_update(patch, Utc::now())?;
        let saved = self.campaigns.save_campaign(&campaign).await?;

        tracing::info!(campaign_id = id, user_id = actor, status = %saved.status, "Campaign updated");
        self.publish(&saved, actor, events::CAMPAIGN_UPDATED, json!({ "status": saved.status }));
        Ok(saved)
    }

    /// Owner-only; only drafts can be deleted.
    pub async fn delete(&self, id: DbId, actor: DbId) -> Result<(), CoreError> {
        let campaign = require_campaign(self.campaigns.as_ref(), id).await?;
        if !campaign_deletable(&campaign, actor) {
            return Err(forbidden("Only the campaign owner can delete it"));
        }
        campaign.ensure_deletable()?;

        if !self.campaigns.delete_campaign(id).await? {
            return Err(CoreError::NotFound {
                entity: "Campaign",
                id,
            });
        }
        tracing::info!(campaign_id = id, user_id = actor, "Campaign deleted");
        Ok(())
    }

    pub async fn archive(&self, id: DbId, actor: DbId) -> Result<Campaign, CoreError> {
        let mut campaign = self.load_editable(id, actor).await?;
        campaign.archive(Utc::now())?;
        let saved = self.campaigns.save_campaign(&campaign).await?;

        tracing::info!(campaign_id = id, user_id = actor, "Campaign archived");
        self.publish(&saved, actor, events::CAMPAIGN_ARCHIVED, json!({}));
        Ok(saved)
    }

    /// Append a manually written content item.
    pub async fn add_content(
        &self,
        id: DbId,
        actor: DbId,
        input: NewContent,
    ) -> Result<Content, CoreError> {
        let campaign = self.load_editable(id, actor).await?;
        campaign.ensure_accepts_content()?;

        let item = Content::build(input, None, Utc::now())?;
        self.campaigns
            .append_content(id, std::slice::from_ref(&item))
            .await?;

        tracing::info!(campaign_id = id, user_id = actor, content_id = %item.id, "Content added");
        self.publish(
            &campaign,
            actor,
            events::CONTENT_ADDED,
            json!({ "contentIds": [item.id], "contentType": item.content_type }),
        );
        Ok(item)
    }

    pub async fn add_ab_test(
        &self,
        id: DbId,
        actor: DbId,
        input: NewAbTest,
    ) -> Result<AbTest, CoreError> {
        let campaign = self.load_editable(id, actor).await?;
        campaign.ensure_accepts_content()?;

        let test = AbTest::build(input, Utc::now())?;
        self.campaigns.append_ab_test(id, &test).await?;

        tracing::info!(campaign_id = id, user_id = actor, test_id = %test.id, "A/B test added");
        Ok(test)
    }

    /// Owner-only. The owner and existing members cannot be added again.
    pub async fn add_collaborator(
        &self,
        id: DbId,
        actor: DbId,
        input: AddCollaborator,
    ) -> Result<Campaign, CoreError> {
        let mut campaign = self.load_owned(id, actor).await?;

        if input.user_id <= 0 {
            return Err(CoreError::field("userId", "userId must be a positive id"));
        }
        if input.user_id == campaign.owner_id {
            return Err(CoreError::Conflict("The owner cannot be added as a collaborator".into()));
        }
        if campaign.collaborators.iter().any(|c| c.user_id == input.user_id) {
            return Err(CoreError::Conflict(format!(
                "User {} is already a collaborator",
                input.user_id
            )));
        }

        let now = Utc::now();
        campaign.collaborators.push(Collaborator {
            user_id: input.user_id,
            role: input.role,
            added_at: now,
        });
        campaign.updated_at = now;
        let saved = self.campaigns.save_campaign(&campaign).await?;

        tracing::info!(
            campaign_id = id,
            user_id = actor,
            collaborator_id = input.user_id,
            role = %input.role,
            "Collaborator added"
        );
        Ok(saved)
    }

    pub async fn remove_collaborator(
        &self,
        id: DbId,
        actor: DbId,
        collaborator_id: DbId,
    ) -> Result<Campaign, CoreError> {
        let mut campaign = self.load_owned(id, actor).await?;

        let before = campaign.collaborators.len();
        campaign.collaborators.retain(|c| c.user_id != collaborator_id);
        if campaign.collaborators.len() == before {
            return Err(CoreError::NotFound {
                entity: "Collaborator",
                id: collaborator_id,
            });
        }
        campaign.updated_at = Utc::now();
        let saved = self.campaigns.save_campaign(&campaign).await?;

        tracing::info!(campaign_id = id, user_id = actor, collaborator_id, "Collaborator removed");
        Ok(saved)
    }

    // ---- private helpers ----

    async fn load_editable(&self, id: DbId, actor: DbId) -> Result<Campaign, CoreError> {
        let campaign = require_campaign(self.campaigns.as_ref(), id).await?;
        if !campaign_editable(&campaign, actor) {
            return Err(forbidden("You do not have permission to modify this campaign"));
        }
        Ok(campaign)
    }

    async fn load_owned(&self, id: DbId, actor: DbId) -> Result<Campaign, CoreError> {
        let campaign = require_campaign(self.campaigns.as_ref(), id).await?;
        if !is_owner(&campaign, actor) {
            return Err(forbidden("Only the campaign owner can manage collaborators"));
        }
        Ok(campaign)
    }

    fn publish(&self, campaign: &Campaign, actor: DbId, event: &str, payload: serde_json::Value) {
        self.notifier.notify(
            Notification::new(event, campaign.id, actor)
                .to(campaign.member_ids())
                .with_payload(payload),
        );
    }
}
