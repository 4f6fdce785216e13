//! AI-assisted content generation.
//!
//! Every operation follows the same contract:
//!
//! 1. fail fast with `ServiceUnavailable` when the capability is not
//!    configured, before any lookup;
//! 2. validate the request;
//! 3. resolve campaign and persona concurrently;
//! 4. authorize against each resource separately;
//! 5. generate, post-process and score;
//! 6. append through the store's atomic append and notify best-effort.
//!
//! Variations are all-or-nothing: drafts run concurrently and nothing is
//! appended unless all of them succeed. Batch runs sequentially and keeps
//! going past individual failures.

use std::sync::Arc;

use adpilot_core::access::{campaign_editable, persona_readable};
use adpilot_core::campaign::Campaign;
use adpilot_core::content::{
    extract_hashtags, Content, ContentType, NewContent, Platform, MAX_CONTENT_BODY_LEN,
    MAX_SUBJECT_LINE_LEN,
};
use adpilot_core::error::CoreError;
use adpilot_core::generation::{
    check_platform, plan_batch, variation_target, BatchGenerateRequest, BatchItemError,
    GenerateAdCopyRequest, GenerateEmailRequest, GenerateSocialRequest,
    GenerateVariationsRequest, GenerationCapability, GenerationError, GenerationTask,
    PromptContext, DEFAULT_QUALITY_SCORE, DEFAULT_VARIATIONS,
};
use adpilot_core::notify::{events, Notification, Notifier};
use adpilot_core::persona::Persona;
use adpilot_core::store::{CampaignStore, PersonaStore};
use adpilot_core::types::DbId;
use chrono::Utc;
use futures::future::try_join_all;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::forbidden;

/// Capability status reported by `GET /content/ai-status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatus {
    pub available: bool,
    pub provider: String,
    pub model: Option<String>,
}

/// Result of a batch run: everything that succeeded plus one entry per
/// failed (type, platform) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub content: Vec<Content>,
    pub errors: Vec<BatchItemError>,
    pub requested: usize,
}

pub struct GenerationOrchestrator {
    campaigns: Arc<dyn CampaignStore>,
    personas: Arc<dyn PersonaStore>,
    capability: Arc<dyn GenerationCapability>,
    notifier: Arc<dyn Notifier>,
}

impl GenerationOrchestrator {
    pub fn new(
        campaigns: Arc<dyn CampaignStore>,
        personas: Arc<dyn PersonaStore>,
        capability: Arc<dyn GenerationCapability>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            campaigns,
            personas,
            capability,
            notifier,
        }
    }

    pub fn status(&self) -> AiStatus {
        AiStatus {
            available: self.capability.is_available(),
            provider: self.capability.provider_name().to_string(),
            model: self.capability.model().map(str::to_string),
        }
    }

    pub async fn generate_email(
        &self,
        actor: DbId,
        req: GenerateEmailRequest,
    ) -> Result<Content, CoreError> {
        self.ensure_available()?;
        req.validate()?;
        self.generate_single(
            actor,
            req.campaign_id,
            req.persona_id,
            ContentType::Email,
            Platform::Email,
            req.custom_instructions.as_deref(),
        )
        .await
    }

    pub async fn generate_social(
        &self,
        actor: DbId,
        req: GenerateSocialRequest,
    ) -> Result<Content, CoreError> {
        self.ensure_available()?;
        req.validate()?;
        check_platform(ContentType::SocialPost, req.platform)?;
        self.generate_single(
            actor,
            req.campaign_id,
            req.persona_id,
            ContentType::SocialPost,
            req.platform,
            req.custom_instructions.as_deref(),
        )
        .await
    }

    pub async fn generate_ad_copy(
        &self,
        actor: DbId,
        req: GenerateAdCopyRequest,
    ) -> Result<Content, CoreError> {
        self.ensure_available()?;
        req.validate()?;
        let platform = req
            .platform
            .unwrap_or_else(|| ContentType::AdCopy.default_platform());
        check_platform(ContentType::AdCopy, platform)?;
        self.generate_single(
            actor,
            req.campaign_id,
            req.persona_id,
            ContentType::AdCopy,
            platform,
            req.custom_instructions.as_deref(),
        )
        .await
    }

    /// Generate 2-5 drafts of one shape. Appends all of them or none.
    pub async fn generate_variations(
        &self,
        actor: DbId,
        req: GenerateVariationsRequest,
    ) -> Result<Vec<Content>, CoreError> {
        self.ensure_available()?;
        req.validate()?;
        let (content_type, platform) = variation_target(&req)?;
        let count = req.variations.unwrap_or(DEFAULT_VARIATIONS);

        let (campaign, persona) = self.resolve(actor, req.campaign_id, req.persona_id).await?;
        let base = self.context(
            GenerationTask::for_content(content_type, platform),
            &campaign,
            &persona,
            req.custom_instructions.as_deref(),
        );
        let summary = persona.summary();

        let contexts: Vec<PromptContext> = (1..=count)
            .map(|index| base.clone().with_variation(index))
            .collect();
        let items = try_join_all(
            contexts
                .iter()
                .map(|ctx| self.draft(ctx, content_type, platform, &summary)),
        )
        .await
        .inspect_err(|e| {
            tracing::warn!(
                campaign_id = campaign.id,
                error = %e,
                "Variation generation failed, nothing appended"
            );
        })?;

        self.campaigns.append_content(campaign.id, &items).await?;

        tracing::info!(
            campaign_id = campaign.id,
            user_id = actor,
            count = items.len(),
            content_type = %content_type,
            "Content variations generated"
        );
        self.publish_generated(&campaign, actor, &items);
        Ok(items)
    }

    /// Generate the (type x platform) cross product one item at a time.
    pub async fn batch_generate(
        &self,
        actor: DbId,
        req: BatchGenerateRequest,
    ) -> Result<BatchOutcome, CoreError> {
        self.ensure_available()?;
        req.validate()?;
        let plan = plan_batch(&req.content_types, &req.platforms)?;

        let (campaign, persona) = self.resolve(actor, req.campaign_id, req.persona_id).await?;
        let summary = persona.summary();

        let mut content = Vec::new();
        let mut errors = Vec::new();
        for &(content_type, platform) in &plan {
            let ctx = self.context(
                GenerationTask::for_content(content_type, platform),
                &campaign,
                &persona,
                req.custom_instructions.as_deref(),
            );
            let result = match self.draft(&ctx, content_type, platform, &summary).await {
                Ok(item) => self
                    .campaigns
                    .append_content(campaign.id, std::slice::from_ref(&item))
                    .await
                    .map(|()| item),
                Err(e) => Err(e),
            };
            match result {
                Ok(item) => content.push(item),
                Err(e) => {
                    tracing::warn!(
                        campaign_id = campaign.id,
                        content_type = %content_type,
                        platform = %platform,
                        error = %e,
                        "Batch item failed"
                    );
                    errors.push(BatchItemError {
                        content_type,
                        platform,
                        error: public_message(&e),
                    });
                }
            }
        }

        tracing::info!(
            campaign_id = campaign.id,
            user_id = actor,
            generated = content.len(),
            failed = errors.len(),
            "Batch generation finished"
        );
        if !content.is_empty() {
            self.publish_generated(&campaign, actor, &content);
        }
        self.notifier.notify(
            Notification::new(events::BATCH_COMPLETED, campaign.id, actor)
                .to(campaign.member_ids())
                .with_payload(json!({ "generated": content.len(), "failed": errors.len() })),
        );

        Ok(BatchOutcome {
            content,
            errors,
            requested: plan.len(),
        })
    }

    // ---- private helpers ----

    fn ensure_available(&self) -> Result<(), CoreError> {
        if self.capability.is_available() {
            Ok(())
        } else {
            Err(CoreError::ServiceUnavailable(
                "AI content generation is not configured".into(),
            ))
        }
    }

    /// Concurrent lookups, then separate permission checks per resource.
    async fn resolve(
        &self,
        actor: DbId,
        campaign_id: DbId,
        persona_id: DbId,
    ) -> Result<(Campaign, Persona), CoreError> {
        let (campaign, persona) = tokio::try_join!(
            self.campaigns.find_campaign(campaign_id),
            self.personas.find_persona(persona_id),
        )?;
        let campaign = campaign.ok_or(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        })?;
        let persona = persona.ok_or(CoreError::NotFound {
            entity: "Persona",
            id: persona_id,
        })?;

        if !campaign_editable(&campaign, actor) {
            return Err(forbidden("You do not have permission to add content to this campaign"));
        }
        if !persona_readable(&persona, actor) {
            return Err(forbidden("You do not have access to this persona"));
        }
        campaign.ensure_accepts_content()?;
        Ok((campaign, persona))
    }

    fn context(
        &self,
        task: GenerationTask,
        campaign: &Campaign,
        persona: &Persona,
        custom_instructions: Option<&str>,
    ) -> PromptContext {
        let settings = campaign
            .generation_settings
            .with_custom_instructions(custom_instructions);
        PromptContext::new(task, campaign, persona, &settings)
    }

    async fn generate_single(
        &self,
        actor: DbId,
        campaign_id: DbId,
        persona_id: DbId,
        content_type: ContentType,
        platform: Platform,
        custom_instructions: Option<&str>,
    ) -> Result<Content, CoreError> {
        let (campaign, persona) = self.resolve(actor, campaign_id, persona_id).await?;
        let ctx = self.context(
            GenerationTask::for_content(content_type, platform),
            &campaign,
            &persona,
            custom_instructions,
        );

        let item = self
            .draft(&ctx, content_type, platform, &persona.summary())
            .await?;
        self.campaigns
            .append_content(campaign.id, std::slice::from_ref(&item))
            .await?;

        tracing::info!(
            campaign_id = campaign.id,
            user_id = actor,
            content_id = %item.id,
            content_type = %content_type,
            platform = %platform,
            quality_score = item.quality_score,
            "Content generated"
        );
        self.publish_generated(&campaign, actor, std::slice::from_ref(&item));
        Ok(item)
    }

    /// Generate, post-process and score one item. Does not persist.
    async fn draft(
        &self,
        ctx: &PromptContext,
        content_type: ContentType,
        platform: Platform,
        persona_summary: &str,
    ) -> Result<Content, CoreError> {
        let text = self.capability.generate(ctx).await?;

        let (body, subject_line, hashtags) = match content_type {
            ContentType::Email => {
                let subject = self
                    .capability
                    .generate(&ctx.with_task(GenerationTask::SubjectLine { body: text.clone() }))
                    .await?;
                (text, Some(truncate(&subject, MAX_SUBJECT_LINE_LEN as usize)), Vec::new())
            }
            ContentType::SocialPost => {
                let (body, tags) = extract_hashtags(&text);
                (body, None, tags)
            }
            ContentType::AdCopy | ContentType::BlogPost => (text, None, Vec::new()),
        };
        let body = truncate(&body, MAX_CONTENT_BODY_LEN as usize);
        if body.trim().is_empty() {
            tracing::warn!(task = %ctx.task.label(), "Generation produced a blank body");
            return Err(GenerationError::EmptyResponse.into());
        }

        let quality_score = self.score(&body, persona_summary).await;

        Content::build(
            NewContent {
                content_type,
                platform,
                subject_line,
                content_body: body,
                visual_url: None,
                hashtags,
                quality_score: Some(quality_score),
            },
            Some(&ctx.provenance()),
            Utc::now(),
        )
    }

    /// Scoring never fails the request.
    async fn score(&self, body: &str, persona_summary: &str) -> u8 {
        match self.capability.score(body, persona_summary).await {
            Ok(score) => score.min(100),
            Err(e) => {
                tracing::warn!(error = %e, fallback = DEFAULT_QUALITY_SCORE, "Quality scoring failed");
                DEFAULT_QUALITY_SCORE
            }
        }
    }

    fn publish_generated(&self, campaign: &Campaign, actor: DbId, items: &[Content]) {
        let ids: Vec<_> = items.iter().map(|c| c.id).collect();
        self.notifier.notify(
            Notification::new(events::CONTENT_GENERATED, campaign.id, actor)
                .to(campaign.member_ids())
                .with_payload(json!({ "contentIds": ids, "count": items.len() })),
        );
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Caller-facing text for a failed batch item.
fn public_message(err: &CoreError) -> String {
    match err {
        CoreError::ServiceUnavailable(_) => "Content generation failed".to_string(),
        CoreError::Internal(_) => "An internal error occurred".to_string(),
        other => other.to_string(),
    }
}
