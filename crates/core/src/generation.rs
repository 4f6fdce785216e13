//! Generation capability contract, prompt context assembly and the request
//! shapes accepted by the generation orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::campaign::{Campaign, GenerationSettings, Objective, Tone};
use crate::content::{ContentType, Platform};
use crate::error::{CoreError, FieldError};
use crate::persona::Persona;
use crate::types::DbId;

/// Substituted when the scoring call fails or returns garbage.
pub const DEFAULT_QUALITY_SCORE: u8 = 75;
pub const MIN_VARIATIONS: u8 = 2;
pub const MAX_VARIATIONS: u8 = 5;
pub const DEFAULT_VARIATIONS: u8 = 3;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Failure of a single generation or scoring call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation capability is not configured")]
    Unavailable,

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation request timed out")]
    Timeout,

    #[error("Generation returned an empty response")]
    EmptyResponse,

    #[error("Generation returned a malformed response: {0}")]
    Malformed(String),
}

impl From<GenerationError> for CoreError {
    fn from(err: GenerationError) -> Self {
        CoreError::ServiceUnavailable(err.to_string())
    }
}

/// External text-generation service.
///
/// Constructed once at startup and injected into the orchestrator.
/// `is_available` must be checked before any other call.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    fn is_available(&self) -> bool;

    /// Short provider label for status reporting (`openai`, `fake`).
    fn provider_name(&self) -> &str;

    fn model(&self) -> Option<&str>;

    /// Draft raw text for the given context.
    async fn generate(&self, ctx: &PromptContext) -> Result<String, GenerationError>;

    /// Rate `content` for the audience described by `persona_summary`, 0-100.
    async fn score(&self, content: &str, persona_summary: &str) -> Result<u8, GenerationError>;
}

// ---------------------------------------------------------------------------
// Prompt context
// ---------------------------------------------------------------------------

/// What a single `generate` call should produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationTask {
    Email,
    /// Subject line for an already drafted email body.
    SubjectLine { body: String },
    SocialPost { platform: Platform },
    AdCopy { platform: Platform },
    BlogPost { platform: Platform },
}

impl GenerationTask {
    /// Main task for a content type on a platform.
    pub fn for_content(content_type: ContentType, platform: Platform) -> Self {
        match content_type {
            ContentType::Email => GenerationTask::Email,
            ContentType::SocialPost => GenerationTask::SocialPost { platform },
            ContentType::AdCopy => GenerationTask::AdCopy { platform },
            ContentType::BlogPost => GenerationTask::BlogPost { platform },
        }
    }

    pub fn label(&self) -> String {
        match self {
            GenerationTask::Email => "email".into(),
            GenerationTask::SubjectLine { .. } => "email subject line".into(),
            GenerationTask::SocialPost { platform } => format!("{platform} social post"),
            GenerationTask::AdCopy { platform } => format!("{platform} ad copy"),
            GenerationTask::BlogPost { platform } => format!("{platform} blog post"),
        }
    }
}

/// Everything the capability needs, assembled from campaign, persona and
/// the effective generation settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    pub task: GenerationTask,
    pub campaign_name: String,
    pub campaign_description: Option<String>,
    pub objective: Objective,
    pub tone: Tone,
    pub keywords: Option<String>,
    pub persona_name: String,
    pub persona_description: String,
    pub age: String,
    pub income: String,
    pub location: String,
    pub values: Vec<String>,
    pub interests: Vec<String>,
    pub pain_points: Vec<String>,
    pub goals: Vec<String>,
    pub creativity_level: u8,
    pub include_visuals: bool,
    pub custom_instructions: Option<String>,
    /// 1-based index when several drafts are requested at once.
    pub variation: Option<u8>,
}

impl PromptContext {
    pub fn new(
        task: GenerationTask,
        campaign: &Campaign,
        persona: &Persona,
        settings: &GenerationSettings,
    ) -> Self {
        Self {
            task,
            campaign_name: campaign.name.clone(),
            campaign_description: campaign.description.clone(),
            objective: campaign.objective,
            tone: campaign.tone,
            keywords: campaign.keywords.clone(),
            persona_name: persona.name.clone(),
            persona_description: persona.description.clone(),
            age: persona.demographics.age.clone(),
            income: persona.demographics.income.clone(),
            location: persona.demographics.location.clone(),
            values: persona.psychographics.values.clone(),
            interests: persona.psychographics.interests.clone(),
            pain_points: persona.pain_points.clone(),
            goals: persona.goals.clone(),
            creativity_level: settings.creativity_level,
            include_visuals: settings.include_visuals,
            custom_instructions: settings.custom_instructions.clone(),
            variation: None,
        }
    }

    /// Same context for a different task.
    pub fn with_task(&self, task: GenerationTask) -> Self {
        Self {
            task,
            ..self.clone()
        }
    }

    pub fn with_variation(mut self, index: u8) -> Self {
        self.variation = Some(index);
        self
    }

    /// One-line provenance recorded on the generated content item.
    pub fn provenance(&self) -> String {
        let mut line = format!(
            "{} for campaign '{}' targeting '{}' (objective {}, tone {}, creativity {})",
            self.task.label(),
            self.campaign_name,
            self.persona_name,
            self.objective,
            self.tone,
            self.creativity_level,
        );
        if let Some(index) = self.variation {
            line.push_str(&format!(", variation {index}"));
        }
        if let Some(extra) = &self.custom_instructions {
            line.push_str(&format!(". Instructions: {extra}"));
        }
        line
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEmailRequest {
    pub campaign_id: DbId,
    pub persona_id: DbId,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSocialRequest {
    pub campaign_id: DbId,
    pub persona_id: DbId,
    pub platform: Platform,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateAdCopyRequest {
    pub campaign_id: DbId,
    pub persona_id: DbId,
    pub platform: Option<Platform>,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVariationsRequest {
    pub campaign_id: DbId,
    pub persona_id: DbId,
    pub content_type: ContentType,
    #[validate(range(min = 2, max = 5, message = "variations must be between 2 and 5"))]
    pub variations: Option<u8>,
    pub platform: Option<Platform>,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchGenerateRequest {
    pub campaign_id: DbId,
    pub persona_id: DbId,
    #[validate(length(min = 1, message = "at least one content type is required"))]
    pub content_types: Vec<ContentType>,
    #[validate(length(min = 1, message = "at least one platform is required"))]
    pub platforms: Vec<Platform>,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

/// Reject a platform that cannot carry `content_type`.
pub fn check_platform(content_type: ContentType, platform: Platform) -> Result<(), CoreError> {
    if content_type.supports(platform) {
        Ok(())
    } else {
        Err(CoreError::field(
            "platform",
            format!("platform {platform} is not valid for content type {content_type}"),
        ))
    }
}

/// Resolve the effective (type, platform) for a variations request.
pub fn variation_target(req: &GenerateVariationsRequest) -> Result<(ContentType, Platform), CoreError> {
    let platform = req
        .platform
        .unwrap_or_else(|| req.content_type.default_platform());
    check_platform(req.content_type, platform)?;
    Ok((req.content_type, platform))
}

/// Expand a batch request into the ordered (type, platform) work list.
///
/// Email yields a single item on the email platform; every other type is
/// paired with each requested non-email platform. Duplicates collapse.
pub fn plan_batch(
    content_types: &[ContentType],
    platforms: &[Platform],
) -> Result<Vec<(ContentType, Platform)>, CoreError> {
    let mut plan = Vec::new();
    for &content_type in content_types {
        let targets: Vec<Platform> = if content_type == ContentType::Email {
            vec![Platform::Email]
        } else {
            platforms
                .iter()
                .copied()
                .filter(|p| content_type.supports(*p))
                .collect()
        };
        for platform in targets {
            if !plan.contains(&(content_type, platform)) {
                plan.push((content_type, platform));
            }
        }
    }
    if plan.is_empty() {
        return Err(CoreError::InvalidFields(vec![FieldError::new(
            "platforms",
            "no platform matches the requested content types",
        )]));
    }
    Ok(plan)
}

/// One failed item of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemError {
    pub content_type: ContentType,
    pub platform: Platform,
    pub error: String,
}
