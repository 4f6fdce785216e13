//! Campaign aggregate: entity shape, status lifecycle, derived metrics and
//! the validation rules for create/update.
//!
//! Content items and A/B tests are embedded in the campaign and only ever
//! appended (see [`crate::store::CampaignStore`]). Everything here is pure;
//! permission checks live in [`crate::access`].

use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ab_test::AbTest;
use crate::content::{Content, ContentType, Platform};
use crate::error::{CoreError, FieldError};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

string_enum! {
    /// What the campaign is meant to achieve.
    Objective {
        Awareness => "awareness",
        Engagement => "engagement",
        Conversion => "conversion",
        Retention => "retention",
        LeadGeneration => "lead_generation",
    }
}

string_enum! {
    /// Campaign lifecycle status. See [`CampaignStatus::can_transition_to`].
    CampaignStatus {
        Draft => "draft",
        Generating => "generating",
        Active => "active",
        Paused => "paused",
        Completed => "completed",
        Archived => "archived",
    }
}

string_enum! {
    Currency {
        Usd => "USD",
        Eur => "EUR",
        Gbp => "GBP",
        Cad => "CAD",
        Aud => "AUD",
        Jpy => "JPY",
    }
}

string_enum! {
    /// Voice used when drafting content for the campaign.
    Tone {
        Professional => "professional",
        Casual => "casual",
        Friendly => "friendly",
        Formal => "formal",
        Humorous => "humorous",
        Inspirational => "inspirational",
        Urgent => "urgent",
    }
}

string_enum! {
    CollaboratorRole {
        Viewer => "viewer",
        Editor => "editor",
        Admin => "admin",
    }
}

string_enum! {
    /// Advisory generation-job state. No scheduler drives it.
    JobStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

impl CampaignStatus {
    /// Allowed lifecycle edges for explicit status changes.
    ///
    /// Archiving from any other state goes through the dedicated archive
    /// operation, which is not bound by this table.
    pub fn can_transition_to(self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Generating)
                | (Generating, Active)
                | (Active, Paused)
                | (Paused, Active)
                | (Paused, Completed)
                | (Completed, Archived)
        )
    }

    /// Field edits are rejected once a campaign reaches these states.
    pub fn is_frozen(self) -> bool {
        matches!(self, CampaignStatus::Completed | CampaignStatus::Archived)
    }
}

impl CollaboratorRole {
    /// Viewers never gain edit rights.
    pub fn can_edit(self) -> bool {
        matches!(self, CollaboratorRole::Editor | CollaboratorRole::Admin)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

// ---------------------------------------------------------------------------
// Embedded value types
// ---------------------------------------------------------------------------

pub const MAX_CREATIVITY_LEVEL: u8 = 10;
pub const DEFAULT_CREATIVITY_LEVEL: u8 = 7;
pub const MAX_CUSTOM_INSTRUCTIONS_LEN: u64 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TargetAudience {
    #[validate(range(min = 0, message = "size must not be negative"))]
    pub size: Option<i64>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default = "default_creativity_level")]
    #[validate(range(max = 10, message = "creativityLevel must be between 0 and 10"))]
    pub creativity_level: u8,
    #[serde(default)]
    pub include_visuals: bool,
    #[validate(length(max = 1000, message = "customInstructions must be at most 1000 characters"))]
    pub custom_instructions: Option<String>,
}

fn default_creativity_level() -> u8 {
    DEFAULT_CREATIVITY_LEVEL
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            content_types: Vec::new(),
            platforms: Vec::new(),
            creativity_level: DEFAULT_CREATIVITY_LEVEL,
            include_visuals: false,
            custom_instructions: None,
        }
    }
}

impl GenerationSettings {
    /// Copy of these settings with request-level instructions applied.
    ///
    /// Non-blank request instructions replace the stored ones for the
    /// duration of a single generation call; nothing is persisted.
    pub fn with_custom_instructions(&self, instructions: Option<&str>) -> GenerationSettings {
        let mut merged = self.clone();
        if let Some(extra) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
            merged.custom_instructions = Some(extra.to_string());
        }
        merged
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub status: JobStatus,
    /// 0-100.
    pub progress: u8,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: DbId,
    pub role: CollaboratorRole,
    pub added_at: Timestamp,
}

/// Raw counters plus the three ratios derived from them.
///
/// `ctr`, `cpc` and `cpa` are outputs of [`compute_metrics`]; any value
/// supplied for them from outside is overwritten on the next persistence.
/// `roi` is a reported figure, not derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub spend: f64,
    pub roi: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
}

/// Re-derive ctr/cpc/cpa from the counters. Idempotent.
///
/// - `ctr = clicks / impressions * 100` (0 when impressions = 0)
/// - `cpc = spend / clicks` (0 when clicks = 0)
/// - `cpa = spend / conversions` (0 when conversions = 0)
pub fn compute_metrics(metrics: &CampaignMetrics) -> CampaignMetrics {
    let ratio = |num: f64, den: i64| if den > 0 { num / den as f64 } else { 0.0 };
    CampaignMetrics {
        ctr: ratio(metrics.clicks as f64, metrics.impressions) * 100.0,
        cpc: ratio(metrics.spend, metrics.clicks),
        cpa: ratio(metrics.spend, metrics.conversions),
        ..metrics.clone()
    }
}

/// Counter updates accepted through the campaign update operation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricsPatch {
    #[validate(range(min = 0, message = "impressions must not be negative"))]
    pub impressions: Option<i64>,
    #[validate(range(min = 0, message = "clicks must not be negative"))]
    pub clicks: Option<i64>,
    #[validate(range(min = 0, message = "conversions must not be negative"))]
    pub conversions: Option<i64>,
    #[validate(range(min = 0.0, message = "spend must not be negative"))]
    pub spend: Option<f64>,
    pub roi: Option<f64>,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: DbId,
    pub owner_id: DbId,
    pub persona_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub objective: Objective,
    pub status: CampaignStatus,
    pub budget: f64,
    pub currency: Currency,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub tone: Tone,
    pub keywords: Option<String>,
    pub target_audience: TargetAudience,
    pub content: Vec<Content>,
    pub ab_tests: Vec<AbTest>,
    pub metrics: CampaignMetrics,
    pub generation_settings: GenerationSettings,
    pub generation_job: GenerationJob,
    pub collaborators: Vec<Collaborator>,
    pub is_archived: bool,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Campaign {
    /// Recompute the derived metric ratios in place.
    pub fn recompute_metrics(&mut self) {
        self.metrics = compute_metrics(&self.metrics);
    }

    /// Owner plus every collaborator, used as notification recipients.
    pub fn member_ids(&self) -> Vec<DbId> {
        let mut ids = vec![self.owner_id];
        for collaborator in &self.collaborators {
            if !ids.contains(&collaborator.user_id) {
                ids.push(collaborator.user_id);
            }
        }
        ids
    }

    /// True when `now` lies within `[start_date, end_date]`.
    pub fn is_running_at(&self, now: Timestamp) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// Apply a field patch, enforcing the lifecycle and date invariants.
    ///
    /// On error the campaign is left untouched. Persona re-authorization is
    /// the caller's job; this only records the new reference.
    pub fn apply_update(&mut self, patch: UpdateCampaign, now: Timestamp) -> Result<(), CoreError> {
        patch.validate()?;

        if self.status.is_frozen() {
            return Err(CoreError::Conflict(format!(
                "Campaign is {} and can no longer be edited",
                self.status
            )));
        }

        if let Some(next) = patch.status {
            if next == CampaignStatus::Archived {
                return Err(CoreError::Conflict(
                    "Use the archive operation to archive a campaign".into(),
                ));
            }
            if next != self.status && !self.status.can_transition_to(next) {
                return Err(CoreError::Conflict(format!(
                    "Invalid status transition from {} to {next}",
                    self.status
                )));
            }
        }

        let start = patch.start_date.unwrap_or(self.start_date);
        let end = patch.end_date.unwrap_or(self.end_date);
        if end <= start {
            return Err(CoreError::field("endDate", "endDate must be after startDate"));
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(objective) = patch.objective {
            self.objective = objective;
        }
        if let Some(persona_id) = patch.persona_id {
            self.persona_id = persona_id;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(budget) = patch.budget {
            self.budget = budget;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        self.start_date = start;
        self.end_date = end;
        if let Some(tone) = patch.tone {
            self.tone = tone;
        }
        if let Some(keywords) = patch.keywords {
            self.keywords = Some(keywords);
        }
        if let Some(audience) = patch.target_audience {
            self.target_audience = audience;
        }
        if let Some(settings) = patch.generation_settings {
            self.generation_settings = settings;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(m) = patch.metrics {
            if let Some(v) = m.impressions {
                self.metrics.impressions = v;
            }
            if let Some(v) = m.clicks {
                self.metrics.clicks = v;
            }
            if let Some(v) = m.conversions {
                self.metrics.conversions = v;
            }
            if let Some(v) = m.spend {
                self.metrics.spend = v;
            }
            if let Some(v) = m.roi {
                self.metrics.roi = v;
            }
        }

        self.recompute_metrics();
        self.updated_at = now;
        Ok(())
    }

    /// One-way transition to `archived`.
    pub fn archive(&mut self, now: Timestamp) -> Result<(), CoreError> {
        if self.is_archived || self.status == CampaignStatus::Archived {
            return Err(CoreError::Conflict("Campaign is already archived".into()));
        }
        self.status = CampaignStatus::Archived;
        self.is_archived = true;
        self.updated_at = now;
        Ok(())
    }

    /// Deletion is only allowed while the campaign is still a draft.
    pub fn ensure_deletable(&self) -> Result<(), CoreError> {
        if self.status != CampaignStatus::Draft || self.is_archived {
            return Err(CoreError::Conflict(format!(
                "Only draft campaigns can be deleted (current status: {})",
                self.status
            )));
        }
        Ok(())
    }

    /// Content and A/B tests may not be added to frozen campaigns.
    pub fn ensure_accepts_content(&self) -> Result<(), CoreError> {
        if self.status.is_frozen() || self.is_archived {
            return Err(CoreError::Conflict(format!(
                "Campaign is {} and does not accept new content",
                self.status
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for creating a campaign.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaign {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub objective: Objective,
    pub persona_id: DbId,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    pub currency: Option<Currency>,
    pub tone: Option<Tone>,
    #[validate(length(max = 500, message = "keywords must be at most 500 characters"))]
    pub keywords: Option<String>,
    #[validate(nested)]
    pub target_audience: Option<TargetAudience>,
    #[validate(nested)]
    pub generation_settings: Option<GenerationSettings>,
    pub tags: Option<Vec<String>>,
}

/// Partial update. Owner, content, A/B tests, collaborators and the archive
/// flag are not patchable through this DTO.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaign {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub objective: Option<Objective>,
    pub persona_id: Option<DbId>,
    pub status: Option<CampaignStatus>,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    pub currency: Option<Currency>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub tone: Option<Tone>,
    #[validate(length(max = 500, message = "keywords must be at most 500 characters"))]
    pub keywords: Option<String>,
    #[validate(nested)]
    pub target_audience: Option<TargetAudience>,
    #[validate(nested)]
    pub generation_settings: Option<GenerationSettings>,
    #[validate(nested)]
    pub metrics: Option<MetricsPatch>,
    pub tags: Option<Vec<String>>,
}

/// Body for adding a collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCollaborator {
    pub user_id: DbId,
    pub role: CollaboratorRole,
}

/// A validated, fully-defaulted campaign ready for insertion.
///
/// Status starts at `draft`; content, A/B tests and collaborators start
/// empty and `is_archived` false. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCampaign {
    pub owner_id: DbId,
    pub persona_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub objective: Objective,
    pub status: CampaignStatus,
    pub budget: f64,
    pub currency: Currency,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub tone: Tone,
    pub keywords: Option<String>,
    pub target_audience: TargetAudience,
    pub metrics: CampaignMetrics,
    pub generation_settings: GenerationSettings,
    pub generation_job: GenerationJob,
    pub tags: Vec<String>,
}

impl NewCampaign {
    /// Validate a create request and apply defaults.
    ///
    /// `startDate` may not lie before the start of the current UTC day.
    pub fn from_input(
        owner_id: DbId,
        input: CreateCampaign,
        now: Timestamp,
    ) -> Result<Self, CoreError> {
        let mut fields = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => crate::error::flatten_validation_errors(&errors),
        };
        if input.end_date <= input.start_date {
            fields.push(FieldError::new("endDate", "endDate must be after startDate"));
        }
        if input.start_date < start_of_day(now) {
            fields.push(FieldError::new("startDate", "startDate cannot be in the past"));
        }
        if !fields.is_empty() {
            fields.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(CoreError::InvalidFields(fields));
        }

        Ok(Self {
            owner_id,
            persona_id: input.persona_id,
            name: input.name,
            description: input.description,
            objective: input.objective,
            status: CampaignStatus::Draft,
            budget: input.budget.unwrap_or(0.0),
            currency: input.currency.unwrap_or_default(),
            start_date: input.start_date,
            end_date: input.end_date,
            tone: input.tone.unwrap_or_default(),
            keywords: input.keywords,
            target_audience: input.target_audience.unwrap_or_default(),
            metrics: compute_metrics(&CampaignMetrics::default()),
            generation_settings: input.generation_settings.unwrap_or_default(),
            generation_job: GenerationJob::default(),
            tags: input.tags.unwrap_or_default(),
        })
    }

    /// Materialize into a stored campaign with the given identity.
    pub fn into_campaign(self, id: DbId, now: Timestamp) -> Campaign {
        Campaign {
            id,
            owner_id: self.owner_id,
            persona_id: self.persona_id,
            name: self.name,
            description: self.description,
            objective: self.objective,
            status: self.status,
            budget: self.budget,
            currency: self.currency,
            start_date: self.start_date,
            end_date: self.end_date,
            tone: self.tone,
            keywords: self.keywords,
            target_audience: self.target_audience,
            content: Vec::new(),
            ab_tests: Vec::new(),
            metrics: self.metrics,
            generation_settings: self.generation_settings,
            generation_job: self.generation_job,
            collaborators: Vec::new(),
            is_archived: false,
            tags: self.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

fn start_of_day(now: Timestamp) -> Timestamp {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
