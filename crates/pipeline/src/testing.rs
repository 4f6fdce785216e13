//! In-memory doubles for the store, capability and notifier traits.
//!
//! Available under `cfg(test)` and the `testing` feature. The store keeps
//! lookup counters so tests can assert that no lookup happened.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use adpilot_core::ab_test::AbTest;
use adpilot_core::campaign::{Campaign, NewCampaign};
use adpilot_core::content::Content;
use adpilot_core::error::CoreError;
use adpilot_core::generation::{GenerationCapability, GenerationError, GenerationTask, PromptContext};
use adpilot_core::notify::{Notification, Notifier};
use adpilot_core::persona::{NewPersona, Persona};
use adpilot_core::query::{CampaignQuery, Page};
use adpilot_core::store::{CampaignStore, PersonaStore};
use adpilot_core::types::DbId;
use async_trait::async_trait;
use chrono::Utc;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    campaigns: BTreeMap<DbId, Campaign>,
    personas: BTreeMap<DbId, Persona>,
    next_campaign_id: DbId,
    next_persona_id: DbId,
}

/// Campaign and persona store backed by two maps behind one mutex.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    campaign_lookups: AtomicUsize,
    persona_lookups: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of `find_campaign` calls so far.
    pub fn campaign_lookups(&self) -> usize {
        self.campaign_lookups.load(Ordering::SeqCst)
    }

    /// Number of `find_persona` calls so far.
    pub fn persona_lookups(&self) -> usize {
        self.persona_lookups.load(Ordering::SeqCst)
    }

    /// Direct read bypassing the lookup counters.
    pub fn campaign(&self, id: DbId) -> Option<Campaign> {
        self.tables().campaigns.get(&id).cloned()
    }

    /// Overwrite a stored campaign wholesale, content included.
    pub fn put_campaign(&self, campaign: Campaign) {
        self.tables().campaigns.insert(campaign.id, campaign);
    }
}

#[async_trait]
impl PersonaStore for InMemoryStore {
    async fn find_persona(&self, id: DbId) -> Result<Option<Persona>, CoreError> {
        self.persona_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().personas.get(&id).cloned())
    }

    async fn list_visible_personas(
        &self,
        user_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<Persona>, CoreError> {
        let needle = search.map(str::to_lowercase);
        let tables = self.tables();
        let mut visible: Vec<Persona> = tables
            .personas
            .values()
            .filter(|p| p.is_predefined || p.owner_id == Some(user_id))
            .filter(|p| match &needle {
                Some(n) => {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.is_predefined.cmp(&a.is_predefined).then(a.name.cmp(&b.name)));
        Ok(visible)
    }

    async fn insert_persona(&self, persona: NewPersona) -> Result<Persona, CoreError> {
        let mut tables = self.tables();
        tables.next_persona_id += 1;
        let stored = persona.into_persona(tables.next_persona_id, Utc::now());
        tables.personas.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn save_persona(&self, persona: &Persona) -> Result<Persona, CoreError> {
        let mut tables = self.tables();
        let slot = tables.personas.get_mut(&persona.id).ok_or(CoreError::NotFound {
            entity: "Persona",
            id: persona.id,
        })?;
        *slot = persona.clone();
        Ok(slot.clone())
    }

    async fn delete_persona(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.tables().personas.remove(&id).is_some())
    }

    async fn count_campaigns_using_persona(&self, persona_id: DbId) -> Result<i64, CoreError> {
        Ok(self
            .tables()
            .campaigns
            .values()
            .filter(|c| c.persona_id == persona_id)
            .count() as i64)
    }

    async fn predefined_persona_exists(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self
            .tables()
            .personas
            .values()
            .any(|p| p.is_predefined && p.name == name))
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn find_campaign(&self, id: DbId) -> Result<Option<Campaign>, CoreError> {
        self.campaign_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables().campaigns.get(&id).cloned())
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, CoreError> {
        let mut tables = self.tables();
        tables.next_campaign_id += 1;
        let stored = campaign.into_campaign(tables.next_campaign_id, Utc::now());
        tables.campaigns.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn save_campaign(&self, campaign: &Campaign) -> Result<Campaign, CoreError> {
        let mut tables = self.tables();
        let slot = tables.campaigns.get_mut(&campaign.id).ok_or(CoreError::NotFound {
            entity: "Campaign",
            id: campaign.id,
        })?;
        let content = std::mem::take(&mut slot.content);
        let ab_tests = std::mem::take(&mut slot.ab_tests);
        let mut next = campaign.clone();
        next.content = content;
        next.ab_tests = ab_tests;
        next.recompute_metrics();
        *slot = next;
        Ok(slot.clone())
    }

    async fn delete_campaign(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.tables().campaigns.remove(&id).is_some())
    }

    async fn append_content(&self, campaign_id: DbId, items: &[Content]) -> Result<(), CoreError> {
        let mut tables = self.tables();
        let campaign = tables.campaigns.get_mut(&campaign_id).ok_or(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        })?;
        campaign.content.extend_from_slice(items);
        campaign.updated_at = Utc::now();
        Ok(())
    }

    async fn append_ab_test(&self, campaign_id: DbId, test: &AbTest) -> Result<(), CoreError> {
        let mut tables = self.tables();
        let campaign = tables.campaigns.get_mut(&campaign_id).ok_or(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        })?;
        campaign.ab_tests.push(test.clone());
        campaign.updated_at = Utc::now();
        Ok(())
    }

    async fn list_campaigns(
        &self,
        owner_id: DbId,
        query: &CampaignQuery,
    ) -> Result<Page<Campaign>, CoreError> {
        let mut matching: Vec<Campaign> = self
            .tables()
            .campaigns
            .values()
            .filter(|c| c.owner_id == owner_id && !c.is_archived && query.matches(c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(Page::from_sorted(matching, query))
    }

    async fn list_all_for_owner(&self, owner_id: DbId) -> Result<Vec<Campaign>, CoreError> {
        Ok(self
            .tables()
            .campaigns
            .values()
            .filter(|c| c.owner_id == owner_id && !c.is_archived)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

type FailWhen = Box<dyn Fn(&PromptContext) -> bool + Send + Sync>;

/// Deterministic generation capability.
///
/// Produces canned text per task. Generation fails for contexts matched by
/// [`FakeCapability::failing_when`]; scoring returns the configured score or
/// fails when none is set.
pub struct FakeCapability {
    available: bool,
    fail_when: Option<FailWhen>,
    reply: Option<String>,
    score: Option<u8>,
    generate_calls: AtomicUsize,
    score_calls: AtomicUsize,
}

impl FakeCapability {
    /// Available, scoring every item 88.
    pub fn available() -> Self {
        Self {
            available: true,
            fail_when: None,
            reply: None,
            score: Some(88),
            generate_calls: AtomicUsize::new(0),
            score_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn failing_when(
        mut self,
        predicate: impl Fn(&PromptContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// Answer every generation call with `text` instead of the canned copy.
    pub fn replying(mut self, text: impl Into<String>) -> Self {
        self.reply = Some(text.into());
        self
    }

    /// `None` makes every scoring call fail.
    pub fn with_score(mut self, score: Option<u8>) -> Self {
        self.score = score;
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationCapability for FakeCapability {
    fn is_available(&self) -> bool {
        self.available
    }

    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> Option<&str> {
        self.available.then_some("fake-model")
    }

    async fn generate(&self, ctx: &PromptContext) -> Result<String, GenerationError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(GenerationError::Unavailable);
        }
        if self.fail_when.as_ref().is_some_and(|f| f(ctx)) {
            return Err(GenerationError::Request("scripted failure".into()));
        }
        if let Some(reply) = &self.reply {
            return Ok(reply.clone());
        }
        let suffix = ctx
            .variation
            .map(|i| format!(" (v{i})"))
            .unwrap_or_default();
        Ok(match &ctx.task {
            GenerationTask::Email => format!(
                "Hi {}, {} is here to help with {}.{suffix}",
                ctx.persona_name,
                ctx.campaign_name,
                ctx.pain_points.first().map(String::as_str).unwrap_or("your goals"),
            ),
            GenerationTask::SubjectLine { .. } => format!("\"{} for you\"", ctx.campaign_name),
            GenerationTask::SocialPost { platform } => {
                format!("Big news on {platform} from {}!{suffix}\n\n#launch #growth", ctx.campaign_name)
            }
            GenerationTask::AdCopy { platform } => {
                format!("{}: try it today on {platform}.{suffix}", ctx.campaign_name)
            }
            GenerationTask::BlogPost { platform } => {
                format!("Why {} matters ({platform}).{suffix}", ctx.campaign_name)
            }
        })
    }

    async fn score(&self, _content: &str, _persona_summary: &str) -> Result<u8, GenerationError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.score
            .ok_or_else(|| GenerationError::Malformed("scripted scoring failure".into()))
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Notifier that records everything it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}
