//! [`PgStore`]: the PostgreSQL implementation of the core store traits.

use adpilot_core::ab_test::AbTest;
use adpilot_core::campaign::{Campaign, NewCampaign};
use adpilot_core::content::Content;
use adpilot_core::error::CoreError;
use adpilot_core::persona::{NewPersona, Persona};
use adpilot_core::query::{CampaignQuery, Page, Pagination};
use adpilot_core::store::{CampaignStore, PersonaStore};
use adpilot_core::types::DbId;
use async_trait::async_trait;

use crate::repositories::{CampaignRepo, PersonaRepo};
use crate::DbPool;

/// Store backed by a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Translate a sqlx error into a domain error.
///
/// Unique (`uq_*`) and foreign-key violations become conflicts; everything
/// else is logged and reported as an internal error.
fn db_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> CoreError {
    move |err| {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.code().as_deref() {
                Some("23505") if db_err.constraint().is_some_and(|c| c.starts_with("uq_")) => {
                    return CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {}",
                        db_err.constraint().unwrap_or("unknown")
                    ));
                }
                Some("23503") => {
                    return CoreError::Conflict(
                        "Operation conflicts with a referenced resource".to_string(),
                    );
                }
                _ => {}
            }
        }
        tracing::error!(error = %err, operation, "Database error");
        CoreError::Internal(format!("{operation} failed: {err}"))
    }
}

fn campaign_gone(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Campaign",
        id,
    }
}

#[async_trait]
impl PersonaStore for PgStore {
    async fn find_persona(&self, id: DbId) -> Result<Option<Persona>, CoreError> {
        PersonaRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error("find_persona"))?
            .map(Persona::try_from)
            .transpose()
    }

    async fn list_visible_personas(
        &self,
        user_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<Persona>, CoreError> {
        let needle = search.map(str::to_lowercase);
        PersonaRepo::list_visible(&self.pool, user_id, needle.as_deref())
            .await
            .map_err(db_error("list_visible_personas"))?
            .into_iter()
            .map(Persona::try_from)
            .collect()
    }

    async fn insert_persona(&self, persona: NewPersona) -> Result<Persona, CoreError> {
        PersonaRepo::create(&self.pool, &persona)
            .await
            .map_err(db_error("insert_persona"))?
            .try_into()
    }

    async fn save_persona(&self, persona: &Persona) -> Result<Persona, CoreError> {
        PersonaRepo::update(&self.pool, persona)
            .await
            .map_err(db_error("save_persona"))?
            .ok_or(CoreError::NotFound {
                entity: "Persona",
                id: persona.id,
            })?
            .try_into()
    }

    async fn delete_persona(&self, id: DbId) -> Result<bool, CoreError> {
        PersonaRepo::delete(&self.pool, id)
            .await
            .map_err(db_error("delete_persona"))
    }

    async fn count_campaigns_using_persona(&self, persona_id: DbId) -> Result<i64, CoreError> {
        PersonaRepo::count_campaigns(&self.pool, persona_id)
            .await
            .map_err(db_error("count_campaigns_using_persona"))
    }

    async fn predefined_persona_exists(&self, name: &str) -> Result<bool, CoreError> {
        PersonaRepo::predefined_exists(&self.pool, name)
            .await
            .map_err(db_error("predefined_persona_exists"))
    }
}

#[async_trait]
impl CampaignStore for PgStore {
    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(db_error("ping"))
    }

    async fn find_campaign(&self, id: DbId) -> Result<Option<Campaign>, CoreError> {
        CampaignRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_error("find_campaign"))?
            .map(Campaign::try_from)
            .transpose()
    }

    async fn insert_campaign(&self, campaign: NewCampaign) -> Result<Campaign, CoreError> {
        CampaignRepo::create(&self.pool, &campaign)
            .await
            .map_err(db_error("insert_campaign"))?
            .try_into()
    }

    async fn save_campaign(&self, campaign: &Campaign) -> Result<Campaign, CoreError> {
        CampaignRepo::update(&self.pool, campaign)
            .await
            .map_err(db_error("save_campaign"))?
            .ok_or_else(|| campaign_gone(campaign.id))?
            .try_into()
    }

    async fn delete_campaign(&self, id: DbId) -> Result<bool, CoreError> {
        CampaignRepo::delete(&self.pool, id)
            .await
            .map_err(db_error("delete_campaign"))
    }

    async fn append_content(&self, campaign_id: DbId, items: &[Content]) -> Result<(), CoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let found = CampaignRepo::append_content(&self.pool, campaign_id, items)
            .await
            .map_err(db_error("append_content"))?;
        if !found {
            return Err(campaign_gone(campaign_id));
        }
        tracing::debug!(campaign_id, count = items.len(), "Appended content");
        Ok(())
    }

    async fn append_ab_test(&self, campaign_id: DbId, test: &AbTest) -> Result<(), CoreError> {
        let found = CampaignRepo::append_ab_test(&self.pool, campaign_id, test)
            .await
            .map_err(db_error("append_ab_test"))?;
        if found {
            Ok(())
        } else {
            Err(campaign_gone(campaign_id))
        }
    }

    async fn list_campaigns(
        &self,
        owner_id: DbId,
        query: &CampaignQuery,
    ) -> Result<Page<Campaign>, CoreError> {
        let rows = CampaignRepo::list(&self.pool, owner_id, query)
            .await
            .map_err(db_error("list_campaigns"))?;
        let total = CampaignRepo::count(&self.pool, owner_id, query)
            .await
            .map_err(db_error("count_campaigns"))?;

        let items = rows
            .into_iter()
            .map(Campaign::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    async fn list_all_for_owner(&self, owner_id: DbId) -> Result<Vec<Campaign>, CoreError> {
        CampaignRepo::list_all_for_owner(&self.pool, owner_id)
            .await
            .map_err(db_error("list_all_for_owner"))?
            .into_iter()
            .map(Campaign::try_from)
            .collect()
    }
}
