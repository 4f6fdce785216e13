//! Repository for the `campaigns` table.
//!
//! `content` and `ab_tests` are only ever extended in place with
//! `jsonb || jsonb` so concurrent appends never overwrite each other; the
//! general update path leaves both columns alone.

use adpilot_core::ab_test::AbTest;
use adpilot_core::campaign::{Campaign, NewCampaign};
use adpilot_core::content::Content;
use adpilot_core::query::{CampaignQuery, SortField};
use adpilot_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::campaign::CampaignRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, persona_id, name, description, objective, status, budget, \
     currency, start_date, end_date, tone, keywords, target_audience, content, ab_tests, \
     metrics, generation_settings, generation_job, collaborators, is_archived, tags, \
     created_at, updated_at";

/// Byte-wise name ordering, matching in-process string comparison.
fn order_expr(field: SortField) -> String {
    match field {
        SortField::Name => "name COLLATE \"C\"".to_string(),
        other => other.column().to_string(),
    }
}

/// WHERE clause for an owner-scoped, non-archived listing. `$1` is the
/// owner; optional filters follow in status, objective, search order.
/// Returns the clause and the next free bind index.
fn filter_clause(query: &CampaignQuery) -> (String, u32) {
    let mut conditions = vec!["owner_id = $1".to_string(), "is_archived = FALSE".to_string()];
    let mut bind_idx = 2u32;

    if query.status.is_some() {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
    }
    if query.objective.is_some() {
        conditions.push(format!("objective = ${bind_idx}"));
        bind_idx += 1;
    }
    if query.search.is_some() {
        conditions.push(format!(
            "(POSITION(${bind_idx} IN LOWER(name)) > 0 \
              OR POSITION(${bind_idx} IN LOWER(COALESCE(description, ''))) > 0 \
              OR POSITION(${bind_idx} IN LOWER(COALESCE(keywords, ''))) > 0)"
        ));
        bind_idx += 1;
    }

    (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
}

/// Provides persistence for the campaign aggregate.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewCampaign) -> Result<CampaignRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns
                (owner_id, persona_id, name, description, objective, status, budget, currency,
                 start_date, end_date, tone, keywords, target_audience, metrics,
                 generation_settings, generation_job, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignRow>(&query)
            .bind(input.owner_id)
            .bind(input.persona_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.objective.as_str())
            .bind(input.status.as_str())
            .bind(input.budget)
            .bind(input.currency.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.tone.as_str())
            .bind(&input.keywords)
            .bind(Json(&input.target_audience))
            .bind(Json(&input.metrics))
            .bind(Json(&input.generation_settings))
            .bind(Json(&input.generation_job))
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CampaignRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, CampaignRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every column except `owner_id`, `content` and `ab_tests`.
    ///
    /// Returns `None` if no row with the campaign's id exists.
    pub async fn update(pool: &PgPool, campaign: &Campaign) -> Result<Option<CampaignRow>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                persona_id = $2,
                name = $3,
                description = $4,
                objective = $5,
                status = $6,
                budget = $7,
                currency = $8,
                start_date = $9,
                end_date = $10,
                tone = $11,
                keywords = $12,
                target_audience = $13,
                metrics = $14,
                generation_settings = $15,
                generation_job = $16,
                collaborators = $17,
                is_archived = $18,
                tags = $19,
                updated_at = $20
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignRow>(&query)
            .bind(campaign.id)
            .bind(campaign.persona_id)
            .bind(&campaign.name)
            .bind(&campaign.description)
            .bind(campaign.objective.as_str())
            .bind(campaign.status.as_str())
            .bind(campaign.budget)
            .bind(campaign.currency.as_str())
            .bind(campaign.start_date)
            .bind(campaign.end_date)
            .bind(campaign.tone.as_str())
            .bind(&campaign.keywords)
            .bind(Json(&campaign.target_audience))
            .bind(Json(&campaign.metrics))
            .bind(Json(&campaign.generation_settings))
            .bind(Json(&campaign.generation_job))
            .bind(Json(&campaign.collaborators))
            .bind(campaign.is_archived)
            .bind(&campaign.tags)
            .bind(campaign.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a campaign with its embedded items. Returns `true`
    /// if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append content items in a single statement. Returns `false` if the
    /// campaign does not exist.
    pub async fn append_content(
        pool: &PgPool,
        campaign_id: DbId,
        items: &[Content],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET content = content || $2::jsonb, updated_at = NOW() WHERE id = $1",
        )
        .bind(campaign_id)
        .bind(Json(items))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append one A/B test. Returns `false` if the campaign does not exist.
    pub async fn append_ab_test(
        pool: &PgPool,
        campaign_id: DbId,
        test: &AbTest,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET ab_tests = ab_tests || $2::jsonb, updated_at = NOW() WHERE id = $1",
        )
        .bind(campaign_id)
        .bind(Json([test]))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of the owner's non-archived campaigns.
    pub async fn list(
        pool: &PgPool,
        owner_id: DbId,
        params: &CampaignQuery,
    ) -> Result<Vec<CampaignRow>, sqlx::Error> {
        let (where_clause, bind_idx) = filter_clause(params);
        let direction = params.sort_order.sql();
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns \
             {where_clause} \
             ORDER BY {order} {direction}, id {direction} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            order = order_expr(params.sort_by),
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, CampaignRow>(&query).bind(owner_id);
        if let Some(status) = params.status {
            q = q.bind(status.as_str());
        }
        if let Some(objective) = params.objective {
            q = q.bind(objective.as_str());
        }
        if let Some(ref search) = params.search {
            q = q.bind(search.clone());
        }

        q = q.bind(params.limit).bind(params.offset());
        q.fetch_all(pool).await
    }

    /// Number of campaigns matching the same filters as [`CampaignRepo::list`].
    pub async fn count(pool: &PgPool, owner_id: DbId, params: &CampaignQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter_clause(params);
        let query = format!("SELECT COUNT(*) FROM campaigns {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(owner_id);
        if let Some(status) = params.status {
            q = q.bind(status.as_str());
        }
        if let Some(objective) = params.objective {
            q = q.bind(objective.as_str());
        }
        if let Some(ref search) = params.search {
            q = q.bind(search.clone());
        }
        q.fetch_one(pool).await
    }

    /// Every non-archived campaign of the owner, most recently updated first.
    pub async fn list_all_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<CampaignRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns
             WHERE owner_id = $1 AND is_archived = FALSE
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, CampaignRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }
}
