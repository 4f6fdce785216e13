//! Repository for the `personas` table.

use adpilot_core::persona::{Channel, NewPersona, Persona};
use adpilot_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::persona::PersonaRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, description, demographics, psychographics, \
     pain_points, goals, preferred_channels, is_predefined, created_at, updated_at";

fn channel_strings(channels: &[Channel]) -> Vec<String> {
    channels.iter().map(|c| c.as_str().to_string()).collect()
}

/// Provides CRUD operations for personas.
pub struct PersonaRepo;

impl PersonaRepo {
    /// Insert a new persona, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewPersona) -> Result<PersonaRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO personas
                (owner_id, name, description, demographics, psychographics,
                 pain_points, goals, preferred_channels, is_predefined)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PersonaRow>(&query)
            .bind(input.owner_id)
            .bind(&input.data.name)
            .bind(&input.data.description)
            .bind(Json(&input.data.demographics))
            .bind(Json(&input.data.psychographics))
            .bind(&input.data.pain_points)
            .bind(&input.data.goals)
            .bind(channel_strings(&input.data.preferred_channels))
            .bind(input.is_predefined)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PersonaRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM personas WHERE id = $1");
        sqlx::query_as::<_, PersonaRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Predefined personas first, then the user's own, each group by name.
    ///
    /// `search` must already be lower-cased; it is matched as a substring of
    /// the lower-cased name or description.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<PersonaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM personas
             WHERE (is_predefined OR owner_id = $1)
               AND ($2::text IS NULL
                    OR POSITION($2 IN LOWER(name)) > 0
                    OR POSITION($2 IN LOWER(description)) > 0)
             ORDER BY is_predefined DESC, name ASC, id ASC"
        );
        sqlx::query_as::<_, PersonaRow>(&query)
            .bind(user_id)
            .bind(search)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the mutable fields. Ownership and the predefined flag are
    /// never touched. Returns `None` if the row is gone.
    pub async fn update(pool: &PgPool, persona: &Persona) -> Result<Option<PersonaRow>, sqlx::Error> {
        let query = format!(
            "UPDATE personas SET
                name = $2,
                description = $3,
                demographics = $4,
                psychographics = $5,
                pain_points = $6,
                goals = $7,
                preferred_channels = $8,
                updated_at = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PersonaRow>(&query)
            .bind(persona.id)
            .bind(&persona.name)
            .bind(&persona.description)
            .bind(Json(&persona.demographics))
            .bind(Json(&persona.psychographics))
            .bind(&persona.pain_points)
            .bind(&persona.goals)
            .bind(channel_strings(&persona.preferred_channels))
            .bind(persona.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a persona. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM personas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Campaigns referencing the persona, archived ones included.
    pub async fn count_campaigns(pool: &PgPool, persona_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM campaigns WHERE persona_id = $1")
            .bind(persona_id)
            .fetch_one(pool)
            .await
    }

    pub async fn predefined_exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM personas WHERE is_predefined AND name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await
    }
}
