//! Persona row model.

use adpilot_core::error::CoreError;
use adpilot_core::persona::{Demographics, Persona, Psychographics};
use adpilot_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use super::parse_column;

/// A row from the `personas` table.
#[derive(Debug, Clone, FromRow)]
pub struct PersonaRow {
    pub id: DbId,
    pub owner_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub demographics: Json<Demographics>,
    pub psychographics: Json<Psychographics>,
    pub pain_points: Vec<String>,
    pub goals: Vec<String>,
    /// Channel wire strings.
    pub preferred_channels: Vec<String>,
    pub is_predefined: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PersonaRow> for Persona {
    type Error = CoreError;

    fn try_from(row: PersonaRow) -> Result<Self, Self::Error> {
        let preferred_channels = row
            .preferred_channels
            .iter()
            .map(|c| parse_column("personas.preferred_channels", c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Persona {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            demographics: row.demographics.0,
            psychographics: row.psychographics.0,
            pain_points: row.pain_points,
            goals: row.goals,
            preferred_channels,
            is_predefined: row.is_predefined,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
