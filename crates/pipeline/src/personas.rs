//! Persona catalog operations.

use std::sync::Arc;

use adpilot_core::access::{persona_editable, persona_readable};
use adpilot_core::error::CoreError;
use adpilot_core::persona::{predefined_personas, CreatePersona, NewPersona, Persona, UpdatePersona};
use adpilot_core::store::PersonaStore;
use adpilot_core::types::DbId;
use chrono::Utc;
use validator::Validate;

use crate::{forbidden, require_persona};

pub struct PersonaService {
    personas: Arc<dyn PersonaStore>,
}

impl PersonaService {
    pub fn new(personas: Arc<dyn PersonaStore>) -> Self {
        Self { personas }
    }

    /// Predefined personas plus the actor's own.
    pub async fn list(&self, actor: DbId, search: Option<&str>) -> Result<Vec<Persona>, CoreError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.personas.list_visible_personas(actor, search).await
    }

    pub async fn get(&self, id: DbId, actor: DbId) -> Result<Persona, CoreError> {
        let persona = require_persona(self.personas.as_ref(), id).await?;
        if !persona_readable(&persona, actor) {
            return Err(forbidden("You do not have access to this persona"));
        }
        Ok(persona)
    }

    /// Always creates a custom persona owned by `actor`.
    pub async fn create(&self, actor: DbId, input: CreatePersona) -> Result<Persona, CoreError> {
        input.validate()?;
        let persona = self
            .personas
            .insert_persona(NewPersona::custom(actor, input))
            .await?;
        tracing::info!(persona_id = persona.id, user_id = actor, "Persona created");
        Ok(persona)
    }

    pub async fn update(
        &self,
        id: DbId,
        actor: DbId,
        patch: UpdatePersona,
    ) -> Result<Persona, CoreError> {
        patch.validate()?;
        let mut persona = self.load_editable(id, actor).await?;
        persona.apply_update(patch, Utc::now());
        let saved = self.personas.save_persona(&persona).await?;
        tracing::info!(persona_id = id, user_id = actor, "Persona updated");
        Ok(saved)
    }

    /// Rejected with a conflict while any campaign still references it.
    pub async fn delete(&self, id: DbId, actor: DbId) -> Result<(), CoreError> {
        self.load_editable(id, actor).await?;

        let references = self.personas.count_campaigns_using_persona(id).await?;
        if references > 0 {
            return Err(CoreError::Conflict(format!(
                "Persona is used by {references} campaign(s) and cannot be deleted"
            )));
        }

        if !self.personas.delete_persona(id).await? {
            return Err(CoreError::NotFound {
                entity: "Persona",
                id,
            });
        }
        tracing::info!(persona_id = id, user_id = actor, "Persona deleted");
        Ok(())
    }

    /// Insert any missing built-in personas. Returns how many were added.
    pub async fn seed_predefined(&self) -> Result<usize, CoreError> {
        let mut inserted = 0;
        for data in predefined_personas() {
            if self.personas.predefined_persona_exists(&data.name).await? {
                continue;
            }
            let persona = self.personas.insert_persona(NewPersona::predefined(data)).await?;
            tracing::debug!(persona_id = persona.id, name = %persona.name, "Seeded predefined persona");
            inserted += 1;
        }
        if inserted > 0 {
            tracing::info!(count = inserted, "Predefined personas seeded");
        }
        Ok(inserted)
    }

    // ---- private helpers ----

    async fn load_editable(&self, id: DbId, actor: DbId) -> Result<Persona, CoreError> {
        let persona = require_persona(self.personas.as_ref(), id).await?;
        if !persona_editable(&persona, actor) {
            let message = if persona.is_predefined {
                "Predefined personas cannot be modified"
            } else {
                "You do not have permission to modify this persona"
            };
            return Err(forbidden(message));
        }
        Ok(persona)
    }
}
