//! Permission predicates over (actor, entity).
//!
//! All functions are pure and fail closed: a missing owner reference, a
//! non-positive user id or a malformed collaborator entry never grants
//! access. Services call these instead of re-deriving permission logic.

use crate::campaign::Campaign;
use crate::persona::Persona;
use crate::types::DbId;

/// Anything with an optional owning user.
pub trait Owned {
    fn owner_id(&self) -> Option<DbId>;
}

impl Owned for Campaign {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.owner_id)
    }
}

impl Owned for Persona {
    fn owner_id(&self) -> Option<DbId> {
        self.owner_id
    }
}

fn valid_user(user_id: DbId) -> bool {
    user_id > 0
}

/// True iff the entity has an owner and it is `user_id`.
pub fn is_owner<E: Owned>(entity: &E, user_id: DbId) -> bool {
    valid_user(user_id)
        && matches!(entity.owner_id(), Some(owner) if valid_user(owner) && owner == user_id)
}

/// Owner, or a collaborator with role editor or admin.
pub fn campaign_editable(campaign: &Campaign, user_id: DbId) -> bool {
    is_owner(campaign, user_id)
        || (valid_user(user_id)
            && campaign
                .collaborators
                .iter()
                .any(|c| c.user_id == user_id && c.role.can_edit()))
}

/// Owner, or a collaborator with any role.
pub fn campaign_readable(campaign: &Campaign, user_id: DbId) -> bool {
    is_owner(campaign, user_id)
        || (valid_user(user_id) && campaign.collaborators.iter().any(|c| c.user_id == user_id))
}

/// Only the owner may delete; collaborators never can.
pub fn campaign_deletable(campaign: &Campaign, user_id: DbId) -> bool {
    is_owner(campaign, user_id)
}

/// Predefined personas are never editable.
pub fn persona_editable(persona: &Persona, user_id: DbId) -> bool {
    !persona.is_predefined && is_owner(persona, user_id)
}

/// Predefined personas are readable by everyone; custom ones by their owner.
///
/// A predefined persona carrying an owner, or a custom persona without one,
/// is readable by nobody.
pub fn persona_readable(persona: &Persona, user_id: DbId) -> bool {
    if persona.is_predefined {
        persona.owner_id.is_none() && valid_user(user_id)
    } else {
        is_owner(persona, user_id)
    }
}
