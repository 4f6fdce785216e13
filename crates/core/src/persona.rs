//! Audience personas: reusable targeting profiles that steer generation.
//!
//! A persona is either *predefined* (no owner, readable by everyone, never
//! editable) or *custom* (exactly one owner). `is_predefined` is fixed at
//! creation; [`UpdatePersona`] has no field for it.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_PERSONA_NAME_LEN: u64 = 100;
pub const MAX_PERSONA_DESCRIPTION_LEN: u64 = 500;
/// Applies to each entry of `painPoints` and `goals`.
pub const MAX_PERSONA_LIST_ITEM_LEN: usize = 200;

string_enum! {
    /// Distribution channels a persona can be reached through.
    Channel {
        Email => "email",
        Facebook => "facebook",
        Instagram => "instagram",
        Twitter => "twitter",
        Linkedin => "linkedin",
        Tiktok => "tiktok",
        Youtube => "youtube",
        Pinterest => "pinterest",
        GoogleAds => "google_ads",
        Print => "print",
        Tv => "tv",
        Radio => "radio",
        DirectMail => "direct_mail",
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[validate(length(min = 1, max = 100, message = "age is required"))]
    pub age: String,
    #[validate(length(min = 1, max = 100, message = "income is required"))]
    pub income: String,
    #[validate(length(min = 1, max = 200, message = "location is required"))]
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Psychographics {
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: DbId,
    /// `None` iff the persona is predefined.
    pub owner_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub demographics: Demographics,
    pub psychographics: Psychographics,
    pub pain_points: Vec<String>,
    pub goals: Vec<String>,
    pub preferred_channels: Vec<Channel>,
    pub is_predefined: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Persona {
    /// Compact description used as scoring context for generated content.
    pub fn summary(&self) -> String {
        format!(
            "{name}: {description} Age {age}, income {income}, based in {location}. \
             Pain points: {pains}. Goals: {goals}.",
            name = self.name,
            description = self.description,
            age = self.demographics.age,
            income = self.demographics.income,
            location = self.demographics.location,
            pains = self.pain_points.join("; "),
            goals = self.goals.join("; "),
        )
    }

    /// Apply a validated patch in place.
    pub fn apply_update(&mut self, patch: UpdatePersona, now: Timestamp) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(demographics) = patch.demographics {
            self.demographics = demographics;
        }
        if let Some(psychographics) = patch.psychographics {
            self.psychographics = psychographics;
        }
        if let Some(pain_points) = patch.pain_points {
            self.pain_points = pain_points;
        }
        if let Some(goals) = patch.goals {
            self.goals = goals;
        }
        if let Some(channels) = patch.preferred_channels {
            self.preferred_channels = channels;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for creating a persona. Always produces a custom persona.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersona {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,
    #[validate(nested)]
    pub demographics: Demographics,
    #[serde(default)]
    #[validate(nested)]
    pub psychographics: Psychographics,
    #[validate(
        length(min = 1, message = "at least one pain point is required"),
        custom(function = "validate_list_items")
    )]
    pub pain_points: Vec<String>,
    #[validate(
        length(min = 1, message = "at least one goal is required"),
        custom(function = "validate_list_items")
    )]
    pub goals: Vec<String>,
    #[validate(length(min = 1, message = "at least one preferred channel is required"))]
    pub preferred_channels: Vec<Channel>,
}

/// Partial update for a custom persona. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersona {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: Option<String>,
    #[validate(nested)]
    pub demographics: Option<Demographics>,
    #[validate(nested)]
    pub psychographics: Option<Psychographics>,
    #[validate(
        length(min = 1, message = "at least one pain point is required"),
        custom(function = "validate_list_items")
    )]
    pub pain_points: Option<Vec<String>>,
    #[validate(
        length(min = 1, message = "at least one goal is required"),
        custom(function = "validate_list_items")
    )]
    pub goals: Option<Vec<String>>,
    #[validate(length(min = 1, message = "at least one preferred channel is required"))]
    pub preferred_channels: Option<Vec<Channel>>,
}

/// A persona ready for insertion. Ownership and the predefined flag are
/// decided by the caller, never by the request body.
#[derive(Debug, Clone)]
pub struct NewPersona {
    pub owner_id: Option<DbId>,
    pub is_predefined: bool,
    pub data: CreatePersona,
}

impl NewPersona {
    pub fn custom(owner_id: DbId, data: CreatePersona) -> Self {
        Self {
            owner_id: Some(owner_id),
            is_predefined: false,
            data,
        }
    }

    pub fn predefined(data: CreatePersona) -> Self {
        Self {
            owner_id: None,
            is_predefined: true,
            data,
        }
    }

    /// Materialize into a stored persona with the given identity.
    pub fn into_persona(self, id: DbId, now: Timestamp) -> Persona {
        Persona {
            id,
            owner_id: self.owner_id,
            name: self.data.name,
            description: self.data.description,
            demographics: self.data.demographics,
            psychographics: self.data.psychographics,
            pain_points: self.data.pain_points,
            goals: self.data.goals,
            preferred_channels: self.data.preferred_channels,
            is_predefined: self.is_predefined,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_list_items(items: &[String]) -> Result<(), ValidationError> {
    for item in items {
        if item.trim().is_empty() {
            return Err(ValidationError::new("blank_item").with_message("entries must not be blank".into()));
        }
        if item.chars().count() > MAX_PERSONA_LIST_ITEM_LEN {
            return Err(ValidationError::new("item_too_long").with_message(
                format!("entries must be at most {MAX_PERSONA_LIST_ITEM_LEN} characters").into(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

/// Personas seeded once at startup as globally readable, non-editable entries.
pub fn predefined_personas() -> Vec<CreatePersona> {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    vec![
        CreatePersona {
            name: "Startup Founder".into(),
            description: "Early-stage founder juggling product, hiring and fundraising.".into(),
            demographics: Demographics {
                age: "28-40".into(),
                income: "$80k-$150k".into(),
                location: "Urban tech hubs".into(),
            },
            psychographics: Psychographics {
                values: strings(&["autonomy", "speed", "impact"]),
                interests: strings(&["productivity tools", "venture capital", "growth hacking"]),
            },
            pain_points: strings(&["Limited time", "Tight budget", "Hiring the right people"]),
            goals: strings(&["Reach product-market fit", "Grow revenue quickly"]),
            preferred_channels: vec![Channel::Linkedin, Channel::Twitter, Channel::Email],
        },
        CreatePersona {
            name: "Busy Parent".into(),
            description: "Working parent optimising for convenience and family well-being.".into(),
            demographics: Demographics {
                age: "30-45".into(),
                income: "$50k-$120k".into(),
                location: "Suburban areas".into(),
            },
            psychographics: Psychographics {
                values: strings(&["family", "safety", "value for money"]),
                interests: strings(&["meal planning", "education", "home organisation"]),
            },
            pain_points: strings(&["Not enough time", "Balancing work and family"]),
            goals: strings(&["Simplify daily routines", "Spend more time with kids"]),
            preferred_channels: vec![Channel::Facebook, Channel::Instagram, Channel::Email],
        },
        CreatePersona {
            name: "Enterprise IT Decision Maker".into(),
            description: "Senior IT leader evaluating vendors for large organisations.".into(),
            demographics: Demographics {
                age: "35-55".into(),
                income: "$150k+".into(),
                location: "North America and Europe".into(),
            },
            psychographics: Psychographics {
                values: strings(&["reliability", "security", "compliance"]),
                interests: strings(&["cloud infrastructure", "cybersecurity", "digital transformation"]),
            },
            pain_points: strings(&["Legacy system integration", "Security risks", "Vendor lock-in"]),
            goals: strings(&["Reduce operational cost", "Modernise the stack safely"]),
            preferred_channels: vec![Channel::Linkedin, Channel::Email, Channel::GoogleAds],
        },
        CreatePersona {
            name: "Gen Z Creator".into(),
            description: "Digital-native content creator building an audience on short video.".into(),
            demographics: Demographics {
                age: "18-26".into(),
                income: "Under $40k".into(),
                location: "Global, mobile-first".into(),
            },
            psychographics: Psychographics {
                values: strings(&["authenticity", "self-expression", "sustainability"]),
                interests: strings(&["short-form video", "fashion", "music"]),
            },
            pain_points: strings(&["Algorithm changes", "Monetisation"]),
            goals: strings(&["Grow followers", "Land brand partnerships"]),
            preferred_channels: vec![Channel::Tiktok, Channel::Instagram, Channel::Youtube],
        },
    ]
}
