//! Content items embedded in a campaign and the hashtag post-processing
//! applied to generated social copy.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::Timestamp;

pub const MAX_CONTENT_BODY_LEN: u64 = 5000;
pub const MAX_SUBJECT_LINE_LEN: u64 = 200;
/// Stored provenance prompts are cut to this many characters.
pub const MAX_GENERATION_PROMPT_LEN: usize = 500;
pub const MAX_QUALITY_SCORE: u8 = 100;

string_enum! {
    ContentType {
        Email => "email",
        SocialPost => "social_post",
        AdCopy => "ad_copy",
        BlogPost => "blog_post",
    }
}

string_enum! {
    Platform {
        Email => "email",
        Linkedin => "linkedin",
        Facebook => "facebook",
        Twitter => "twitter",
        Instagram => "instagram",
        Youtube => "youtube",
        Tiktok => "tiktok",
    }
}

impl ContentType {
    /// Whether content of this type may target `platform`.
    ///
    /// Email content only goes to the email platform, and the email platform
    /// only carries email content.
    pub fn supports(self, platform: Platform) -> bool {
        (self == ContentType::Email) == (platform == Platform::Email)
    }

    /// Platform used when a request leaves it unspecified.
    pub fn default_platform(self) -> Platform {
        match self {
            ContentType::Email => Platform::Email,
            ContentType::SocialPost | ContentType::AdCopy => Platform::Facebook,
            ContentType::BlogPost => Platform::Linkedin,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementMetrics {
    pub views: i64,
    pub clicks: i64,
    pub shares: i64,
    pub comments: i64,
    pub likes: i64,
}

/// A persisted content item. Never edited in place once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: uuid::Uuid,
    pub content_type: ContentType,
    pub platform: Platform,
    pub subject_line: Option<String>,
    pub content_body: String,
    pub visual_url: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub quality_score: u8,
    #[serde(default)]
    pub engagement_metrics: EngagementMetrics,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: Option<Timestamp>,
    pub generation_prompt: Option<String>,
    pub created_at: Timestamp,
}

/// Manually supplied content (also the shape generated drafts are checked
/// against before they are appended).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    pub content_type: ContentType,
    pub platform: Platform,
    #[validate(length(max = 200, message = "subjectLine must be at most 200 characters"))]
    pub subject_line: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "contentBody must be 1-5000 characters"))]
    pub content_body: String,
    #[validate(length(max = 2048, message = "visualUrl must be at most 2048 characters"))]
    pub visual_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hashtags"))]
    pub hashtags: Vec<String>,
    #[validate(range(max = 100, message = "qualityScore must be between 0 and 100"))]
    pub quality_score: Option<u8>,
}

fn validate_hashtags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().all(|t| t.len() > 1 && t.starts_with('#')) {
        Ok(())
    } else {
        Err(ValidationError::new("hashtag_prefix")
            .with_message("hashtags must start with '#'".into()))
    }
}

impl NewContent {
    /// Full schema check: field limits plus the type/platform matrix.
    pub fn check(&self) -> Result<(), CoreError> {
        let mut fields = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => crate::error::flatten_validation_errors(&errors),
        };
        if !self.content_type.supports(self.platform) {
            fields.push(crate::error::FieldError::new(
                "platform",
                format!(
                    "platform {} is not valid for content type {}",
                    self.platform, self.content_type
                ),
            ));
        }
        if self.subject_line.is_some() && self.content_type != ContentType::Email {
            fields.push(crate::error::FieldError::new(
                "subjectLine",
                "subjectLine is only allowed on email content",
            ));
        }
        if self.content_body.trim().is_empty() && !fields.iter().any(|f| f.field == "contentBody") {
            fields.push(crate::error::FieldError::new(
                "contentBody",
                "contentBody must not be blank",
            ));
        }
        if fields.is_empty() {
            Ok(())
        } else {
            fields.sort_by(|a, b| a.field.cmp(&b.field));
            Err(CoreError::InvalidFields(fields))
        }
    }
}

impl Content {
    /// Validate and assign identity. `prompt` is stored truncated.
    pub fn build(input: NewContent, prompt: Option<&str>, now: Timestamp) -> Result<Self, CoreError> {
        input.check()?;
        Ok(Self {
            id: uuid::Uuid::new_v4(),
            content_type: input.content_type,
            platform: input.platform,
            subject_line: input.subject_line,
            content_body: input.content_body,
            visual_url: input.visual_url,
            hashtags: input.hashtags,
            quality_score: input.quality_score.unwrap_or(0),
            engagement_metrics: EngagementMetrics::default(),
            is_published: false,
            published_at: None,
            generation_prompt: prompt.map(|p| truncate_chars(p, MAX_GENERATION_PROMPT_LEN)),
            created_at: now,
        })
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Hashtags
// ---------------------------------------------------------------------------

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[\p{L}\p{N}_]+$").expect("valid regex"));

static INLINE_HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[\p{L}\p{N}_]+").expect("valid regex"));

/// Split generated social copy into body and hashtags.
///
/// A trailing run of whitespace-separated `#tag` tokens is removed from the
/// body and returned as the tag list. Without such a block, hashtags found
/// inline are collected but left in the body. If stripping would leave the
/// body empty, the text is kept intact.
pub fn extract_hashtags(text: &str) -> (String, Vec<String>) {
    let trimmed = text.trim_end();
    let tokens: Vec<(usize, &str)> = trimmed
        .split_whitespace()
        .map(|tok| {
            let offset = tok.as_ptr() as usize - trimmed.as_ptr() as usize;
            (offset, tok)
        })
        .collect();

    let trailing = tokens
        .iter()
        .rev()
        .take_while(|(_, tok)| HASHTAG_RE.is_match(tok))
        .count();

    if trailing > 0 {
        let split_at = tokens[tokens.len() - trailing].0;
        let body = trimmed[..split_at].trim_end();
        if !body.is_empty() {
            let tags = tokens[tokens.len() - trailing..]
                .iter()
                .map(|(_, tok)| tok.to_string());
            return (body.to_string(), dedupe(tags));
        }
    }

    let inline = INLINE_HASHTAG_RE
        .find_iter(trimmed)
        .map(|m| m.as_str().to_string());
    (trimmed.trim_start().to_string(), dedupe(inline))
}

fn dedupe(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
