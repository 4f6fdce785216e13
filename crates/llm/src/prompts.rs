//! Chat message assembly for generation and scoring calls.

use std::fmt::Write as _;
use std::sync::LazyLock;

use adpilot_core::generation::{GenerationTask, PromptContext};
use regex::Regex;

use crate::api::ChatMessage;

const SYSTEM_PROMPT: &str = "You are a senior marketing copywriter. \
Write copy that fits the campaign and speaks directly to the described audience. \
Return only the requested text, without commentary or markdown headings.";

const SCORING_PROMPT: &str = "You are a marketing quality reviewer. \
Rate how well the given copy would resonate with the described audience. \
Reply with a single integer between 0 and 100 and nothing else.";

/// Sampling temperature derived from a 0-10 creativity level.
pub fn temperature(creativity_level: u8) -> f32 {
    f32::from(creativity_level.min(10)) * 0.1 + 0.2
}

/// Completion budget per task.
pub fn max_tokens(task: &GenerationTask) -> u32 {
    match task {
        GenerationTask::SubjectLine { .. } => 60,
        GenerationTask::SocialPost { .. } => 400,
        GenerationTask::AdCopy { .. } => 300,
        GenerationTask::Email => 1200,
        GenerationTask::BlogPost { .. } => 2000,
    }
}

fn task_instructions(task: &GenerationTask) -> String {
    match task {
        GenerationTask::Email => {
            "Write the body of a marketing email. Do not include a subject line.".into()
        }
        GenerationTask::SubjectLine { body } => format!(
            "Write one email subject line (at most 80 characters) for this email:\n\n{body}"
        ),
        GenerationTask::SocialPost { platform } => format!(
            "Write a {platform} post. End it with a line of 3 to 5 relevant hashtags."
        ),
        GenerationTask::AdCopy { platform } => format!(
            "Write short ad copy for {platform} with a headline, body and a clear call to action."
        ),
        GenerationTask::BlogPost { platform } => format!(
            "Write a blog post suitable for sharing on {platform}, with a title and short sections."
        ),
    }
}

/// Messages for a generation call.
pub fn generation_messages(ctx: &PromptContext) -> Vec<ChatMessage> {
    let mut user = String::new();
    let _ = writeln!(user, "{}", task_instructions(&ctx.task));
    let _ = writeln!(user);
    let _ = writeln!(user, "Campaign: {}", ctx.campaign_name);
    if let Some(description) = &ctx.campaign_description {
        let _ = writeln!(user, "Campaign description: {description}");
    }
    let _ = writeln!(user, "Objective: {}", ctx.objective);
    let _ = writeln!(user, "Tone: {}", ctx.tone);
    if let Some(keywords) = &ctx.keywords {
        let _ = writeln!(user, "Keywords: {keywords}");
    }
    let _ = writeln!(user);
    let _ = writeln!(user, "Audience: {} - {}", ctx.persona_name, ctx.persona_description);
    let _ = writeln!(
        user,
        "Demographics: age {}, income {}, location {}",
        ctx.age, ctx.income, ctx.location
    );
    if !ctx.values.is_empty() {
        let _ = writeln!(user, "Values: {}", ctx.values.join(", "));
    }
    if !ctx.interests.is_empty() {
        let _ = writeln!(user, "Interests: {}", ctx.interests.join(", "));
    }
    let _ = writeln!(user, "Pain points: {}", ctx.pain_points.join("; "));
    let _ = writeln!(user, "Goals: {}", ctx.goals.join("; "));
    if ctx.include_visuals {
        let _ = writeln!(user, "Suggest a visual to accompany the copy on its own last line.");
    }
    if let Some(extra) = &ctx.custom_instructions {
        let _ = writeln!(user, "Additional instructions: {extra}");
    }
    if let Some(index) = ctx.variation {
        let _ = writeln!(
            user,
            "This is variation {index}; take a distinct angle from other variations."
        );
    }

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Messages for a scoring call.
pub fn scoring_messages(content: &str, persona_summary: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SCORING_PROMPT),
        ChatMessage::user(format!("Audience:\n{persona_summary}\n\nCopy:\n{content}")),
    ]
}

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,3}").expect("valid regex"));

/// First integer in the reply, if it lies within 0-100.
pub fn parse_score(reply: &str) -> Option<u8> {
    SCORE_RE
        .find(reply)
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .filter(|n| *n <= 100)
        .map(|n| n as u8)
}

/// Strip wrapping quotes the model sometimes adds to a subject line.
pub fn clean_subject_line(raw: &str) -> String {
    let line = raw.lines().next().unwrap_or_default().trim();
    let line = line
        .strip_prefix("Subject:")
        .or_else(|| line.strip_prefix("subject:"))
        .unwrap_or(line)
        .trim();
    line.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}
