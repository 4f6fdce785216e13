//! [`GenerationCapability`] backed by the chat-completions client.

use std::time::Duration;

use adpilot_core::generation::{GenerationCapability, GenerationError, PromptContext};
use async_trait::async_trait;

use crate::api::{ChatApi, LlmError};
use crate::config::LlmConfig;
use crate::prompts;

const SCORING_TEMPERATURE: f32 = 0.0;
const SCORING_MAX_TOKENS: u32 = 8;

/// OpenAI-compatible generation capability.
///
/// Built once at startup. Without an API key the inner client is absent and
/// [`is_available`](GenerationCapability::is_available) returns false.
pub struct OpenAiCapability {
    api: Option<ChatApi>,
    model: String,
}

impl OpenAiCapability {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api = match &config.api_key {
            Some(key) => Some(ChatApi::new(
                config.base_url.clone(),
                key.clone(),
                config.model.clone(),
                Duration::from_secs(config.timeout_secs),
            )?),
            None => None,
        };
        if api.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, content generation is disabled");
        }
        Ok(Self {
            api,
            model: config.model.clone(),
        })
    }

    fn api(&self) -> Result<&ChatApi, GenerationError> {
        self.api.as_ref().ok_or(GenerationError::Unavailable)
    }
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        if err.is_timeout() {
            return GenerationError::Timeout;
        }
        match err {
            LlmError::EmptyResponse => GenerationError::EmptyResponse,
            other => GenerationError::Request(other.to_string()),
        }
    }
}

#[async_trait]
impl GenerationCapability for OpenAiCapability {
    fn is_available(&self) -> bool {
        self.api.is_some()
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> Option<&str> {
        self.api.as_ref().map(|_| self.model.as_str())
    }

    async fn generate(&self, ctx: &PromptContext) -> Result<String, GenerationError> {
        let api = self.api()?;
        let messages = prompts::generation_messages(ctx);
        let text = api
            .complete(
                &messages,
                prompts::temperature(ctx.creativity_level),
                prompts::max_tokens(&ctx.task),
            )
            .await
            .map_err(|e| {
                tracing::error!(error = %e, task = %ctx.task.label(), "Generation call failed");
                GenerationError::from(e)
            })?;

        if matches!(ctx.task, adpilot_core::generation::GenerationTask::SubjectLine { .. }) {
            let subject = prompts::clean_subject_line(&text);
            if subject.is_empty() {
                return Err(GenerationError::EmptyResponse);
            }
            return Ok(subject);
        }
        Ok(text)
    }

    async fn score(&self, content: &str, persona_summary: &str) -> Result<u8, GenerationError> {
        let api = self.api()?;
        let reply = api
            .complete(
                &prompts::scoring_messages(content, persona_summary),
                SCORING_TEMPERATURE,
                SCORING_MAX_TOKENS,
            )
            .await?;
        prompts::parse_score(&reply)
            .ok_or_else(|| GenerationError::Malformed(format!("unparseable score '{reply}'")))
    }
}
