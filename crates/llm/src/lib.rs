//! Client for an OpenAI-compatible chat-completions API.
//!
//! - [`api::ChatApi`]: thin reqwest wrapper over `/chat/completions`.
//! - [`prompts`]: turns a [`PromptContext`](adpilot_core::generation::PromptContext)
//!   into chat messages and parses scoring replies.
//! - [`OpenAiCapability`]: the production
//!   [`GenerationCapability`](adpilot_core::generation::GenerationCapability).

pub mod api;
pub mod config;
pub mod prompts;
pub mod provider;

pub use config::LlmConfig;
pub use provider::OpenAiCapability;
