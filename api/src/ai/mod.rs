//! AI content generation
//!
//! Builds prompts from computed metrics, calls the configured LLM once, and
//! parses the reply. Any failure along the way yields hardcoded fallback
//! content flagged with `fallback = true`, so these functions never fail.

pub mod embeddings;
pub mod parse;
pub mod prompts;

use serde::Serialize;

use crate::constants::{DEFAULT_IDEA_COUNT, MAX_IDEA_COUNT};
use crate::metrics::ScoredVideo;
use crate::services::llm::{CompletionRequest, LlmClient};

pub use parse::{ContentIdea, GrowthInsights, ParseError, VideoScript};
pub use prompts::CreatorSnapshot;

const IDEAS_MAX_TOKENS: u32 = 2048;
const SCRIPT_MAX_TOKENS: u32 = 1500;
const INSIGHTS_MAX_TOKENS: u32 = 1500;
const DEFAULT_SCRIPT_SECONDS: u32 = 30;

/// Generation output, flagged when it is fallback content
#[derive(Debug, Clone, Serialize)]
pub struct Generated<T> {
    pub data: T,
    pub fallback: bool,
}

impl<T> Generated<T> {
    fn fallback(data: T) -> Self {
        Generated { data, fallback: true }
    }
}

/// The `n` best videos by viral index
pub fn top_videos(mut scored: Vec<ScoredVideo>, n: usize) -> Vec<ScoredVideo> {
    scored.sort_by(|a, b| b.viral.index.total_cmp(&a.viral.index));
    scored.truncate(n);
    scored
}

/// Clamp a requested idea count into the supported range
pub fn idea_count(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_IDEA_COUNT).clamp(1, MAX_IDEA_COUNT)
}

async fn generate<T>(
    llm: Option<&LlmClient>,
    kind: &'static str,
    prompt: &str,
    max_tokens: u32,
    parse: impl FnOnce(&str) -> Result<T, ParseError>,
    fallback: impl FnOnce() -> T,
) -> Generated<T> {
    let Some(llm) = llm else {
        tracing::info!(kind, "no LLM provider configured, serving fallback");
        return Generated::fallback(fallback());
    };

    let request = CompletionRequest {
        system: prompts::SYSTEM_PROMPT,
        prompt,
        max_tokens,
        temperature: 0.7,
    };

    let raw = match llm.complete(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(kind, provider = llm.provider_name(), error = %e, "LLM call failed, serving fallback");
            return Generated::fallback(fallback());
        }
    };

    match parse(&raw) {
        Ok(data) => Generated {
            data,
            fallback: false,
        },
        Err(e) => {
            tracing::warn!(kind, provider = llm.provider_name(), error = %e, "unparseable LLM response, serving fallback");
            Generated::fallback(fallback())
        }
    }
}

pub async fn generate_ideas(
    llm: Option<&LlmClient>,
    snapshot: &CreatorSnapshot<'_>,
    count: usize,
    focus: Option<&str>,
) -> Generated<Vec<ContentIdea>> {
    let prompt = prompts::ideas_prompt(snapshot, count, focus);
    let mut generated = generate(
        llm,
        "ideas",
        &prompt,
        IDEAS_MAX_TOKENS,
        parse::parse_ideas,
        || parse::fallback_ideas(count),
    )
    .await;
    generated.data.truncate(count);
    generated
}

pub async fn generate_script(
    llm: Option<&LlmClient>,
    snapshot: &CreatorSnapshot<'_>,
    topic: &str,
    notes: Option<&str>,
    duration_seconds: Option<u32>,
) -> Generated<VideoScript> {
    let duration = duration_seconds.unwrap_or(DEFAULT_SCRIPT_SECONDS);
    let prompt = prompts::script_prompt(snapshot, topic, notes, duration);
    generate(
        llm,
        "script",
        &prompt,
        SCRIPT_MAX_TOKENS,
        parse::parse_script,
        || parse::fallback_script(topic),
    )
    .await
}

pub async fn generate_insights(
    llm: Option<&LlmClient>,
    snapshot: &CreatorSnapshot<'_>,
) -> Generated<GrowthInsights> {
    let prompt = prompts::insights_prompt(snapshot);
    generate(
        llm,
        "insights",
        &prompt,
        INSIGHTS_MAX_TOKENS,
        parse::parse_insights,
        parse::fallback_insights,
    )
    .await
}
