//! LLM response coercion
//!
//! Models wrap JSON in prose or markdown fences, so the payload is cut out
//! first and then deserialized leniently. Anything unusable is an error the
//! caller replaces with fallback content.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON payload in response")]
    NoJson,
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no usable content")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    #[serde(default)]
    pub hook: String,
    #[serde(default, alias = "description")]
    pub summary: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, alias = "why", alias = "why_it_works")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoScript {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hook: String,
    /// Spoken beats in order
    #[serde(default, alias = "body", alias = "script", deserialize_with = "text_or_lines")]
    pub beats: Vec<String>,
    #[serde(default, alias = "call_to_action")]
    pub cta: String,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub on_screen_text: Vec<String>,
    #[serde(default, deserialize_with = "text_or_lines")]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    #[serde(default, alias = "description")]
    pub detail: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInsights {
    #[serde(default)]
    pub summary: String,
    #[serde(default, alias = "recommendations")]
    pub insights: Vec<Insight>,
}

/// Accept either a list of strings or one newline-separated string
fn text_or_lines<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrLines {
        Lines(Vec<String>),
        Text(String),
    }

    Ok(match Option::<TextOrLines>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(TextOrLines::Lines(lines)) => lines,
        Some(TextOrLines::Text(text)) => text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Cut the JSON payload out of a model response
///
/// Prefers a fenced code block; otherwise takes the first balanced `[...]`
/// or `{...}` span, ignoring brackets inside string literals.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    if let Some(start) = raw.find("```") {
        let after = &raw[start + 3..];
        // Skip the language tag line
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if inner.starts_with('{') || inner.starts_with('[') {
                return Some(inner);
            }
        }
    }

    let start = raw.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn payload<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let block = extract_json_block(raw).ok_or(ParseError::NoJson)?;
    Ok(serde_json::from_str(block)?)
}

/// Ideas as a bare array or wrapped in `{"ideas": [...]}`
pub fn parse_ideas(raw: &str) -> Result<Vec<ContentIdea>, ParseError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdeasPayload {
        List(Vec<ContentIdea>),
        Wrapped { ideas: Vec<ContentIdea> },
    }

    let ideas = match payload::<IdeasPayload>(raw)? {
        IdeasPayload::List(ideas) | IdeasPayload::Wrapped { ideas } => ideas,
    };
    let ideas: Vec<ContentIdea> = ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .collect();

    if ideas.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(ideas)
}

pub fn parse_script(raw: &str) -> Result<VideoScript, ParseError> {
    let script: VideoScript = payload(raw)?;
    if script.hook.trim().is_empty() && script.beats.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(script)
}

pub fn parse_insights(raw: &str) -> Result<GrowthInsights, ParseError> {
    let insights: GrowthInsights = payload(raw)?;
    if insights.summary.trim().is_empty() && insights.insights.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(insights)
}

// ============================================================================
// Fallback content
// ============================================================================

const FALLBACK_IDEAS: [(&str, &str, &str, &str); 5] = [
    (
        "Behind the scenes of your process",
        "You only see the final result. Here's what it actually takes.",
        "Show the unpolished steps behind your most popular video.",
        "talking head + b-roll",
    ),
    (
        "Three mistakes beginners make",
        "Stop doing this if you're just starting out.",
        "List common mistakes in your niche and the quick fix for each.",
        "listicle",
    ),
    (
        "Answer your top comment",
        "Someone asked this and I had to respond.",
        "Reply to a recurring question from your comments with a video reply.",
        "comment reply",
    ),
    (
        "Before and after",
        "Watch this transformation in under 30 seconds.",
        "A quick transformation that pays off visually by the end.",
        "transition",
    ),
    (
        "Myth vs fact",
        "Everyone believes this, and it's wrong.",
        "Debunk a popular belief in your niche with a clear demonstration.",
        "green screen",
    ),
];

pub fn fallback_ideas(count: usize) -> Vec<ContentIdea> {
    FALLBACK_IDEAS
        .iter()
        .cycle()
        .take(count.max(1))
        .map(|(title, hook, summary, format)| ContentIdea {
            title: title.to_string(),
            hook: hook.to_string(),
            summary: summary.to_string(),
            format: Some(format.to_string()),
            rationale: None,
        })
        .collect()
}

pub fn fallback_script(topic: &str) -> VideoScript {
    VideoScript {
        title: topic.to_string(),
        hook: format!("Here's what nobody tells you about {}.", topic),
        beats: vec![
            "State the problem your viewer has in one sentence.".to_string(),
            "Show the single most useful tip, on screen, step by step.".to_string(),
            "Add a quick example or result that proves it works.".to_string(),
        ],
        cta: "Follow for part two.".to_string(),
        on_screen_text: vec![topic.to_string()],
        hashtags: Vec::new(),
    }
}

pub fn fallback_insights() -> GrowthInsights {
    let insight = |title: &str, detail: &str, priority: &str| Insight {
        title: title.to_string(),
        detail: detail.to_string(),
        priority: priority.to_string(),
    };
    GrowthInsights {
        summary: "Keep posting consistently and double down on the formats that retain viewers."
            .to_string(),
        insights: vec![
            insight(
                "Tighten your first 3 seconds",
                "Videos with higher retention open with the payoff. Lead with the result.",
                "high",
            ),
            insight(
                "Repeat your best format",
                "Remake your top video's structure with a new topic this week.",
                "medium",
            ),
            insight(
                "Ask for the save",
                "Saves signal value to the algorithm. Give viewers a reason to come back.",
                "low",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_block() {
        let raw = "Sure! Here you go:\n```json\n[{\"title\": \"A\"}]\n```\nEnjoy.";
        assert_eq!(extract_json_block(raw), Some("[{\"title\": \"A\"}]"));
    }

    #[test]
    fn test_extract_balanced_span_ignores_strings() {
        let raw = r#"Result: {"hook": "use [brackets] and } braces", "beats": []} trailing"#;
        assert_eq!(
            extract_json_block(raw),
            Some(r#"{"hook": "use [brackets] and } braces", "beats": []}"#)
        );
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("{ unterminated"), None);
    }

    #[test]
    fn test_parse_ideas_wrapped_and_aliases() {
        let raw = r#"{"ideas": [
            {"title": "Day in the life", "description": "Follow me around", "why": "relatable"},
            {"title": "  "}
        ]}"#;
        let ideas = parse_ideas(raw).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].summary, "Follow me around");
        assert_eq!(ideas[0].rationale.as_deref(), Some("relatable"));
    }

    #[test]
    fn test_parse_ideas_rejects_garbage() {
        assert!(matches!(parse_ideas("I can't help"), Err(ParseError::NoJson)));
        assert!(matches!(parse_ideas("[]"), Err(ParseError::Empty)));
        assert!(matches!(parse_ideas("[1, 2]"), Err(ParseError::Json(_))));
    }

    #[test]
    fn test_parse_script_text_body() {
        let raw = r##"```
{"hook": "Wait for it", "script": "line one\n\nline two", "hashtags": ["#fyp"]}
```"##;
        let script = parse_script(raw).unwrap();
        assert_eq!(script.beats, vec!["line one", "line two"]);
        assert_eq!(script.hashtags, vec!["#fyp"]);
        assert!(matches!(parse_script("{}"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_insights_default_priority() {
        let raw = r#"{"summary": "Growing", "recommendations": [{"title": "Post more"}]}"#;
        let insights = parse_insights(raw).unwrap();
        assert_eq!(insights.insights[0].priority, "medium");
    }

    #[test]
    fn test_fallback_ideas_count() {
        assert_eq!(fallback_ideas(3).len(), 3);
        assert_eq!(fallback_ideas(7).len(), 7);
        assert_eq!(fallback_ideas(0).len(), 1);
    }
}
