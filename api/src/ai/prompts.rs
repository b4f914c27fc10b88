//! Prompt templates
//!
//! Prompts are plain strings with the creator's computed metrics written
//! inline. The model is always asked for JSON so `parse` can recover it.

use crate::metrics::ScoredVideo;
use crate::metrics::kpis::KpiSummary;
use crate::models::{AccountContext, IdeaFeedback};

pub const SYSTEM_PROMPT: &str = "You are an expert TikTok growth strategist. \
You give specific, data-driven advice grounded in the creator's own analytics. \
Always answer with valid JSON only, no commentary.";

/// Everything known about the creator that a prompt may interpolate
#[derive(Debug, Default, Clone, Copy)]
pub struct CreatorSnapshot<'a> {
    pub top_videos: &'a [ScoredVideo],
    pub kpis: Option<&'a KpiSummary>,
    pub context: Option<&'a AccountContext>,
    pub feedback: &'a [IdeaFeedback],
}

fn describe_video(rank: usize, v: &ScoredVideo) -> String {
    let mut line = format!(
        "{}. \"{}\" ({}) views={} engagement={:.2}% retention={:.1}% saves/1k={:.2} \
         follows/1k={:.2} for_you={:.1}% viral_index={:.1} views_percentile={}",
        rank,
        v.video.title,
        v.video.published_at,
        v.video.views,
        v.metrics.engagement_rate,
        v.metrics.retention_rate,
        v.metrics.saves_per_1k,
        v.metrics.f_per_1k,
        v.metrics.for_you_percentage,
        v.viral.index,
        v.percentiles.views,
    );
    if let Some(hook) = v.video.hook.as_deref().filter(|h| !h.is_empty()) {
        line.push_str(&format!("\n   hook: \"{}\"", hook));
    }
    let tags: Vec<&str> = [&v.video.theme, &v.video.cta_type, &v.video.editing_style]
        .into_iter()
        .filter_map(|t| t.as_deref())
        .collect();
    if !tags.is_empty() {
        line.push_str(&format!("\n   tags: {}", tags.join(", ")));
    }
    line
}

fn describe_context(context: Option<&AccountContext>) -> String {
    let Some(c) = context else {
        return "No account context provided.".to_string();
    };
    let field = |name: &str, value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(|v| format!("- {}: {}\n", name, v))
            .unwrap_or_default()
    };
    let out = [
        field("Niche", &c.niche),
        field("Target audience", &c.target_audience),
        field("Goals", &c.goals),
        field("Tone", &c.tone),
    ]
    .concat();
    if out.is_empty() {
        "No account context provided.".to_string()
    } else {
        out.trim_end().to_string()
    }
}

fn describe_top_videos(videos: &[ScoredVideo]) -> String {
    if videos.is_empty() {
        return "No videos recorded yet.".to_string();
    }
    videos
        .iter()
        .enumerate()
        .map(|(i, v)| describe_video(i + 1, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_kpis(kpis: Option<&KpiSummary>) -> String {
    let Some(k) = kpis else {
        return "No KPI data available.".to_string();
    };
    let c = &k.current;
    format!(
        "Last {} days: {} videos, {} views ({:+.1}% vs previous period), \
         avg views {:.0}, engagement {:.2}% ({:+.1}%), avg retention {:.1}%, \
         saves/1k {:.2}, follows/1k {:.2}, followers gained {} ({:+.1}%), \
         viral videos {}",
        k.window_days,
        c.video_count,
        c.total_views,
        k.changes.total_views,
        c.avg_views,
        c.engagement_rate,
        k.changes.engagement_rate,
        c.avg_retention_rate,
        c.saves_per_1k,
        c.f_per_1k,
        c.followers_gained,
        k.changes.followers_gained,
        c.viral_videos,
    )
}

fn describe_feedback(feedback: &[IdeaFeedback]) -> String {
    let titles = |liked: bool| {
        feedback
            .iter()
            .filter(|f| f.liked == liked)
            .map(|f| format!("\"{}\"", f.idea_title))
            .collect::<Vec<_>>()
    };
    let (liked, disliked) = (titles(true), titles(false));
    let mut out = String::new();
    if !liked.is_empty() {
        out.push_str(&format!("Ideas the creator liked: {}\n", liked.join(", ")));
    }
    if !disliked.is_empty() {
        out.push_str(&format!("Ideas the creator rejected: {}\n", disliked.join(", ")));
    }
    out
}

pub fn ideas_prompt(snapshot: &CreatorSnapshot<'_>, count: usize, focus: Option<&str>) -> String {
    let mut prompt = format!(
        "Generate {count} new TikTok video ideas for this creator.\n\n\
         ## Account\n{}\n\n## Top performing videos\n{}\n\n## Recent performance\n{}\n",
        describe_context(snapshot.context),
        describe_top_videos(snapshot.top_videos),
        describe_kpis(snapshot.kpis),
    );
    let feedback = describe_feedback(snapshot.feedback);
    if !feedback.is_empty() {
        prompt.push_str(&format!("\n## Feedback on earlier ideas\n{}", feedback));
    }
    if let Some(focus) = focus.filter(|f| !f.trim().is_empty()) {
        prompt.push_str(&format!("\nFocus the ideas on: {}\n", focus));
    }
    prompt.push_str(
        "\nRespond with a JSON array. Each element has \"title\", \"hook\", \
         \"summary\", \"format\" and \"rationale\" (why it should work for this \
         creator, referencing their metrics).",
    );
    prompt
}

pub fn script_prompt(
    snapshot: &CreatorSnapshot<'_>,
    topic: &str,
    notes: Option<&str>,
    duration_seconds: u32,
) -> String {
    let mut prompt = format!(
        "Write a TikTok script of about {duration_seconds} seconds on: {topic}\n\n\
         ## Account\n{}\n\n## Hooks and stats of the creator's best videos\n{}\n",
        describe_context(snapshot.context),
        describe_top_videos(snapshot.top_videos),
    );
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        prompt.push_str(&format!("\nCreator notes: {}\n", notes));
    }
    prompt.push_str(
        "\nRespond with a JSON object with \"title\", \"hook\" (first 3 seconds), \
         \"beats\" (array of spoken lines in order), \"cta\", \"on_screen_text\" \
         (array) and \"hashtags\" (array).",
    );
    prompt
}

pub fn insights_prompt(snapshot: &CreatorSnapshot<'_>) -> String {
    format!(
        "Analyze this creator's TikTok performance and give growth advice.\n\n\
         ## Account\n{}\n\n## Recent performance\n{}\n\n## Top performing videos\n{}\n\n\
         Respond with a JSON object with \"summary\" (two sentences) and \"insights\": \
         an array of objects with \"title\", \"detail\" and \"priority\" \
         (\"high\", \"medium\" or \"low\").",
        describe_context(snapshot.context),
        describe_kpis(snapshot.kpis),
        describe_top_videos(snapshot.top_videos),
    )
}
