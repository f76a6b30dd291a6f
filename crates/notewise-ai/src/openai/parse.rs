//! Free-text analysis reply parsing.
//!
//! The model is asked for a summary, numbered key points, comma-separated
//! tags and a sentiment, but nothing forces it to comply. Parsing is
//! line-oriented and lenient; every field has a default so the result is
//! always fully populated.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use notewise_core::{NoteAnalysis, Sentiment};

/// Maximum number of key points kept from a reply.
pub const MAX_KEY_POINTS: usize = 5;

pub const DEFAULT_SUMMARY: &str = "Summary not available";
pub const DEFAULT_KEY_POINT: &str = "No key points identified";
pub const DEFAULT_TAG: &str = "general";

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.\-]").expect("numbered line pattern is valid"));

static SUMMARY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^summary[\s:\-]*").expect("summary label pattern is valid"));

static TAG_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z,\s]").expect("tag noise pattern is valid"));

/// Turn a model reply into a [`NoteAnalysis`].
pub fn parse_analysis_response(text: &str) -> NoteAnalysis {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let analysis = NoteAnalysis {
        summary: parse_summary(&lines),
        key_points: parse_key_points(&lines),
        suggested_tags: parse_tags(&lines),
        sentiment: parse_sentiment(&lines),
    };

    trace!(
        subsystem = "ai",
        component = "openai",
        lines = lines.len(),
        key_points = analysis.key_points.len(),
        tags = analysis.suggested_tags.len(),
        sentiment = %analysis.sentiment,
        "Parsed analysis reply"
    );
    analysis
}

fn contains_ci(line: &str, needle: &str) -> bool {
    line.to_lowercase().contains(needle)
}

fn parse_summary(lines: &[&str]) -> String {
    let line = lines
        .iter()
        .find(|l| contains_ci(l, "summary"))
        .or_else(|| lines.first());

    match line {
        Some(line) => SUMMARY_LABEL.replace(line, "").trim().to_string(),
        None => DEFAULT_SUMMARY.to_string(),
    }
}

fn parse_key_points(lines: &[&str]) -> Vec<String> {
    let points: Vec<String> = lines
        .iter()
        .filter(|l| NUMBERED_LINE.is_match(l) || contains_ci(l, "key point"))
        .take(MAX_KEY_POINTS)
        .map(|l| l.to_string())
        .collect();

    if points.is_empty() {
        vec![DEFAULT_KEY_POINT.to_string()]
    } else {
        points
    }
}

fn parse_tags(lines: &[&str]) -> Vec<String> {
    let tags: Vec<String> = lines
        .iter()
        .find(|l| contains_ci(l, "tag"))
        .map(|line| {
            TAG_NOISE
                .replace_all(line, "")
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if tags.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        tags
    }
}

fn parse_sentiment(lines: &[&str]) -> Sentiment {
    let Some(line) = lines.iter().find(|l| contains_ci(l, "sentiment")) else {
        return Sentiment::Neutral;
    };

    let line = line.to_lowercase();
    if line.contains("negative") {
        Sentiment::Negative
    } else if line.contains("positive") {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}
