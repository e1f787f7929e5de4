//! Text hygiene for questions and answers.
//!
//! Sanitisation is idempotent: running it on already-clean text is a no-op.

use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap());

static MD_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

static NUMERIC_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s.,:;/\-%]+$").unwrap());

/// Normalise an incoming question: missing input becomes an empty string,
/// URLs are dropped, whitespace runs collapse to single spaces, and the
/// result is capped at `max_chars` characters.
pub fn sanitize_question(raw: Option<&str>, max_chars: usize) -> String {
    let text = raw.unwrap_or_default();
    let without_urls = URL_RE.replace_all(text, " ");
    let collapsed = collapse_whitespace(&without_urls);
    truncate_chars(&collapsed, max_chars)
}

/// Clean a generated answer before it reaches the caller: markdown links
/// shrink to their labels, URL-shaped substrings disappear, whitespace
/// collapses, and the text is capped at `max_chars`.
pub fn scrub_answer(text: &str, max_chars: usize) -> String {
    let without_md = MD_LINK_RE.replace_all(text, "$1");
    let without_urls = URL_RE.replace_all(&without_md, " ");
    let collapsed = collapse_whitespace(&without_urls);
    truncate_chars(&collapsed, max_chars)
}

/// A degenerate answer is empty or carries only a bare date/number, the
/// usual model output when grounding data is thin.
pub fn is_degenerate(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || NUMERIC_ONLY_RE.is_match(trimmed)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    cut.trim_end().to_string()
}
