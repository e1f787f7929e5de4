//! Best-effort date extraction and newest-first re-ranking.
//!
//! Search snippets carry dates in several shapes: ISO numerics, the dotted
//! numeric form common on Turkish sites, spelled-out Turkish month names,
//! and English month names on international sources. We try them in that
//! order and keep the first that forms a real calendar date.

use crate::google::SearchHit;
use chrono::NaiveDate;
use regex::Regex;
use std::cmp::Reverse;
use std::sync::LazyLock;

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

static DOTTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[./](\d{1,2})[./](\d{4})\b").unwrap());

static TR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s+(ocak|şubat|mart|nisan|mayıs|haziran|temmuz|ağustos|eylül|ekim|kasım|aralık)\s+(\d{4})\b",
    )
    .unwrap()
});

static EN_DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s+(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{4})\b",
    )
    .unwrap()
});

static EN_MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .unwrap()
});

const TR_MONTHS: [&str; 12] = [
    "ocak", "şubat", "mart", "nisan", "mayıs", "haziran", "temmuz", "ağustos", "eylül", "ekim",
    "kasım", "aralık",
];

const EN_MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_index(name: &str, table: &[&str; 12]) -> Option<u32> {
    let lowered = name.to_lowercase();
    table
        .iter()
        .position(|m| *m == lowered)
        .map(|i| i as u32 + 1)
}

/// Extract the first recognizable date from free text.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_RE.captures(text) {
        let (y, m, d) = (num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    if let Some(caps) = DOTTED_RE.captures(text) {
        let (d, m, y) = (num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?);
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    if let Some(caps) = TR_RE.captures(text) {
        let d = num(&caps, 1)?;
        let m = month_index(caps.get(2)?.as_str(), &TR_MONTHS)?;
        let y = num(&caps, 3)?;
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    if let Some(caps) = EN_DAY_FIRST_RE.captures(text) {
        let d = num(&caps, 1)?;
        let m = month_index(caps.get(2)?.as_str(), &EN_MONTHS)?;
        let y = num(&caps, 3)?;
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    if let Some(caps) = EN_MONTH_FIRST_RE.captures(text) {
        let m = month_index(caps.get(1)?.as_str(), &EN_MONTHS)?;
        let d = num(&caps, 2)?;
        let y = num(&caps, 3)?;
        if let Some(date) = NaiveDate::from_ymd_opt(y as i32, m, d) {
            return Some(date);
        }
    }

    None
}

fn num(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Re-rank hits newest first. Undated hits sort as date-minimum: they move
/// to the tail in their original relevance order and are never dropped.
pub fn rank_by_recency(hits: &mut [SearchHit]) {
    hits.sort_by_key(|h| Reverse(h.date.unwrap_or(NaiveDate::MIN)));
}
