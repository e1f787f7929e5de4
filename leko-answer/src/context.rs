//! Turns search hits into one compact grounding block.

use leko_web::SearchHit;

/// At most this many hits make it into the model context.
pub const MAX_CONTEXT_RESULTS: usize = 5;

/// Format the top hits as labeled blocks joined by separators. The source
/// link is kept for model grounding; the answer scrubber keeps it away from
/// the end user. An empty slice yields an empty string, which the generator
/// treats as "no grounding available".
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .take(MAX_CONTEXT_RESULTS)
        .enumerate()
        .map(|(i, hit)| format_block(i + 1, hit))
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn format_block(index: usize, hit: &SearchHit) -> String {
    let mut block = format!("Kaynak {index}: {}\n{}", hit.title, hit.snippet);
    if let Some(date) = hit.date {
        block.push_str(&format!("\nTarih: {date}"));
    }
    if !hit.link.is_empty() {
        block.push_str(&format!("\n({})", hit.link));
    }
    block
}
