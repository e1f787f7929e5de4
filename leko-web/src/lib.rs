//! Web discovery for answer grounding.
//!
//! - Google Custom Search client (`google`) for snippet retrieval
//! - Date extraction and newest-first re-ranking (`recency`)

pub mod google;
pub mod recency;

pub use google::{GoogleSearchClient, SearchHit};
pub use recency::{extract_date, rank_by_recency};
