//! The Leko answer pipeline.
//!
//! One request flows sanitize → classify → (conditionally) search → compose
//! → generate → assemble. Provider failures are absorbed along the way; the
//! pipeline always hands back a usable reply.

pub mod context;
pub mod freshness;
pub mod pipeline;
pub mod sanitize;

pub use freshness::FreshnessClassifier;
pub use pipeline::{AnswerPipeline, PipelineConfig, Reply};
