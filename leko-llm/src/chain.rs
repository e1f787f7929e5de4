//! Ordered model fallback.
//!
//! The chain is data, not nested error handling: one loop walks the model
//! list with the same payload and reports either the first usable text or
//! exhaustion. Callers decide what exhaustion means (the answer pipeline
//! substitutes a fixed apology).

use crate::traits::{ChatPrompt, LlmClient};

#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    /// A model in the chain produced non-empty text.
    Answered { text: String, model: String },
    /// Every model failed or returned nothing usable.
    Exhausted,
}

/// Attempt `models` in order with an identical prompt payload.
///
/// A model that errors or returns blank text is logged and skipped; the
/// first usable completion wins. This function never fails; exhaustion is
/// an ordinary outcome.
pub async fn generate_with_chain(
    client: &dyn LlmClient,
    models: &[String],
    prompt: &ChatPrompt,
) -> ChainOutcome {
    for model in models {
        match client.complete(model, prompt).await {
            Ok(resp) if !resp.text.trim().is_empty() => {
                tracing::debug!(model = %model, "chain.answered");
                return ChainOutcome::Answered {
                    text: resp.text,
                    model: model.clone(),
                };
            }
            Ok(_) => {
                tracing::warn!(model = %model, "chain.blank_completion");
            }
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "chain.model_failed");
            }
        }
    }

    tracing::warn!(models = models.len(), "chain.exhausted");
    ChainOutcome::Exhausted
}
