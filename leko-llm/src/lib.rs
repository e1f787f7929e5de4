//! Completion-provider integration for Leko.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, an OpenAI
//! chat-completions implementation, and [`chain::generate_with_chain`], the
//! ordered model-fallback loop the answer pipeline runs on.

pub mod chain;
pub mod openai;
pub mod traits;

pub use chain::{ChainOutcome, generate_with_chain};
pub use openai::OpenAiClient;
pub use traits::{ChatPrompt, LlmClient, LlmError, LlmResponse};
