use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("empty completion from {0}")]
    EmptyCompletion(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// One completion request: system + user text plus optional generation
/// knobs. Some models reject `temperature`, so both knobs stay optional and
/// are only put on the wire when set.
#[derive(Debug, Clone, Default)]
pub struct ChatPrompt {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Per-call deadline; the client falls back to its own default when unset.
    pub timeout: Option<Duration>,
}

impl ChatPrompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion against the named model.
    async fn complete(&self, model: &str, prompt: &ChatPrompt)
    -> Result<LlmResponse, LlmError>;
}
