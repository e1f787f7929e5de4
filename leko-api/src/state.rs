use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use leko_answer::{AnswerPipeline, FreshnessClassifier, PipelineConfig};
use leko_common::LekoError;
use leko_config::LekoConfig;
use leko_llm::OpenAiClient;
use leko_web::GoogleSearchClient;
use serde::Serialize;

/// One queued robot command. The queue is process-lifetime only and is lost
/// on restart; a durable queue would sit behind the same two operations.
#[derive(Debug, Clone, Serialize)]
pub struct RobotCommand {
    pub robot_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub queued_at: DateTime<Utc>,
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// `None` when no completion credential is configured; `/ask` reports
    /// that per request instead of failing startup.
    pub pipeline: Option<AnswerPipeline>,
    /// Shared secret for the command endpoints. Unset = open (dev mode).
    pub secret: Option<String>,
    commands: Mutex<VecDeque<RobotCommand>>,
}

impl AppState {
    /// Assemble clients and the answer pipeline from loaded configuration.
    pub fn from_config(cfg: &LekoConfig) -> Result<Self, LekoError> {
        let pipeline = match cfg.openai.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Some(Self::build_pipeline(cfg, key)?),
            _ => {
                tracing::warn!("no OpenAI API key configured; /ask will report it per request");
                None
            }
        };

        Ok(Self {
            pipeline,
            secret: cfg.secret.clone(),
            commands: Mutex::new(VecDeque::new()),
        })
    }

    fn build_pipeline(cfg: &LekoConfig, api_key: &str) -> Result<AnswerPipeline, LekoError> {
        let llm = Arc::new(
            OpenAiClient::new(api_key.to_string(), &cfg.openai.endpoint)
                .map_err(|e| LekoError::Config(e.to_string()))?,
        );

        let search = match (cfg.search.api_key.as_deref(), cfg.search.engine_id.as_deref()) {
            (Some(key), Some(engine_id)) if !key.is_empty() && !engine_id.is_empty() => {
                Some(
                    GoogleSearchClient::new(
                        key.to_string(),
                        engine_id.to_string(),
                        &cfg.search.endpoint,
                        cfg.search.gl.clone(),
                        cfg.search.hl.clone(),
                        Duration::from_secs(cfg.search.timeout_secs),
                    )
                    .map_err(|e| LekoError::Config(e.to_string()))?,
                )
            }
            _ => {
                tracing::info!("search credentials missing; answering without web grounding");
                None
            }
        };

        let classifier = FreshnessClassifier::new(
            cfg.openai.classifier_model.clone(),
            Duration::from_secs(cfg.openai.classifier_timeout_secs),
            &cfg.freshness.extra_keywords,
        );

        Ok(AnswerPipeline::new(
            llm,
            search,
            classifier,
            PipelineConfig {
                model_chain: cfg.openai.model_chain.clone(),
                result_count: cfg.search.result_count,
                max_question_chars: cfg.answer.max_question_chars,
                max_answer_chars: cfg.answer.max_answer_chars,
                generation_timeout: Duration::from_secs(cfg.openai.generation_timeout_secs),
            },
        ))
    }

    /// Lock the command queue, recovering the guard if a handler panicked
    /// while holding it.
    pub fn command_queue(&self) -> MutexGuard<'_, VecDeque<RobotCommand>> {
        self.commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
