//! Orchestration of one question from raw text to final reply.

use crate::context::build_context;
use crate::freshness::FreshnessClassifier;
use crate::sanitize::{is_degenerate, sanitize_question, scrub_answer};
use leko_llm::{ChainOutcome, ChatPrompt, LlmClient, generate_with_chain};
use leko_web::{GoogleSearchClient, rank_by_recency};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Reply for an empty or missing question.
pub const EMPTY_QUESTION_REPLY: &str = "Bir soru sorabilir misin?";

/// Reply when every model in the chain failed.
pub const APOLOGY_REPLY: &str =
    "Üzgünüm, şu anda cevap veremiyorum. Biraz sonra tekrar sorar mısın?";

/// Reply when the generated answer was empty or a bare date/number.
pub const NO_CLEAR_ANSWER_REPLY: &str = "Bu konuda net bir cevap bulamadım.";

/// System prompt when the question needs live data: ground on the supplied
/// snippets, never guess, admit uncertainty.
pub const GROUNDED_SYSTEM_PROMPT: &str = "Sen Leko adında, çocuklarla konuşan sevecen bir \
robotsun. Sana internetten alınmış güncel bilgiler verilecek. Cevabını yalnızca bu bilgilere \
dayandır; bilgi yoksa ya da yetersizse tahmin etme, emin olmadığını söyle. Çocukların \
anlayacağı basit bir dille en fazla iki üç cümle kur. Link, adres veya site ismi verme.";

/// System prompt for general-knowledge questions: answer plainly and
/// definitively.
pub const GENERAL_SYSTEM_PROMPT: &str = "Sen Leko adında, çocuklarla konuşan sevecen bir \
robotsun. Soruyu genel bilginle net ve doğru biçimde cevapla. Çocukların anlayacağı basit bir \
dille en fazla iki üç cümle kur. Link, adres veya site ismi verme.";

/// Terminal payload of the pipeline; `answer` is always non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub answer: String,
    pub used_web: bool,
}

/// Tuning knobs sourced from configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model_chain: Vec<String>,
    pub result_count: u32,
    pub max_question_chars: usize,
    pub max_answer_chars: usize,
    pub generation_timeout: Duration,
}

/// The decide → fetch → compose → fallback pipeline.
///
/// The completion client is injected so tests can substitute a scripted
/// double; the search client is optional, and its absence just means every
/// answer is ungrounded.
pub struct AnswerPipeline {
    llm: Arc<dyn LlmClient>,
    search: Option<GoogleSearchClient>,
    classifier: FreshnessClassifier,
    config: PipelineConfig,
}

impl AnswerPipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Option<GoogleSearchClient>,
        classifier: FreshnessClassifier,
        config: PipelineConfig,
    ) -> Self {
        Self {
            llm,
            search,
            classifier,
            config,
        }
    }

    /// Answer one question. Never fails: every provider problem degrades to
    /// one of the fixed phrases, and the reply text is never empty.
    pub async fn answer(&self, raw_text: Option<&str>) -> Reply {
        let question = sanitize_question(raw_text, self.config.max_question_chars);
        if question.is_empty() {
            return Reply {
                answer: EMPTY_QUESTION_REPLY.to_string(),
                used_web: false,
            };
        }

        let fresh = self
            .classifier
            .needs_live_data(self.llm.as_ref(), &question)
            .await;

        let mut context = String::new();
        if fresh {
            if let Some(search) = &self.search {
                let mut hits = search.search(&question, self.config.result_count).await;
                rank_by_recency(&mut hits);
                context = build_context(&hits);
            }
        }

        tracing::debug!(
            fresh,
            grounded = !context.is_empty(),
            question_chars = question.chars().count(),
            "pipeline.classified"
        );

        let system = if fresh {
            GROUNDED_SYSTEM_PROMPT
        } else {
            GENERAL_SYSTEM_PROMPT
        };
        let user = if context.is_empty() {
            format!("Soru: {question}")
        } else {
            format!("Soru: {question}\n\nGüncel bilgiler:\n{context}")
        };

        let prompt = ChatPrompt::new(user)
            .with_system(system)
            .with_timeout(self.config.generation_timeout);

        let text =
            match generate_with_chain(self.llm.as_ref(), &self.config.model_chain, &prompt).await {
                ChainOutcome::Answered { text, model } => {
                    tracing::info!(model = %model, "pipeline.answered");
                    text
                }
                ChainOutcome::Exhausted => {
                    return Reply {
                        answer: APOLOGY_REPLY.to_string(),
                        used_web: fresh,
                    };
                }
            };

        let cleaned = scrub_answer(&text, self.config.max_answer_chars);
        let answer = if is_degenerate(&cleaned) {
            tracing::warn!("pipeline.degenerate_answer_substituted");
            NO_CLEAR_ANSWER_REPLY.to_string()
        } else {
            cleaned
        };

        Reply {
            answer,
            used_web: fresh,
        }
    }
}
