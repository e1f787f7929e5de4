//! Decides whether a question needs live web data.
//!
//! Two stages: a zero-latency keyword pass over one consolidated marker
//! set, then a capped yes/no model call for the long tail the list misses.
//! The model stage fails closed: any provider problem means "no web", so
//! the request still gets a plain answer.

use leko_llm::{ChatPrompt, LlmClient};
use std::time::Duration;

pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Bir sorunun doğru cevabının güncel internet bilgisi \
gerektirip gerektirmediğine karar ver. Yalnızca EVET ya da HAYIR yaz, başka hiçbir şey yazma.";

/// Built-in temporal/volatility markers, lowercase. Deployments extend the
/// set through configuration rather than forking the list.
pub const DEFAULT_MARKERS: &[&str] = &[
    // Turkish
    "bugün",
    "şimdi",
    "şu an",
    "son dakika",
    "güncel",
    "en son",
    "hava durumu",
    "hava nasıl",
    "kaç tl",
    "kaç lira",
    "dolar",
    "euro",
    "kur",
    "borsa",
    "skor",
    "maç",
    "seçim",
    "deprem",
    "fiyat",
    "saat kaçta",
    // English
    "today",
    "now",
    "latest",
    "current",
    "breaking",
    "score",
    "weather",
    "price",
    "exchange rate",
    "election",
    "earthquake",
];

pub struct FreshnessClassifier {
    keywords: Vec<String>,
    model: String,
    timeout: Duration,
}

impl FreshnessClassifier {
    /// Build a classifier around the cheap `model`, merging `extra_keywords`
    /// into the built-in marker set.
    pub fn new(model: String, timeout: Duration, extra_keywords: &[String]) -> Self {
        let mut keywords: Vec<String> = DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect();
        keywords.extend(extra_keywords.iter().map(|s| s.trim().to_lowercase()));
        keywords.retain(|k| !k.is_empty());
        Self {
            keywords,
            model,
            timeout,
        }
    }

    /// Fast path: does the question contain any configured marker?
    pub fn matches_keyword(&self, question: &str) -> bool {
        let lowered = question.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }

    /// Full decision. A keyword hit short-circuits without touching the
    /// model; otherwise one constrained completion decides, and any failure
    /// defaults to `false`.
    pub async fn needs_live_data(&self, llm: &dyn LlmClient, question: &str) -> bool {
        if self.matches_keyword(question) {
            tracing::debug!("freshness.keyword_hit");
            return true;
        }

        let prompt = ChatPrompt::new(format!("Soru: {question}"))
            .with_system(CLASSIFIER_SYSTEM_PROMPT)
            .with_max_tokens(4)
            .with_temperature(0.0)
            .with_timeout(self.timeout);

        match llm.complete(&self.model, &prompt).await {
            Ok(resp) => {
                let verdict = resp.text.trim().to_uppercase().starts_with('E');
                tracing::debug!(verdict, raw = %resp.text.trim(), "freshness.model_verdict");
                verdict
            }
            Err(e) => {
                tracing::warn!(error = %e, "freshness.model_failed_defaulting_to_no_web");
                false
            }
        }
    }
}
