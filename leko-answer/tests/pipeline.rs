use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use leko_answer::pipeline::{
    APOLOGY_REPLY, EMPTY_QUESTION_REPLY, GENERAL_SYSTEM_PROMPT, GROUNDED_SYSTEM_PROMPT,
    NO_CLEAR_ANSWER_REPLY,
};
use leko_answer::{AnswerPipeline, FreshnessClassifier, PipelineConfig};
use leko_llm::{ChatPrompt, LlmClient, LlmError, LlmResponse};
use leko_web::GoogleSearchClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLASSIFIER_MODEL: &str = "cls";

/// Completion double: scripted text per model, everything else errors.
/// Every call is recorded so tests can assert on call counts and payloads.
#[derive(Default)]
struct ScriptedLlm {
    replies: HashMap<String, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[derive(Clone)]
struct RecordedCall {
    model: String,
    system: Option<String>,
    user: String,
}

impl ScriptedLlm {
    fn with_replies<const N: usize>(entries: [(&str, &str); N]) -> Arc<Self> {
        Arc::new(Self {
            replies: entries
                .into_iter()
                .map(|(m, t)| (m.to_string(), t.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_for(&self, model: &str) -> usize {
        self.calls().iter().filter(|c| c.model == model).count()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        model: &str,
        prompt: &ChatPrompt,
    ) -> Result<LlmResponse, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            system: prompt.system.clone(),
            user: prompt.user.clone(),
        });

        match self.replies.get(model) {
            Some(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some(model.to_string()),
                tokens_used: None,
            }),
            None => Err(LlmError::Api(format!("{model}: scripted failure"))),
        }
    }
}

fn make_pipeline(llm: Arc<ScriptedLlm>, search: Option<GoogleSearchClient>) -> AnswerPipeline {
    let classifier =
        FreshnessClassifier::new(CLASSIFIER_MODEL.into(), Duration::from_secs(5), &[]);
    AnswerPipeline::new(
        llm,
        search,
        classifier,
        PipelineConfig {
            model_chain: vec!["primary".into(), "backup".into()],
            result_count: 5,
            max_question_chars: 600,
            max_answer_chars: 900,
            generation_timeout: Duration::from_secs(15),
        },
    )
}

#[tokio::test]
async fn empty_question_is_a_soft_reprompt_with_no_provider_calls() {
    let llm = ScriptedLlm::with_replies([("primary", "cevap")]);
    let pipeline = make_pipeline(llm.clone(), None);

    for input in [None, Some(""), Some("   \n ")] {
        let reply = pipeline.answer(input).await;
        assert_eq!(reply.answer, EMPTY_QUESTION_REPLY);
        assert!(!reply.used_web);
    }
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn keyword_hit_skips_the_classifier_model() {
    let llm = ScriptedLlm::with_replies([
        ("primary", "Hava bugün güneşli görünüyor."),
        (CLASSIFIER_MODEL, "HAYIR"),
    ]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Bugün hava nasıl?")).await;

    assert!(reply.used_web);
    assert_eq!(reply.answer, "Hava bugün güneşli görünüyor.");
    // Fast-path invariant: the classifier model was never consulted.
    assert_eq!(llm.calls_for(CLASSIFIER_MODEL), 0);
    assert_eq!(llm.calls_for("primary"), 1);
}

#[tokio::test]
async fn model_judgement_decides_the_long_tail() {
    let llm = ScriptedLlm::with_replies([
        (CLASSIFIER_MODEL, "EVET"),
        ("primary", "Okullar eylülde açılıyor."),
    ]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Okullar ne zaman açılıyor?")).await;

    assert!(reply.used_web);
    assert_eq!(llm.calls_for(CLASSIFIER_MODEL), 1);

    let calls = llm.calls();
    let cls = calls.iter().find(|c| c.model == CLASSIFIER_MODEL).unwrap();
    assert!(cls.user.contains("Okullar ne zaman açılıyor?"));
}

#[tokio::test]
async fn classifier_failure_defaults_to_a_plain_answer() {
    // No scripted classifier reply: the judgement call errors out.
    let llm = ScriptedLlm::with_replies([("primary", "Aslanlar et yer.")]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Aslanlar ne yer?")).await;

    assert!(!reply.used_web);
    assert_eq!(reply.answer, "Aslanlar et yer.");

    let calls = llm.calls();
    let generation = calls.iter().find(|c| c.model == "primary").unwrap();
    assert_eq!(generation.system.as_deref(), Some(GENERAL_SYSTEM_PROMPT));
}

#[tokio::test]
async fn chain_falls_back_with_identical_payload() {
    let llm = ScriptedLlm::with_replies([
        (CLASSIFIER_MODEL, "HAYIR"),
        ("backup", "Yedek modelden cevap."),
    ]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Balinalar memeli midir?")).await;

    assert_eq!(reply.answer, "Yedek modelden cevap.");
    assert!(!reply.used_web);

    let calls = llm.calls();
    let primary = calls.iter().find(|c| c.model == "primary").unwrap();
    let backup = calls.iter().find(|c| c.model == "backup").unwrap();
    assert_eq!(primary.user, backup.user);
    assert_eq!(primary.system, backup.system);
}

#[tokio::test]
async fn exhausted_chain_becomes_the_fixed_apology() {
    let llm = ScriptedLlm::with_replies([(CLASSIFIER_MODEL, "HAYIR")]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Balinalar memeli midir?")).await;

    assert_eq!(reply.answer, APOLOGY_REPLY);
    assert_eq!(llm.calls_for("primary"), 1);
    assert_eq!(llm.calls_for("backup"), 1);
}

#[tokio::test]
async fn urls_never_reach_the_final_answer() {
    let llm = ScriptedLlm::with_replies([(
        "primary",
        "Dolar 41 lira, detay için https://ornek.com/kur adresine bak.",
    )]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("dolar kuru ne kadar?")).await;

    assert!(!reply.answer.contains("http"));
    assert!(!reply.answer.contains("ornek.com"));
    assert!(reply.answer.contains("41 lira"));
}

#[tokio::test]
async fn degenerate_output_is_replaced_with_the_fixed_phrase() {
    let llm = ScriptedLlm::with_replies([(CLASSIFIER_MODEL, "HAYIR"), ("primary", "2025.")]);
    let pipeline = make_pipeline(llm.clone(), None);

    let reply = pipeline.answer(Some("Balinalar memeli midir?")).await;
    assert_eq!(reply.answer, NO_CLEAR_ANSWER_REPLY);
}

#[tokio::test]
async fn fresh_question_is_grounded_by_one_search_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "title": "Dolar Kuru",
                "snippet": "Dolar 14.02.2025 itibarıyla 41 lira.",
                "link": "https://example.com/kur"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = GoogleSearchClient::new(
        "g-key".into(),
        "cse-id".into(),
        &server.uri(),
        "tr".into(),
        "tr".into(),
        Duration::from_secs(2),
    )
    .unwrap();

    let llm = ScriptedLlm::with_replies([("primary", "Dolar şu anda 41 lira.")]);
    let pipeline = make_pipeline(llm.clone(), Some(search));

    let reply = pipeline.answer(Some("Dolar kuru ne kadar?")).await;

    assert!(reply.used_web);
    assert_eq!(reply.answer, "Dolar şu anda 41 lira.");

    let calls = llm.calls();
    let generation = calls.iter().find(|c| c.model == "primary").unwrap();
    assert_eq!(generation.system.as_deref(), Some(GROUNDED_SYSTEM_PROMPT));
    assert!(generation.user.contains("Dolar Kuru"));
    assert!(generation.user.contains("Güncel bilgiler:"));
}

#[tokio::test]
async fn failed_search_still_produces_an_answer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let search = GoogleSearchClient::new(
        "g-key".into(),
        "cse-id".into(),
        &server.uri(),
        "tr".into(),
        "tr".into(),
        Duration::from_secs(2),
    )
    .unwrap();

    let llm = ScriptedLlm::with_replies([("primary", "Dolar yaklaşık 41 lira.")]);
    let pipeline = make_pipeline(llm.clone(), Some(search));

    let reply = pipeline.answer(Some("Dolar kuru ne kadar?")).await;

    assert_eq!(reply.answer, "Dolar yaklaşık 41 lira.");
    // Grounding was attempted; the reply still flags the web path.
    assert!(reply.used_web);

    let calls = llm.calls();
    let generation = calls.iter().find(|c| c.model == "primary").unwrap();
    assert!(!generation.user.contains("Güncel bilgiler:"));
}
