//! Boots the real router on an ephemeral port and drives it with reqwest,
//! with wiremock standing in for the completion and search providers.

use std::net::SocketAddr;
use std::sync::Arc;

use leko_api::state::AppState;
use leko_config::LekoConfigLoader;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_app(yaml: &str) -> SocketAddr {
    let cfg = LekoConfigLoader::new().with_yaml_str(yaml).load().unwrap();
    let state = Arc::new(AppState::from_config(&cfg).unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = leko_api::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn completion_body(content: &str) -> Value {
    json!({
        "model": "mock",
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let addr = spawn_app("openai:\n  api_key: \"sk-test\"\n").await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_completion_credential_is_a_structured_500() {
    let addr = spawn_app("server:\n  listen: \"127.0.0.1:0\"\n").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/ask"))
        .json(&json!({"text": "Merhaba"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"error": "OPENAI_API_KEY_NOT_FOUND"}));
}

#[tokio::test]
async fn empty_question_gets_the_soft_reprompt() {
    let addr = spawn_app("openai:\n  api_key: \"sk-test\"\n").await;

    let client = reqwest::Client::new();
    for body in [json!({"text": ""}), json!({})] {
        let resp = client
            .post(format!("http://{addr}/ask"))
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let reply: Value = resp.json().await.unwrap();
        assert_eq!(
            reply,
            json!({"answer": "Bir soru sorabilir misin?", "used_web": false})
        );
    }
}

#[tokio::test]
async fn fresh_question_flows_through_search_and_generation() {
    let openai = MockServer::start().await;
    let google = MockServer::start().await;

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
        .mount(&google)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Dolar şu anda yaklaşık 41 lira.",
        )))
        .expect(1)
        .mount(&openai)
        .await;

    let yaml = format!(
        r#"
openai:
  api_key: "sk-test"
  endpoint: "{}"
  model_chain: ["gpt-4o"]
search:
  api_key: "g-key"
  engine_id: "cse-id"
  endpoint: "{}"
"#,
        openai.uri(),
        google.uri()
    );
    let addr = spawn_app(&yaml).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/ask"))
        .json(&json!({"text": "Dolar kuru ne kadar?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let reply: Value = resp.json().await.unwrap();
    assert_eq!(reply["answer"], "Dolar şu anda yaklaşık 41 lira.");
    assert_eq!(reply["used_web"], true);
}

#[tokio::test]
async fn provider_outage_still_returns_a_usable_answer() {
    let openai = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&openai)
        .await;

    let yaml = format!(
        "openai:\n  api_key: \"sk-test\"\n  endpoint: \"{}\"\n",
        openai.uri()
    );
    let addr = spawn_app(&yaml).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/ask"))
        .json(&json!({"text": "Balinalar memeli midir?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let reply: Value = resp.json().await.unwrap();
    assert_eq!(
        reply["answer"],
        "Üzgünüm, şu anda cevap veremiyorum. Biraz sonra tekrar sorar mısın?"
    );
}

#[tokio::test]
async fn command_queue_round_trip_with_secret() {
    let addr = spawn_app("openai:\n  api_key: \"sk-test\"\nsecret: \"hush\"\n").await;
    let client = reqwest::Client::new();
    let command = json!({"robot_id": "leko-1", "type": "say", "text": "merhaba"});

    // Missing secret → 401 with the structured body.
    let resp = client
        .post(format!("http://{addr}/command"))
        .json(&command)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"error": "UNAUTHORIZED"}));

    // With the secret the command is queued...
    let resp = client
        .post(format!("http://{addr}/command"))
        .header("X-LEKO-SECRET", "hush")
        .json(&command)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"queued": true, "pending": 1}));

    // ...popped oldest-first with the server-side timestamp attached...
    let popped: Value = client
        .get(format!("http://{addr}/command/next"))
        .header("X-LEKO-SECRET", "hush")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(popped["robot_id"], "leko-1");
    assert_eq!(popped["type"], "say");
    assert!(popped["queued_at"].is_string());

    // ...and an empty queue answers null.
    let empty: Value = client
        .get(format!("http://{addr}/command/next"))
        .header("X-LEKO-SECRET", "hush")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_null());
}

#[tokio::test]
async fn command_with_missing_fields_is_a_structural_400() {
    let addr = spawn_app("openai:\n  api_key: \"sk-test\"\n").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/command"))
        .json(&json!({"robot_id": "leko-1"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["detail"], "type is required");
}

#[tokio::test]
async fn vision_upload_is_acknowledged_without_inference() {
    let addr = spawn_app("openai:\n  api_key: \"sk-test\"\n").await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .part(
            "image",
            reqwest::multipart::Part::bytes(vec![0u8; 1024]).file_name("kedi.jpg"),
        )
        .text("robot_id", "leko-1")
        .text("question", "Bu ne?");

    let resp = client
        .post(format!("http://{addr}/vision"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["received"], true);
    assert_eq!(body["filename"], "kedi.jpg");
    assert_eq!(body["size_bytes"], 1024);
    assert_eq!(body["robot_id"], "leko-1");

    // Without the image part the request is rejected up front.
    let resp = client
        .post(format!("http://{addr}/vision"))
        .multipart(reqwest::multipart::Form::new().text("robot_id", "leko-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
