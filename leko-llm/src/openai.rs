use crate::traits::{ChatPrompt, LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use leko_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};

/// Client for the OpenAI chat-completions API.
///
/// One instance serves every model in the chain; the model identifier is
/// supplied per call so the fallback loop can walk the chain without
/// rebuilding clients.
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a new client for the given API key and endpoint base.
    pub fn new(api_key: String, endpoint: &str) -> Result<Self, LlmError> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| LlmError::Config(format!("HttpClient init failed: {e}")))?;

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        model: &str,
        prompt: &ChatPrompt,
    ) -> Result<LlmResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });

        let req = ChatCompletionRequest {
            model,
            messages,
            max_tokens: prompt.max_tokens,
            temperature: prompt.temperature,
        };

        tracing::debug!(
            model,
            prompt_len = prompt.user.len(),
            has_system = prompt.system.is_some(),
            "openai.chat.request"
        );

        let resp: ChatCompletionResponse = self
            .client
            .post_json(
                "v1/chat/completions",
                &req,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.api_key)),
                    timeout: prompt.timeout,
                    // The model chain is the retry policy at this layer.
                    retries: Some(0),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| http_to_llm(model, e))?;

        let text = resp
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| LlmError::EmptyCompletion(model.to_string()))?;

        Ok(LlmResponse {
            text,
            model: resp.model,
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }
}

fn http_to_llm(model: &str, e: HttpError) -> LlmError {
    match e {
        HttpError::Network(msg) => LlmError::Network(format!("{model}: {msg}")),
        other => LlmError::Api(format!("{model}: {other}")),
    }
}
