//! POST /ask, the question-answering endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use leko_answer::Reply;
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Handler: POST /ask
///
/// A missing or malformed body counts as an empty question and gets the
/// soft re-prompt, keeping the child-facing UX uninterrupted. The hard
/// failures are an unconfigured completion credential and anything
/// unexpected escaping the pipeline task; both come back as structured
/// errors, never as raw text in the answer field.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/ask \
///   -H 'content-type: application/json' \
///   -d '{"text":"Dolar kuru ne kadar?"}'
/// ```
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<Reply>> {
    let text = body.ok().and_then(|Json(req)| req.text);

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("ask", %request_id);

    // The pipeline itself absorbs provider failures; running it on its own
    // task additionally turns a panic into a structured 500.
    let task_state = state.clone();
    let reply = tokio::spawn(
        async move {
            match &task_state.pipeline {
                Some(pipeline) => Some(pipeline.answer(text.as_deref()).await),
                None => None,
            }
        }
        .instrument(span),
    )
    .await
    .map_err(|e| ApiError::Internal(format!("ask pipeline task failed: {e}")))?
    .ok_or(ApiError::MissingOpenAiKey)?;

    Ok(Json(reply))
}
