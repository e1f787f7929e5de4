//! Command-queue endpoints for the robot body.
//!
//! `POST /command` appends to the in-memory FIFO, `GET /command/next` pops
//! the oldest entry or returns `null`. Both check the `X-LEKO-SECRET`
//! header when a secret is configured.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, RobotCommand};

pub const SECRET_HEADER: &str = "x-leko-secret";

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    #[serde(default)]
    pub robot_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub queued: bool,
    pub pending: usize,
}

/// Handler: POST /command
pub async fn enqueue_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<Json<EnqueueResponse>> {
    require_secret(&state, &headers)?;
    let Json(body) = body?;

    let robot_id = required_field(body.robot_id, "robot_id")?;
    let kind = required_field(body.kind, "type")?;
    let text = required_field(body.text, "text")?;

    let command = RobotCommand {
        robot_id,
        kind,
        text,
        queued_at: Utc::now(),
    };

    let pending = {
        let mut queue = state.command_queue();
        queue.push_back(command);
        queue.len()
    };

    tracing::info!(pending, "command.enqueued");
    Ok(Json(EnqueueResponse {
        queued: true,
        pending,
    }))
}

/// Handler: GET /command/next
pub async fn next_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Option<RobotCommand>>> {
    require_secret(&state, &headers)?;

    let command = state.command_queue().pop_front();
    if let Some(cmd) = &command {
        tracing::info!(robot_id = %cmd.robot_id, kind = %cmd.kind, "command.dequeued");
    }
    Ok(Json(command))
}

fn required_field(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

fn require_secret(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.secret.as_deref() else {
        return Ok(());
    };

    let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
