//! POST /vision, the image upload boundary.
//!
//! The image-understanding service is an external collaborator that is not
//! wired up; this endpoint validates the upload and reports what it
//! received so the robot side can be integrated end to end.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VisionResponse {
    pub received: bool,
    pub filename: String,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// Handler: POST /vision (multipart: `image` + optional `robot_id`, `question`)
pub async fn vision(
    State(_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<VisionResponse>> {
    let mut image: Option<(String, usize)> = None;
    let mut robot_id = None;
    let mut question = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().unwrap_or("image").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                image = Some((filename, data.len()));
            }
            Some("robot_id") => {
                robot_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            Some("question") => {
                question = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, size_bytes) =
        image.ok_or_else(|| ApiError::BadRequest("image field is required".into()))?;

    tracing::info!(%filename, size_bytes, "vision.upload_received");
    Ok(Json(VisionResponse {
        received: true,
        filename,
        size_bytes,
        robot_id,
        question,
    }))
}
