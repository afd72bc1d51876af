//! Image attachment upload
//!
//! Multipart POST with an `image` file part and a `songId` text part. The
//! file lands under the uploads directory and the song's `imageUrl` points
//! at the `/uploads/...` path served back by `ServeDir`.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

use songbook_common::db;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/upload
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut song_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field
                    .file_name()
                    .map(sanitize_file_name)
                    .unwrap_or_else(|| "image".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                image = Some((file_name, bytes.to_vec()));
            }
            Some("songId") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read songId: {}", e)))?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| ApiError::BadRequest(format!("Invalid song id: {}", text)))?;
                song_id = Some(id);
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        image.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let song_id = song_id.ok_or_else(|| ApiError::BadRequest("Song ID is required".to_string()))?;

    // The song must exist before anything is written to disk
    db::songs::get_song(&state.db, song_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {} not found", song_id)))?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let stored_name = format!("{}-{}-{}", song_id, millis, file_name);

    tokio::fs::create_dir_all(&state.uploads_dir).await?;
    tokio::fs::write(state.uploads_dir.join(&stored_name), &bytes).await?;

    let image_url = format!("/uploads/{}", stored_name);
    db::songs::set_image_url(&state.db, song_id, &image_url).await?;

    info!("Stored image for song {} at {}", song_id, image_url);
    Ok(Json(json!({
        "message": "File uploaded successfully",
        "imageUrl": image_url,
    })))
}

/// Strip any path components and characters that do not belong in a stored
/// file name
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}
