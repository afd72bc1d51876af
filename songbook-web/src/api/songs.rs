//! Song CRUD API
//!
//! Listing supports case-insensitive substring search over title, artist,
//! and lyrics, tag filters, and title/created-at sorting. Creation runs the
//! duplicate detector first and withholds the insert behind a 409 unless the
//! caller sets the override flag.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use songbook_common::db::{
    self, Song, SongFilter, SongLanguage, SongUpdate, SortKey, SortOrder,
};

use crate::dedup::{find_duplicates, DUPLICATE_DISTANCE_THRESHOLD};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for song listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub choir_only: bool,
    #[serde(default)]
    pub christmas_only: bool,
    /// "title" (default) or "createdAt"
    pub sort: Option<String>,
    /// "asc" (default) or "desc"
    pub order: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> ApiResult<SongFilter> {
        let sort = match self.sort.as_deref() {
            None | Some("title") => SortKey::Title,
            Some("createdAt") | Some("created_at") => SortKey::CreatedAt,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("Unknown sort key: {}", other)))
            }
        };
        let order = match self.order.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("Unknown sort order: {}", other)))
            }
        };

        Ok(SongFilter {
            search: self.search,
            choir_only: self.choir_only,
            christmas_only: self.christmas_only,
            sort: Some(sort),
            order: Some(order),
        })
    }
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let filter = query.into_filter()?;
    let songs = db::songs::list_songs(&state.db, &filter).await?;
    Ok(Json(songs))
}

/// Create request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: String,
    pub language: Option<SongLanguage>,
    #[serde(default)]
    pub is_christmas_song: bool,
    /// Skip the duplicate check (the UI's confirm-and-override path)
    #[serde(default)]
    pub force: bool,
}

/// POST /api/songs
///
/// 201 with the stored song, 400 on empty title/lyrics, 409 with the
/// duplicate list when near-duplicate titles exist and `force` is not set.
pub async fn create_song(
    State(state): State<AppState>,
    Json(request): Json<CreateSongRequest>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }
    if request.lyrics.trim().is_empty() {
        return Err(ApiError::BadRequest("Lyrics are required".to_string()));
    }

    if !request.force {
        let existing = db::songs::list_songs(&state.db, &SongFilter::default()).await?;
        let duplicates = find_duplicates(&request.title, &existing, DUPLICATE_DISTANCE_THRESHOLD);
        if !duplicates.is_empty() {
            info!(
                "Withholding create of {:?}: {} near-duplicate title(s)",
                request.title,
                duplicates.len()
            );
            return Err(ApiError::Duplicate(
                duplicates.into_iter().cloned().collect(),
            ));
        }
    }

    let artist = request
        .artist
        .filter(|a| !a.trim().is_empty());
    let mut song = Song::new(
        request.title.trim().to_string(),
        artist,
        request.lyrics,
        request.language.unwrap_or_default(),
    );
    song.is_christmas_song = request.is_christmas_song;
    db::songs::insert_song(&state.db, &song).await?;

    let stored = db::songs::get_song(&state.db, song.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Song vanished after insert".to_string()))?;

    info!("Created song {} ({:?})", stored.id, stored.title);
    Ok((StatusCode::CREATED, Json(stored)))
}

/// PUT /api/songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<SongUpdate>,
) -> ApiResult<Json<Song>> {
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if update.lyrics.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(ApiError::BadRequest("Lyrics cannot be empty".to_string()));
    }

    let song = db::songs::update_song(&state.db, id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {} not found", id)))?;

    Ok(Json(song))
}

/// Choir tag request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoirRequest {
    pub is_choir_practice: bool,
}

/// PUT /api/songs/:id/choir
///
/// Sets or clears the choir-practice tag without touching anything else.
pub async fn set_choir_practice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChoirRequest>,
) -> ApiResult<Json<Song>> {
    let song = db::songs::set_choir_practice(&state.db, id, request.is_choir_practice)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {} not found", id)))?;

    Ok(Json(song))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let deleted = db::songs::delete_song(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Song {} not found", id)));
    }

    info!("Deleted song {}", id);
    Ok(Json(json!({ "message": "Song deleted successfully" })))
}

/// DELETE /api/songs
pub async fn delete_all_songs(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = db::songs::delete_all_songs(&state.db).await?;

    info!("Deleted all songs ({} rows)", count);
    Ok(Json(json!({
        "message": "All songs deleted successfully",
        "count": count,
    })))
}
