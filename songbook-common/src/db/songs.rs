//! Song database operations
//!
//! CRUD queries over the `songs` table. All filtering and sorting offered by
//! the listing API happens here in SQL.

use crate::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Song language classification (fixed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SongLanguage {
    Telugu,
    English,
    Hindi,
    Other,
}

impl SongLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongLanguage::Telugu => "Telugu",
            SongLanguage::English => "English",
            SongLanguage::Hindi => "Hindi",
            SongLanguage::Other => "Other",
        }
    }

    /// Parse a stored value; unknown values fall back to Other
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "Telugu" => SongLanguage::Telugu,
            "English" => SongLanguage::English,
            "Hindi" => SongLanguage::Hindi,
            _ => SongLanguage::Other,
        }
    }
}

impl Default for SongLanguage {
    fn default() -> Self {
        SongLanguage::Other
    }
}

/// Song record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: Option<String>,
    pub language: SongLanguage,
    pub lyrics: String,
    pub is_choir_practice: bool,
    pub is_christmas_song: bool,
    pub is_new: bool,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Song {
    /// Create a new song record; the store fills in the timestamps on insert
    pub fn new(
        title: String,
        artist: Option<String>,
        lyrics: String,
        language: SongLanguage,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            artist,
            language,
            lyrics,
            is_choir_practice: false,
            is_christmas_song: false,
            is_new: true,
            image_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Sort column for song listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    CreatedAt,
}

/// Sort direction for song listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Listing filter: substring search plus tag filters
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    /// Case-insensitive substring match over title, artist, and lyrics
    pub search: Option<String>,
    pub choir_only: bool,
    pub christmas_only: bool,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
}

/// Insert a song; timestamps are assigned by the store
pub async fn insert_song(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (
            id, title, artist, language, lyrics,
            is_choir_practice, is_christmas_song, is_new, image_url,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(song.id.to_string())
    .bind(&song.title)
    .bind(&song.artist)
    .bind(song.language.as_str())
    .bind(&song.lyrics)
    .bind(song.is_choir_practice)
    .bind(song.is_christmas_song)
    .bind(song.is_new)
    .bind(&song.image_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a single song by id
pub async fn get_song(pool: &SqlitePool, id: Uuid) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("SELECT {} FROM songs WHERE id = ?", COLUMNS))
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(song_from_row).transpose()
}

/// List songs with optional search, tag filters, and sorting
pub async fn list_songs(pool: &SqlitePool, filter: &SongFilter) -> Result<Vec<Song>> {
    let mut sql = format!("SELECT {} FROM songs", COLUMNS);
    let mut clauses: Vec<&str> = Vec::new();

    let search_pattern = filter
        .search
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("%{}%", escape_like(&s.trim().to_lowercase())));

    if search_pattern.is_some() {
        clauses.push(
            "(lower(title) LIKE ? ESCAPE '\\' OR lower(coalesce(artist, '')) LIKE ? ESCAPE '\\' \
             OR lower(lyrics) LIKE ? ESCAPE '\\')",
        );
    }
    if filter.choir_only {
        clauses.push("is_choir_practice = 1");
    }
    if filter.christmas_only {
        clauses.push("is_christmas_song = 1");
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    let order = match filter.order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    match filter.sort.unwrap_or(SortKey::Title) {
        SortKey::Title => {
            sql.push_str(&format!(" ORDER BY title COLLATE NOCASE {}", order));
        }
        SortKey::CreatedAt => {
            sql.push_str(&format!(" ORDER BY created_at {}, title COLLATE NOCASE ASC", order));
        }
    }

    let mut query = sqlx::query(&sql);
    if let Some(pattern) = &search_pattern {
        query = query.bind(pattern).bind(pattern).bind(pattern);
    }

    let rows = query.fetch_all(pool).await?;
    rows.into_iter().map(song_from_row).collect()
}

/// Partial update for an existing song
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongUpdate {
    pub title: Option<String>,
    /// `Some("")` clears the artist
    pub artist: Option<String>,
    pub lyrics: Option<String>,
    pub language: Option<SongLanguage>,
    pub is_choir_practice: Option<bool>,
    pub is_christmas_song: Option<bool>,
}

/// Apply a partial update. Clears the `is_new` flag and refreshes
/// `updated_at`. Returns the updated row, or None if the song is missing.
pub async fn update_song(
    pool: &SqlitePool,
    id: Uuid,
    update: &SongUpdate,
) -> Result<Option<Song>> {
    let Some(existing) = get_song(pool, id).await? else {
        return Ok(None);
    };

    let title = update.title.clone().unwrap_or(existing.title);
    let artist = match &update.artist {
        Some(a) if a.trim().is_empty() => None,
        Some(a) => Some(a.clone()),
        None => existing.artist,
    };
    let lyrics = update.lyrics.clone().unwrap_or(existing.lyrics);
    let language = update.language.unwrap_or(existing.language);
    let is_choir_practice = update.is_choir_practice.unwrap_or(existing.is_choir_practice);
    let is_christmas_song = update.is_christmas_song.unwrap_or(existing.is_christmas_song);

    sqlx::query(
        r#"
        UPDATE songs SET
            title = ?, artist = ?, lyrics = ?, language = ?,
            is_choir_practice = ?, is_christmas_song = ?,
            is_new = 0, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&title)
    .bind(&artist)
    .bind(&lyrics)
    .bind(language.as_str())
    .bind(is_choir_practice)
    .bind(is_christmas_song)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    get_song(pool, id).await
}

/// Set or clear the choir-practice tag only
pub async fn set_choir_practice(
    pool: &SqlitePool,
    id: Uuid,
    is_choir_practice: bool,
) -> Result<Option<Song>> {
    let result = sqlx::query(
        "UPDATE songs SET is_choir_practice = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(is_choir_practice)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_song(pool, id).await
}

/// Record the image attachment URL for a song
pub async fn set_image_url(pool: &SqlitePool, id: Uuid, image_url: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE songs SET image_url = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(image_url)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete one song. Returns false if it did not exist.
pub async fn delete_song(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every song. Returns the number of rows removed.
pub async fn delete_all_songs(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM songs").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Escape LIKE wildcards so a search term matches itself literally
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

const COLUMNS: &str = "id, title, artist, language, lyrics, is_choir_practice, \
                       is_christmas_song, is_new, image_url, created_at, updated_at";

fn song_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Song> {
    let id_str: String = row.get("id");
    let language_str: String = row.get("language");

    Ok(Song {
        id: Uuid::parse_str(&id_str).map_err(|e| crate::Error::Internal(e.to_string()))?,
        title: row.get("title"),
        artist: row.get("artist"),
        language: SongLanguage::from_str_lossy(&language_str),
        lyrics: row.get("lyrics"),
        is_choir_practice: row.get("is_choir_practice"),
        is_christmas_song: row.get("is_christmas_song"),
        is_new: row.get("is_new"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
