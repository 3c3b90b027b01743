//! Curated reading lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One ordered entry in a reading list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListItem {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    /// Zero-based position within the list.
    #[serde(rename = "order")]
    pub position: i32,
}

/// A curated list of titles, served with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingList {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    pub books: Vec<ReadingListItem>,
    pub book_count: i32,
}

/// Payload for creating a reading list; `books` become ordered items.
#[derive(Debug, Clone)]
pub struct NewReadingList {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub books: Vec<String>,
}

/// Partial update for a reading list. A provided `books` list replaces all
/// items, re-ordered from zero.
#[derive(Debug, Clone, Default)]
pub struct ReadingListPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<Option<String>>,
    pub books: Option<Vec<String>>,
}

/// List filter for reading-list queries.
#[derive(Debug, Clone, Default)]
pub struct ReadingListFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
}
