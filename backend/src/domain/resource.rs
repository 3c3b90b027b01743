//! Educational resources: articles, videos, podcasts, ebooks, tools.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Media type of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Video,
    Article,
    Podcast,
    Ebook,
    Tool,
}

impl ResourceKind {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Article => "article",
            Self::Podcast => "podcast",
            Self::Ebook => "ebook",
            Self::Tool => "tool",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "article" => Ok(Self::Article),
            "podcast" => Ok(Self::Podcast),
            "ebook" => Ok(Self::Ebook),
            "tool" => Ok(Self::Tool),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// A published educational content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: String,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Free-form duration label such as `"12:30"` or `"3 min read"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub kind: ResourceKind,
    pub rating: f64,
    pub reviews_count: i32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: String,
    pub featured: bool,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub kind: ResourceKind,
}

/// Partial update for a resource.
#[derive(Debug, Clone, Default)]
pub struct ResourcePatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub thumbnail_url: Option<Option<String>>,
    pub duration: Option<Option<String>>,
    pub kind: Option<ResourceKind>,
}

/// List filter for resource queries.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub category: Option<String>,
    pub kind: Option<ResourceKind>,
    pub featured_only: bool,
    pub tag: Option<String>,
    /// Case-insensitive substring match over title, description and author.
    pub search: Option<String>,
}
