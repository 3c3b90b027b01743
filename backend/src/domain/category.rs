//! Categories used to organise resources and reading lists.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A display category with icon and colour hints for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub count: i32,
}

/// Payload for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: String,
    pub icon: String,
    pub color: String,
    pub count: i32,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub count: Option<i32>,
}
