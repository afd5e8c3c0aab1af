use serde::{Deserialize, Serialize};

use super::{Comment, Post};
use crate::error::DomainError;

/// Categories offered before the user creates any of their own.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Reading List", "Favorites", "Later"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavedKind {
    Post,
    Comment,
}

impl SavedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

impl std::str::FromStr for SavedKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => Err(DomainError::validation(format!("unknown item type '{other}'"))),
        }
    }
}

/// A saved post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedItem {
    #[serde(rename = "type")]
    pub kind: SavedKind,
    pub id: i64,
}

impl SavedItem {
    pub fn post(id: i64) -> Self {
        Self {
            kind: SavedKind::Post,
            id,
        }
    }

    pub fn comment(id: i64) -> Self {
        Self {
            kind: SavedKind::Comment,
            id,
        }
    }

    /// Key of the item's category assignment, e.g. `post_4`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind.as_str(), self.id)
    }
}

/// Per-item result of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub id: i64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkOutcome {
    pub fn ok(id: i64) -> Self {
        Self {
            id,
            success: true,
            error: None,
        }
    }

    pub fn failed(id: i64, error: impl ToString) -> Self {
        Self {
            id,
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Everything the user saved, resolved to current records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedContent {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub total: usize,
}

impl SavedContent {
    pub fn new(posts: Vec<Post>, comments: Vec<Comment>) -> Self {
        let total = posts.len() + comments.len();
        Self {
            posts,
            comments,
            total,
        }
    }
}
