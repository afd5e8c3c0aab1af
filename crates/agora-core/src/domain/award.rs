use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog entry describing a kind of award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardKind {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cost: u32,
}

/// What an award was given to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum AwardTarget {
    Post(i64),
    Comment(i64),
}

/// A single award given to a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardGrant {
    pub id: i64,
    pub award_id: i64,
    pub target: AwardTarget,
    pub given_by: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
