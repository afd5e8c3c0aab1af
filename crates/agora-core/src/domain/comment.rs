use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vote::{LikeState, Votable, VoteTally};
use crate::error::DomainError;

/// Deepest nesting level at which a reply action is still offered.
pub const MAX_COMMENT_DEPTH: u8 = 2;

/// Comment entity - a reply to a post or to another comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub author: String,
    pub body: String,
    pub votes: VoteTally,
    #[serde(default)]
    pub likes: LikeState,
    #[serde(default)]
    pub depth: u8,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Input for a new comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub body: String,
}

impl Comment {
    /// Build a comment replying to `parent` (or to the post when `None`).
    pub fn reply(
        draft: CommentDraft,
        parent: Option<&Comment>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if draft.body.trim().is_empty() {
            return Err(DomainError::validation("Comment cannot be empty"));
        }
        if draft.author.trim().is_empty() {
            return Err(DomainError::validation("Author is required"));
        }

        Ok(Self {
            id: 0,
            post_id: draft.post_id,
            parent_id: parent.map(|p| p.id),
            author: draft.author,
            body: draft.body,
            votes: VoteTally::authored(),
            likes: LikeState::default(),
            depth: Self::depth_below(parent),
            created_at: now,
        })
    }

    /// Depth of a reply to `parent`: one below it, clamped to the cap.
    pub fn depth_below(parent: Option<&Comment>) -> u8 {
        parent.map_or(0, |p| p.depth.saturating_add(1).min(MAX_COMMENT_DEPTH))
    }

    pub fn score(&self) -> i64 {
        self.votes.score()
    }
}

impl Votable for Comment {
    fn tally(&self) -> &VoteTally {
        &self.votes
    }

    fn tally_mut(&mut self) -> &mut VoteTally {
        &mut self.votes
    }

    fn like_state_mut(&mut self) -> &mut LikeState {
        &mut self.likes
    }
}
