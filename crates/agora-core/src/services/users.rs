//! User-facing account actions: karma and the viewer's block list.

use std::sync::Arc;

use super::flags::{BLOCKED_USERS_KEY, FlagList};
use crate::domain;
use crate::error::DomainError;
use crate::ports::{CommentRepository, LocalStore, PostRepository};

pub struct UserService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    blocked: FlagList<String>,
    viewer: String,
}

/// Block-list form of a handle: trimmed and lower-cased.
pub(crate) fn handle_key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl UserService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        local: Arc<dyn LocalStore>,
        viewer: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            comments,
            blocked: FlagList::new(local, BLOCKED_USERS_KEY),
            viewer: viewer.into(),
        }
    }

    /// Karma of `author` across everything they posted or commented.
    pub async fn karma(&self, author: &str) -> Result<i64, DomainError> {
        let authored_posts = self.posts.find_by_author(author).await?;
        let authored_comments = self.comments.find_by_author(author).await?;
        Ok(domain::karma(author, &authored_posts, &authored_comments))
    }

    pub async fn blocked(&self) -> Vec<String> {
        self.blocked.load().await
    }

    pub async fn is_blocked(&self, username: &str) -> bool {
        self.blocked.contains(&handle_key(username)).await
    }

    /// Block `username`; returns false when they were already blocked.
    pub async fn block(&self, username: &str) -> Result<bool, DomainError> {
        let key = handle_key(username);
        if key.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        if key == handle_key(&self.viewer) {
            return Err(DomainError::validation("You can't block yourself"));
        }

        let added = self.blocked.add(key.clone()).await?;
        if added {
            tracing::info!(username = %key, "User blocked");
        }
        Ok(added)
    }

    /// Unblock `username`; returns false when they weren't blocked.
    pub async fn unblock(&self, username: &str) -> Result<bool, DomainError> {
        self.blocked.remove(&handle_key(username)).await
    }
}
