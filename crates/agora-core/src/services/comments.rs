//! Comment service - listing, threading, replies and votes.

use std::sync::Arc;

use chrono::Utc;

use super::flags::{FlagList, SAVED_COMMENTS_KEY};
use crate::domain::{Comment, CommentDraft, Post, Votable, VoteDirection};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, LocalStore, PostRepository, Record};
use crate::thread::{CommentNode, build_thread};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    saved: FlagList,
}

fn not_found(id: i64) -> DomainError {
    DomainError::not_found(Comment::ENTITY, id)
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            comments,
            posts,
            saved: FlagList::new(local, SAVED_COMMENTS_KEY),
        }
    }

    /// Comments of a post, oldest first.
    pub async fn by_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let mut comments = self.comments.find_by_post(post_id).await?;
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    /// Reply forest of a post.
    pub async fn thread(&self, post_id: i64) -> Result<Vec<CommentNode>, DomainError> {
        let comments = self.by_post(post_id).await?;
        Ok(build_thread(comments))
    }

    pub async fn get(&self, id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Add a comment or reply and bump the post's comment count.
    pub async fn create(&self, draft: CommentDraft) -> Result<Comment, DomainError> {
        if self.posts.find_by_id(draft.post_id).await?.is_none() {
            return Err(DomainError::not_found(Post::ENTITY, draft.post_id));
        }

        let parent = match draft.parent_id {
            Some(parent_id) => {
                let parent = self.get(parent_id).await?;
                if parent.post_id != draft.post_id {
                    return Err(DomainError::validation(
                        "Parent comment belongs to a different post",
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let comment = Comment::reply(draft, parent.as_ref(), Utc::now())?;
        let comment = self.comments.insert(comment).await?;

        self.posts
            .modify(
                comment.post_id,
                Box::new(|post: &mut Post| {
                    post.comment_count += 1;
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(
            comment_id = comment.id,
            post_id = comment.post_id,
            depth = comment.depth,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn edit(&self, id: i64, body: String) -> Result<Comment, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("Comment cannot be empty"));
        }
        self.mutate(id, move |comment| {
            comment.body = body;
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let comment = self.get(id).await?;
        match self.comments.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(not_found(id)),
            Err(e) => return Err(e.into()),
        }

        self.posts
            .modify(
                comment.post_id,
                Box::new(|post: &mut Post| {
                    post.comment_count = post.comment_count.saturating_sub(1);
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(comment_id = id, "Comment deleted");
        Ok(())
    }

    pub async fn vote(&self, id: i64, direction: VoteDirection) -> Result<Comment, DomainError> {
        self.mutate(id, move |comment| {
            comment.tally_mut().cast(direction);
            Ok(())
        })
        .await
    }

    pub async fn like(&self, id: i64) -> Result<Comment, DomainError> {
        self.mutate(id, |comment| {
            comment.like_state_mut().toggle();
            Ok(())
        })
        .await
    }

    pub async fn save(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        self.saved.add(id).await?;
        Ok(())
    }

    pub async fn unsave(&self, id: i64) -> Result<(), DomainError> {
        self.saved.remove(&id).await?;
        Ok(())
    }

    pub async fn is_saved(&self, id: i64) -> bool {
        self.saved.contains(&id).await
    }

    pub async fn saved(&self) -> Result<Vec<Comment>, DomainError> {
        let ids = self.saved.load().await;
        let mut comments = self.comments.find_all().await?;
        comments.retain(|comment| ids.contains(&comment.id));
        Ok(comments)
    }

    async fn mutate<F>(&self, id: i64, change: F) -> Result<Comment, DomainError>
    where
        F: FnOnce(&mut Comment) -> Result<(), DomainError> + Send + 'static,
    {
        self.comments
            .modify(id, Box::new(change))
            .await?
            .ok_or_else(|| not_found(id))
    }
}
