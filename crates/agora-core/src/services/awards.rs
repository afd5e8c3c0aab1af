//! Award service - catalog lookups and grants to posts and comments.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{AwardGrant, AwardKind, AwardTarget, Comment, Post};
use crate::error::{DomainError, RepoError};
use crate::ports::{AwardRepository, CommentRepository, PostRepository, Record};

pub struct AwardService {
    catalog: Vec<AwardKind>,
    grants: Arc<dyn AwardRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl AwardService {
    pub fn new(
        catalog: Vec<AwardKind>,
        grants: Arc<dyn AwardRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            catalog,
            grants,
            posts,
            comments,
        }
    }

    pub fn catalog(&self) -> &[AwardKind] {
        &self.catalog
    }

    pub fn kind(&self, award_id: i64) -> Option<&AwardKind> {
        self.catalog.iter().find(|kind| kind.id == award_id)
    }

    /// Give award `award_id` to `target` on behalf of `given_by`.
    pub async fn grant(
        &self,
        target: AwardTarget,
        award_id: i64,
        given_by: &str,
    ) -> Result<AwardGrant, DomainError> {
        if self.kind(award_id).is_none() {
            return Err(DomainError::not_found("Award type", award_id));
        }
        self.ensure_target_exists(target).await?;

        let grant = AwardGrant {
            id: 0,
            award_id,
            target,
            given_by: given_by.to_string(),
            created_at: Utc::now(),
        };
        let grant = self.grants.insert(grant).await?;
        tracing::info!(grant_id = grant.id, award_id, target = ?target, "Award granted");
        Ok(grant)
    }

    pub async fn grants_for(&self, target: AwardTarget) -> Result<Vec<AwardGrant>, DomainError> {
        Ok(self.grants.find_by_target(target).await?)
    }

    /// How many times `award_id` was given to `target`.
    pub async fn count(&self, target: AwardTarget, award_id: i64) -> Result<usize, DomainError> {
        let grants = self.grants.find_by_target(target).await?;
        Ok(grants.iter().filter(|g| g.award_id == award_id).count())
    }

    pub async fn revoke(&self, grant_id: i64) -> Result<(), DomainError> {
        match self.grants.delete(grant_id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(DomainError::not_found(AwardGrant::ENTITY, grant_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_target_exists(&self, target: AwardTarget) -> Result<(), DomainError> {
        let exists = match target {
            AwardTarget::Post(id) => self.posts.find_by_id(id).await?.is_some(),
            AwardTarget::Comment(id) => self.comments.find_by_id(id).await?.is_some(),
        };
        if exists {
            return Ok(());
        }
        Err(match target {
            AwardTarget::Post(id) => DomainError::not_found(Post::ENTITY, id),
            AwardTarget::Comment(id) => DomainError::not_found(Comment::ENTITY, id),
        })
    }
}
