//! Community service - directory, lifecycle and activity figures.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Community, CommunityChanges, CommunityDraft, CommunityRule, Moderator};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommunityRepository, PostRepository, Record};
use crate::trending::{self, CommunityStats, RelatedCommunity, TrendingCommunity};

pub struct CommunityService {
    communities: Arc<dyn CommunityRepository>,
    posts: Arc<dyn PostRepository>,
}

fn not_found(name: &str) -> DomainError {
    DomainError::not_found(Community::ENTITY, name)
}

impl CommunityService {
    pub fn new(communities: Arc<dyn CommunityRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { communities, posts }
    }

    /// All communities, largest first.
    pub async fn list(&self) -> Result<Vec<Community>, DomainError> {
        let mut communities = self.communities.find_all().await?;
        communities.sort_by(|a, b| b.member_count.cmp(&a.member_count));
        Ok(communities)
    }

    pub async fn popular(&self, limit: usize) -> Result<Vec<Community>, DomainError> {
        let mut communities = self.list().await?;
        communities.truncate(limit);
        Ok(communities)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Community>, DomainError> {
        let mut communities = self.communities.find_all().await?;
        communities.retain(|c| c.matches(query));
        Ok(communities)
    }

    pub async fn get(&self, name: &str) -> Result<Community, DomainError> {
        self.communities
            .find_by_name(name)
            .await?
            .ok_or_else(|| not_found(name))
    }

    /// Whether `name` is free, ignoring case and surrounding whitespace.
    pub async fn is_name_available(&self, name: &str) -> Result<bool, DomainError> {
        Ok(self.communities.find_by_name(name.trim()).await?.is_none())
    }

    /// Create a community. The name check and the insert happen under one
    /// store lock, so two racing creates of the same name cannot both win.
    pub async fn create(&self, draft: CommunityDraft) -> Result<Community, DomainError> {
        let community = Community::found(draft, Utc::now())?;
        let name = community.name.clone();
        let Some(community) = self.communities.insert_unique(community).await? else {
            return Err(DomainError::Duplicate(format!("Community '{name}' already exists")));
        };
        tracing::info!(community = %community.name, id = community.id, "Community created");
        Ok(community)
    }

    pub async fn update(
        &self,
        name: &str,
        changes: CommunityChanges,
    ) -> Result<Community, DomainError> {
        let existing = self.get(name).await?;
        self.communities
            .modify(existing.id, Box::new(move |c: &mut Community| c.apply(changes)))
            .await?
            .ok_or_else(|| not_found(name))
    }

    pub async fn delete(&self, name: &str) -> Result<(), DomainError> {
        let existing = self.get(name).await?;
        match self.communities.delete(existing.id).await {
            Ok(()) => {
                tracing::info!(community = %existing.name, "Community deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(not_found(name)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn rules(&self, name: &str) -> Result<Vec<CommunityRule>, DomainError> {
        Ok(self.get(name).await?.rules)
    }

    pub async fn moderators(&self, name: &str) -> Result<Vec<Moderator>, DomainError> {
        Ok(self.get(name).await?.moderators)
    }

    /// The `limit` communities with the most activity over the past week.
    pub async fn trending(&self, limit: usize) -> Result<Vec<TrendingCommunity>, DomainError> {
        let communities = self.list().await?;
        let posts = self.posts.find_all().await?;
        Ok(trending::trending(&communities, &posts, Utc::now(), limit))
    }

    pub async fn stats(&self, name: &str) -> Result<CommunityStats, DomainError> {
        let community = self.get(name).await?;
        let posts = self.posts.find_by_community(&community.name).await?;
        Ok(trending::stats(&community, &posts, Utc::now()))
    }

    /// Up to five other communities, those sharing the most topics first.
    pub async fn related(&self, name: &str) -> Result<Vec<RelatedCommunity>, DomainError> {
        let community = self.get(name).await?;
        let candidates = self.list().await?;
        Ok(trending::related(&community, &candidates))
    }
}
