//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{LocalStore, PostRepository};
use agora_core::services::{
    AwardService, CommentService, CommunityService, MessageService, NotificationService,
    PostService, SavedService, UserService,
};
use agora_infra::{InMemoryLocalStore, InMemoryStores};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub communities: Arc<CommunityService>,
    pub notifications: Arc<NotificationService>,
    pub awards: Arc<AwardService>,
    pub saved: Arc<SavedService>,
    pub messages: Arc<MessageService>,
    pub users: Arc<UserService>,
    pub post_repo: Arc<dyn PostRepository>,
    pub feed_page_size: usize,
}

impl AppState {
    /// Wire every service onto one set of stores and one local flag store.
    pub fn new(stores: InMemoryStores, config: &AppConfig) -> Self {
        let local: Arc<dyn LocalStore> = Arc::new(InMemoryLocalStore::new());
        let post_repo: Arc<dyn PostRepository> = stores.posts.clone();

        Self {
            posts: Arc::new(PostService::new(
                post_repo.clone(),
                stores.comments.clone(),
                stores.communities.clone(),
                stores.awards.clone(),
                local.clone(),
            )),
            comments: Arc::new(CommentService::new(
                stores.comments.clone(),
                post_repo.clone(),
                local.clone(),
            )),
            communities: Arc::new(CommunityService::new(
                stores.communities.clone(),
                post_repo.clone(),
            )),
            notifications: Arc::new(NotificationService::new(
                stores.notifications.clone(),
                local.clone(),
            )),
            awards: Arc::new(AwardService::new(
                stores.award_kinds,
                stores.awards,
                post_repo.clone(),
                stores.comments.clone(),
            )),
            saved: Arc::new(SavedService::new(
                post_repo.clone(),
                stores.comments.clone(),
                local.clone(),
            )),
            messages: Arc::new(MessageService::new(
                stores.conversations,
                stores.messages,
                local.clone(),
                config.viewer.as_str(),
            )),
            users: Arc::new(UserService::new(
                post_repo.clone(),
                stores.comments,
                local,
                config.viewer.as_str(),
            )),
            post_repo,
            feed_page_size: config.feed_page_size,
        }
    }

    /// Build the application state from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let stores = if config.seed_fixtures {
            seeded_stores()
        } else {
            tracing::info!("Fixture seeding disabled - starting with empty stores");
            InMemoryStores::empty()
        };

        let state = Self::new(stores, config);
        tracing::info!(viewer = %config.viewer, "Application state initialized");
        state
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(InMemoryStores::empty(), &AppConfig::default())
    }
}

#[cfg(feature = "fixtures")]
fn seeded_stores() -> InMemoryStores {
    match agora_infra::Seed::load(chrono::Utc::now()) {
        Ok(seed) => InMemoryStores::seeded(seed),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load fixtures. Starting with empty stores.");
            InMemoryStores::empty()
        }
    }
}

#[cfg(not(feature = "fixtures"))]
fn seeded_stores() -> InMemoryStores {
    tracing::warn!("Built without the fixtures feature - starting with empty stores");
    InMemoryStores::empty()
}
