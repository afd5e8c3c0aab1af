//! Record stores.

mod memory;

use std::sync::Arc;

use agora_core::domain::AwardKind;

pub use memory::{
    InMemoryAwardRepository, InMemoryCommentRepository, InMemoryCommunityRepository,
    InMemoryConversationRepository, InMemoryMessageRepository, InMemoryNotificationRepository,
    InMemoryPostRepository, InMemoryRepository,
};

#[cfg(feature = "fixtures")]
use crate::fixtures::Seed;

/// One in-memory repository per entity type, plus the award catalog.
#[derive(Clone)]
pub struct InMemoryStores {
    pub posts: Arc<InMemoryPostRepository>,
    pub comments: Arc<InMemoryCommentRepository>,
    pub communities: Arc<InMemoryCommunityRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub awards: Arc<InMemoryAwardRepository>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub award_kinds: Vec<AwardKind>,
}

impl InMemoryStores {
    /// Empty stores with no award catalog.
    pub fn empty() -> Self {
        Self {
            posts: Arc::new(InMemoryRepository::new()),
            comments: Arc::new(InMemoryRepository::new()),
            communities: Arc::new(InMemoryRepository::new()),
            notifications: Arc::new(InMemoryRepository::new()),
            awards: Arc::new(InMemoryRepository::new()),
            conversations: Arc::new(InMemoryRepository::new()),
            messages: Arc::new(InMemoryRepository::new()),
            award_kinds: Vec::new(),
        }
    }

    /// Stores pre-populated from a fixture seed.
    #[cfg(feature = "fixtures")]
    pub fn seeded(seed: Seed) -> Self {
        tracing::info!(
            posts = seed.posts.len(),
            comments = seed.comments.len(),
            communities = seed.communities.len(),
            notifications = seed.notifications.len(),
            conversations = seed.conversations.len(),
            messages = seed.messages.len(),
            "Seeding in-memory stores"
        );
        Self {
            posts: Arc::new(InMemoryRepository::with_records(seed.posts)),
            comments: Arc::new(InMemoryRepository::with_records(seed.comments)),
            communities: Arc::new(InMemoryRepository::with_records(seed.communities)),
            notifications: Arc::new(InMemoryRepository::with_records(seed.notifications)),
            awards: Arc::new(InMemoryRepository::new()),
            conversations: Arc::new(InMemoryRepository::with_records(seed.conversations)),
            messages: Arc::new(InMemoryRepository::with_records(seed.messages)),
            award_kinds: seed.award_kinds,
        }
    }
}

impl Default for InMemoryStores {
    fn default() -> Self {
        Self::empty()
    }
}
