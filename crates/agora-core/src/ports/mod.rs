//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod local_store;
mod repository;

pub use local_store::{LocalStore, LocalStoreError};
pub use repository::{
    AwardRepository, BaseRepository, BulkMutation, CommentRepository, CommunityRepository,
    ConversationRepository, Filter, MessageRepository, Mutation, NotificationRepository,
    PostRepository, Record,
};
