use async_trait::async_trait;

use crate::domain::{
    AwardGrant, AwardTarget, Comment, Community, Conversation, Message, Notification, Post,
};
use crate::error::{DomainError, RepoError};

/// A record with an integer id assigned by the store.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in not-found messages.
    const ENTITY: &'static str;

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

/// In-place change applied to one record while the store holds its lock.
/// Returning an error leaves the record untouched.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> Result<(), DomainError> + Send>;

/// Change applied to every record; returns whether the record changed.
pub type BulkMutation<T> = Box<dyn Fn(&mut T) -> bool + Send + Sync>;

/// Selects the records a bulk removal takes out.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T: Record>: Send + Sync {
    /// All records in storage order.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;

    /// Find a record by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepoError>;

    /// Append a record, assigning it the next id (highest existing id + 1).
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Replace the stored record with the same id.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Apply `mutation` to the record with `id`. `None` when it doesn't exist.
    async fn modify(&self, id: i64, mutation: Mutation<T>) -> Result<Option<T>, RepoError>;

    /// Apply `mutation` to every record, returning how many changed.
    async fn modify_all(&self, mutation: BulkMutation<T>) -> Result<usize, RepoError>;

    /// Remove a record by id.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// Remove every record `filter` selects, returning them in storage order.
    async fn remove_where(&self, filter: Filter<T>) -> Result<Vec<T>, RepoError>;

    /// Remove every record.
    async fn clear(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostRepository: BaseRepository<Post> {
    /// Posts of one community, matched ignoring case.
    async fn find_by_community(&self, community: &str) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment> {
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;

    async fn find_by_author(&self, author: &str) -> Result<Vec<Comment>, RepoError>;
}

#[async_trait]
pub trait CommunityRepository: BaseRepository<Community> {
    /// Find a community by name, ignoring case.
    async fn find_by_name(&self, name: &str) -> Result<Option<Community>, RepoError>;

    /// Insert unless a community with the same name exists. The name check
    /// and the insert happen under one lock; `None` means the name was taken.
    async fn insert_unique(&self, community: Community) -> Result<Option<Community>, RepoError>;
}

#[async_trait]
pub trait NotificationRepository: BaseRepository<Notification> {
    async fn count_unread(&self) -> Result<usize, RepoError>;
}

#[async_trait]
pub trait AwardRepository: BaseRepository<AwardGrant> {
    async fn find_by_target(&self, target: AwardTarget) -> Result<Vec<AwardGrant>, RepoError>;
}

pub trait ConversationRepository: BaseRepository<Conversation> {}

#[async_trait]
pub trait MessageRepository: BaseRepository<Message> {
    async fn find_by_conversation(&self, conversation_id: i64) -> Result<Vec<Message>, RepoError>;
}

macro_rules! record {
    ($ty:ty, $name:literal) => {
        impl Record for $ty {
            const ENTITY: &'static str = $name;

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }
    };
}

record!(Post, "Post");
record!(Comment, "Comment");
record!(Community, "Community");
record!(Notification, "Notification");
record!(AwardGrant, "Award");
record!(Conversation, "Conversation");
record!(Message, "Message");
