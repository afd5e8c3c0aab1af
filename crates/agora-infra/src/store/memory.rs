//! In-memory record store.
//!
//! Each entity type lives in one `Vec` behind an async `RwLock`. Every
//! operation, including read-modify-write mutations, runs under a single lock
//! acquisition, so concurrent callers never interleave inside one change.

use async_trait::async_trait;
use tokio::sync::RwLock;

use agora_core::domain::{
    AwardGrant, AwardTarget, Comment, Community, Conversation, Message, Notification, Post,
};
use agora_core::error::RepoError;
use agora_core::ports::{
    AwardRepository, BaseRepository, BulkMutation, CommentRepository, CommunityRepository,
    ConversationRepository, Filter, MessageRepository, Mutation, NotificationRepository,
    PostRepository, Record,
};

/// Generic in-memory repository over any [`Record`].
pub struct InMemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;
pub type InMemoryCommunityRepository = InMemoryRepository<Community>;
pub type InMemoryNotificationRepository = InMemoryRepository<Notification>;
pub type InMemoryAwardRepository = InMemoryRepository<AwardGrant>;
pub type InMemoryConversationRepository = InMemoryRepository<Conversation>;
pub type InMemoryMessageRepository = InMemoryRepository<Message>;

/// Append `entity` with the next id. The caller holds the write lock.
fn push_next<T: Record>(records: &mut Vec<T>, mut entity: T) -> T {
    let next_id = records.iter().map(Record::id).max().unwrap_or(0) + 1;
    entity.set_id(next_id);
    records.push(entity.clone());
    tracing::debug!(entity = T::ENTITY, id = next_id, "Record inserted");
    entity
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Start from an existing set of records, e.g. fixtures.
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn select<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        let records = self.records.read().await;
        records.iter().filter(|r| predicate(*r)).cloned().collect()
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> BaseRepository<T> for InMemoryRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, RepoError> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, RepoError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut records = self.records.write().await;
        Ok(push_next(&mut records, entity))
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == entity.id())
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        Ok(entity)
    }

    async fn modify(&self, id: i64, mutation: Mutation<T>) -> Result<Option<T>, RepoError> {
        let mut records = self.records.write().await;
        let Some(slot) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };

        // Work on a copy so a rejected mutation leaves the record intact.
        let mut draft = slot.clone();
        mutation(&mut draft)?;
        *slot = draft.clone();
        Ok(Some(draft))
    }

    async fn modify_all(&self, mutation: BulkMutation<T>) -> Result<usize, RepoError> {
        let mut records = self.records.write().await;
        let mut changed = 0;
        for record in records.iter_mut() {
            if mutation(record) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(RepoError::NotFound)?;
        records.remove(position);

        tracing::debug!(entity = T::ENTITY, id, "Record deleted");
        Ok(())
    }

    async fn remove_where(&self, filter: Filter<T>) -> Result<Vec<T>, RepoError> {
        let mut records = self.records.write().await;
        let (removed, kept): (Vec<T>, Vec<T>) = records.drain(..).partition(|r| filter(r));
        *records = kept;

        if !removed.is_empty() {
            tracing::debug!(entity = T::ENTITY, removed = removed.len(), "Records removed");
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<(), RepoError> {
        self.records.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_community(&self, community: &str) -> Result<Vec<Post>, RepoError> {
        Ok(self.select(|p| p.in_community(community)).await)
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Post>, RepoError> {
        Ok(self.select(|p| p.author.eq_ignore_ascii_case(author)).await)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        Ok(self.select(|c| c.post_id == post_id).await)
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Comment>, RepoError> {
        Ok(self.select(|c| c.author.eq_ignore_ascii_case(author)).await)
    }
}

#[async_trait]
impl CommunityRepository for InMemoryCommunityRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Community>, RepoError> {
        Ok(self.select(|c| c.is_named(name)).await.into_iter().next())
    }

    async fn insert_unique(&self, community: Community) -> Result<Option<Community>, RepoError> {
        let mut records = self.records.write().await;
        if records.iter().any(|c| c.is_named(&community.name)) {
            return Ok(None);
        }
        Ok(Some(push_next(&mut records, community)))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn count_unread(&self) -> Result<usize, RepoError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|n| !n.is_read).count())
    }
}

#[async_trait]
impl AwardRepository for InMemoryAwardRepository {
    async fn find_by_target(&self, target: AwardTarget) -> Result<Vec<AwardGrant>, RepoError> {
        Ok(self.select(|g| g.target == target).await)
    }
}

impl ConversationRepository for InMemoryConversationRepository {}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_by_conversation(&self, conversation_id: i64) -> Result<Vec<Message>, RepoError> {
        Ok(self.select(|m| m.conversation_id == conversation_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::DomainError;
    use agora_core::domain::{CommunityDraft, NotificationKind};
    use chrono::Utc;

    fn notification(message: &str) -> Notification {
        Notification::new(NotificationKind::System, message, None, Utc::now())
    }

    #[tokio::test]
    async fn insert_assigns_max_plus_one() {
        let repo = InMemoryNotificationRepository::new();

        let first = repo.insert(notification("a")).await.unwrap();
        assert_eq!(first.id, 1);

        let mut seeded = notification("b");
        seeded.id = 41;
        let repo = InMemoryNotificationRepository::with_records(vec![seeded]);
        let next = repo.insert(notification("c")).await.unwrap();
        assert_eq!(next.id, 42);
    }

    #[tokio::test]
    async fn modify_applies_in_place() {
        let repo = InMemoryNotificationRepository::new();
        let n = repo.insert(notification("hello")).await.unwrap();

        let updated = repo
            .modify(
                n.id,
                Box::new(|n: &mut Notification| {
                    n.is_read = true;
                    Ok(())
                }),
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.is_read);
        assert_eq!(repo.count_unread().await.unwrap(), 0);
        let missing = repo
            .modify(99, Box::new(|_: &mut Notification| Ok(())))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn rejected_modify_leaves_record_untouched() {
        let repo = InMemoryNotificationRepository::new();
        let n = repo.insert(notification("keep me")).await.unwrap();

        let result = repo
            .modify(
                n.id,
                Box::new(|n: &mut Notification| {
                    n.message = "changed".into();
                    Err(DomainError::validation("nope"))
                }),
            )
            .await;

        assert!(matches!(result, Err(RepoError::Rejected(_))));
        let stored = repo.find_by_id(n.id).await.unwrap().unwrap();
        assert_eq!(stored.message, "keep me");
    }

    #[tokio::test]
    async fn delete_and_update_report_missing_records() {
        let repo = InMemoryNotificationRepository::new();
        let n = repo.insert(notification("bye")).await.unwrap();

        repo.delete(n.id).await.unwrap();
        assert!(matches!(repo.delete(n.id).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.update(n).await, Err(RepoError::NotFound)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn modify_all_counts_changes() {
        let repo = InMemoryNotificationRepository::new();
        repo.insert(notification("one")).await.unwrap();
        let two = repo.insert(notification("two")).await.unwrap();
        repo.modify(
            two.id,
            Box::new(|n: &mut Notification| {
                n.is_read = true;
                Ok(())
            }),
        )
        .await
        .unwrap();

        let changed = repo
            .modify_all(Box::new(|n: &mut Notification| {
                let was_unread = !n.is_read;
                n.is_read = true;
                was_unread
            }))
            .await
            .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn remove_where_takes_out_only_selected_records() {
        let repo = InMemoryNotificationRepository::new();
        for message in ["keep", "drop", "keep too", "drop too"] {
            repo.insert(notification(message)).await.unwrap();
        }

        let removed = repo
            .remove_where(Box::new(|n: &Notification| n.message.starts_with("drop")))
            .await
            .unwrap();

        assert_eq!(removed.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 4]);
        let left: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(left, vec!["keep", "keep too"]);

        let none = repo
            .remove_where(Box::new(|_: &Notification| false))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    fn community(name: &str) -> Community {
        let draft = CommunityDraft {
            name: name.into(),
            description: String::new(),
            creator: "founder".into(),
            nsfw: false,
            topics: Vec::new(),
            rules: Vec::new(),
        };
        Community::found(draft, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn insert_unique_refuses_taken_names_ignoring_case() {
        let repo = InMemoryCommunityRepository::new();

        let first = repo.insert_unique(community("Rustaceans")).await.unwrap();
        assert_eq!(first.map(|c| c.id), Some(1));
        assert!(repo.insert_unique(community("rustaceans")).await.unwrap().is_none());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn messages_are_found_by_conversation() {
        let repo = InMemoryMessageRepository::new();
        for conversation_id in [1, 2, 1] {
            let message = Message {
                id: 0,
                conversation_id,
                sender: "ana".into(),
                content: "hi".into(),
                parent_id: None,
                is_read: false,
                report: None,
                created_at: Utc::now(),
            };
            repo.insert(message).await.unwrap();
        }

        let ids: Vec<i64> = repo
            .find_by_conversation(1)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
