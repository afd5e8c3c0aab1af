//! Message service - conversations, threaded replies, read state and reports.
//!
//! Everything is seen from one viewer: unread counts skip the viewer's own
//! messages, and conversations with a blocked participant are left out of
//! the inbox.

use std::sync::Arc;

use chrono::Utc;

use super::flags::{BLOCKED_USERS_KEY, FlagList};
use super::users::handle_key;
use crate::domain::{Conversation, ConversationSummary, MAX_MESSAGE_DEPTH, Message, MessageDraft};
use crate::error::{DomainError, RepoError};
use crate::ports::{ConversationRepository, LocalStore, MessageRepository, Record};
use crate::thread::{ThreadNode, build_forest};

pub struct MessageService {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageRepository>,
    blocked: FlagList<String>,
    viewer: String,
}

fn not_found(id: i64) -> DomainError {
    DomainError::not_found(Conversation::ENTITY, id)
}

fn most_recent_first(mut summaries: Vec<ConversationSummary>) -> Vec<ConversationSummary> {
    summaries.sort_by(|a, b| b.conversation.updated_at.cmp(&a.conversation.updated_at));
    summaries
}

impl MessageService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageRepository>,
        local: Arc<dyn LocalStore>,
        viewer: impl Into<String>,
    ) -> Self {
        Self {
            conversations,
            messages,
            blocked: FlagList::new(local, BLOCKED_USERS_KEY),
            viewer: viewer.into(),
        }
    }

    pub fn viewer(&self) -> &str {
        &self.viewer
    }

    /// Every conversation, most recently active first.
    pub async fn list(&self) -> Result<Vec<ConversationSummary>, DomainError> {
        let conversations = self.conversations.find_all().await?;
        let messages = self.messages.find_all().await?;
        let summaries = conversations
            .into_iter()
            .map(|c| ConversationSummary::new(c, &messages, &self.viewer))
            .collect();
        Ok(most_recent_first(summaries))
    }

    /// The inbox: conversations with no blocked participant.
    pub async fn visible(&self) -> Result<Vec<ConversationSummary>, DomainError> {
        let blocked = self.blocked.load().await;
        let mut summaries = self.list().await?;
        summaries.retain(|s| {
            s.conversation
                .others(&self.viewer)
                .all(|p| !blocked.contains(&handle_key(p)))
        });
        Ok(summaries)
    }

    /// Inbox entries whose participants or last message match `query`.
    /// A blank query matches everything.
    pub async fn search(&self, query: &str) -> Result<Vec<ConversationSummary>, DomainError> {
        let mut summaries = self.visible().await?;
        summaries.retain(|s| s.matches(query));
        Ok(summaries)
    }

    pub async fn get(&self, id: i64) -> Result<ConversationSummary, DomainError> {
        let conversation = self.conversation(id).await?;
        let messages = self.messages.find_by_conversation(id).await?;
        Ok(ConversationSummary::new(conversation, &messages, &self.viewer))
    }

    /// Messages of a conversation, oldest first.
    pub async fn messages(&self, id: i64) -> Result<Vec<Message>, DomainError> {
        self.conversation(id).await?;
        let mut messages = self.messages.find_by_conversation(id).await?;
        messages.sort_by_key(|m| (m.created_at, m.id));
        Ok(messages)
    }

    /// Messages of a conversation as a reply forest.
    pub async fn thread(&self, id: i64) -> Result<Vec<ThreadNode<Message>>, DomainError> {
        let messages = self.messages(id).await?;
        Ok(build_forest(messages, MAX_MESSAGE_DEPTH))
    }

    /// Open a conversation with `participant`, optionally sending a first
    /// message from the viewer.
    pub async fn start(
        &self,
        participant: &str,
        initial: Option<String>,
    ) -> Result<ConversationSummary, DomainError> {
        if self.blocked.contains(&handle_key(participant)).await {
            return Err(DomainError::validation(format!(
                "You have blocked {}",
                participant.trim()
            )));
        }

        let conversation = Conversation::start(&self.viewer, participant, Utc::now())?;
        let conversation = self.conversations.insert(conversation).await?;
        tracing::info!(conversation_id = conversation.id, "Conversation started");

        if let Some(content) = initial.filter(|c| !c.trim().is_empty()) {
            let sender = self.viewer.clone();
            self.post(conversation.id, None, sender, content).await?;
        }
        self.get(conversation.id).await
    }

    pub async fn send(
        &self,
        conversation_id: i64,
        sender: &str,
        content: String,
    ) -> Result<Message, DomainError> {
        self.post(conversation_id, None, sender.to_string(), content).await
    }

    /// Reply to `parent_id`, which must belong to the same conversation.
    pub async fn reply(
        &self,
        conversation_id: i64,
        parent_id: i64,
        sender: &str,
        content: String,
    ) -> Result<Message, DomainError> {
        let parent = self
            .messages
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Message::ENTITY, parent_id))?;
        if parent.conversation_id != conversation_id {
            return Err(DomainError::validation(
                "Parent message belongs to a different conversation",
            ));
        }
        self.post(conversation_id, Some(parent_id), sender.to_string(), content)
            .await
    }

    async fn post(
        &self,
        conversation_id: i64,
        parent_id: Option<i64>,
        sender: String,
        content: String,
    ) -> Result<Message, DomainError> {
        let conversation = self.conversation(conversation_id).await?;
        if !conversation.includes(&sender) {
            return Err(DomainError::validation(format!(
                "{sender} is not part of this conversation"
            )));
        }

        let draft = MessageDraft {
            conversation_id,
            parent_id,
            sender,
            content,
        };
        let message = Message::compose(draft, Utc::now())?;
        let message = self.messages.insert(message).await?;

        let sent_at = message.created_at;
        self.conversations
            .modify(
                conversation_id,
                Box::new(move |c: &mut Conversation| {
                    c.updated_at = c.updated_at.max(sent_at);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!(
            message_id = message.id,
            conversation_id,
            reply = parent_id.is_some(),
            "Message sent"
        );
        Ok(message)
    }

    /// Mark every message from other participants read; returns how many
    /// changed.
    pub async fn mark_read(&self, id: i64) -> Result<usize, DomainError> {
        self.conversation(id).await?;
        let viewer = self.viewer.clone();
        let changed = self
            .messages
            .modify_all(Box::new(move |m: &mut Message| {
                if m.conversation_id != id || m.is_read || m.is_from(&viewer) {
                    return false;
                }
                m.is_read = true;
                true
            }))
            .await?;
        tracing::debug!(conversation_id = id, changed, "Conversation marked read");
        Ok(changed)
    }

    /// Flag the latest message from another participant unread again.
    /// Returns false when nobody else has written yet.
    pub async fn mark_unread(&self, id: i64) -> Result<bool, DomainError> {
        let messages = self.messages(id).await?;
        let Some(latest) = messages.iter().rev().find(|m| !m.is_from(&self.viewer)) else {
            return Ok(false);
        };

        self.messages
            .modify(
                latest.id,
                Box::new(|m: &mut Message| {
                    m.is_read = false;
                    Ok(())
                }),
            )
            .await?;
        Ok(true)
    }

    pub async fn report_spam(&self, message_id: i64, reason: &str) -> Result<Message, DomainError> {
        let reason = reason.to_string();
        let now = Utc::now();
        let message = self
            .messages
            .modify(
                message_id,
                Box::new(move |m: &mut Message| m.report_spam(&reason, now)),
            )
            .await?
            .ok_or_else(|| DomainError::not_found(Message::ENTITY, message_id))?;
        tracing::warn!(
            message_id,
            conversation_id = message.conversation_id,
            "Message reported as spam"
        );
        Ok(message)
    }

    /// Unread messages across the inbox.
    pub async fn unread_count(&self) -> Result<usize, DomainError> {
        Ok(self.visible().await?.iter().map(|s| s.unread_count).sum())
    }

    /// Delete a conversation and all of its messages.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        match self.conversations.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(not_found(id)),
            Err(e) => return Err(e.into()),
        }
        let removed = self
            .messages
            .remove_where(Box::new(move |m: &Message| m.conversation_id == id))
            .await?;
        tracing::info!(conversation_id = id, messages = removed.len(), "Conversation deleted");
        Ok(())
    }

    async fn conversation(&self, id: i64) -> Result<Conversation, DomainError> {
        self.conversations
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }
}
