use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Deepest nesting level at which a message reply is still offered.
pub const MAX_MESSAGE_DEPTH: u8 = 1;

/// A private exchange between two or more users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: i64,
    /// Handles of everyone taking part, the viewer included.
    pub participants: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Time of the latest message, or of creation when there is none yet.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Open a conversation between `viewer` and `participant`.
    pub fn start(viewer: &str, participant: &str, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let participant = participant.trim();
        if participant.is_empty() {
            return Err(DomainError::validation("Recipient is required"));
        }
        if participant.eq_ignore_ascii_case(viewer) {
            return Err(DomainError::validation("You can't message yourself"));
        }

        Ok(Self {
            id: 0,
            participants: vec![viewer.to_string(), participant.to_string()],
            created_at: now,
            updated_at: now,
        })
    }

    pub fn includes(&self, handle: &str) -> bool {
        self.participants
            .iter()
            .any(|p| p.eq_ignore_ascii_case(handle))
    }

    /// Everyone in the conversation except `viewer`.
    pub fn others<'a>(&'a self, viewer: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.participants
            .iter()
            .map(String::as_str)
            .filter(move |p| !p.eq_ignore_ascii_case(viewer))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamReport {
    pub reason: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<SpamReport>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Input for a new message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub conversation_id: i64,
    pub parent_id: Option<i64>,
    pub sender: String,
    pub content: String,
}

impl Message {
    pub fn compose(draft: MessageDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Message cannot be empty"));
        }
        if draft.sender.trim().is_empty() {
            return Err(DomainError::validation("Sender is required"));
        }

        Ok(Self {
            id: 0,
            conversation_id: draft.conversation_id,
            sender: draft.sender,
            content: content.to_string(),
            parent_id: draft.parent_id,
            is_read: false,
            report: None,
            created_at: now,
        })
    }

    pub fn is_reported(&self) -> bool {
        self.report.is_some()
    }

    pub fn is_from(&self, handle: &str) -> bool {
        self.sender.eq_ignore_ascii_case(handle)
    }

    /// Flag the message as spam. A later report replaces the earlier one.
    pub fn report_spam(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("A reason is required"));
        }
        self.report = Some(SpamReport {
            reason: reason.to_string(),
            reported_at: now,
        });
        Ok(())
    }
}

/// A conversation as its list entry shows it to one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub last_message: Option<Message>,
    /// Messages from other participants the viewer hasn't read.
    pub unread_count: usize,
}

impl ConversationSummary {
    /// Summarize `conversation` from its `messages`, in any order.
    pub fn new(conversation: Conversation, messages: &[Message], viewer: &str) -> Self {
        let last_message = messages
            .iter()
            .filter(|m| m.conversation_id == conversation.id)
            .max_by_key(|m| (m.created_at, m.id))
            .cloned();
        let unread_count = messages
            .iter()
            .filter(|m| m.conversation_id == conversation.id && !m.is_read && !m.is_from(viewer))
            .count();
        Self {
            conversation,
            last_message,
            unread_count,
        }
    }

    /// Case-insensitive match on participant names or the last message.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.conversation
            .participants
            .iter()
            .any(|p| p.to_lowercase().contains(&needle))
            || self
                .last_message
                .as_ref()
                .is_some_and(|m| m.content.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn message(id: i64, sender: &str, minutes: i64, is_read: bool) -> Message {
        Message {
            id,
            conversation_id: 1,
            sender: sender.into(),
            content: format!("message {id}"),
            parent_id: None,
            is_read,
            report: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH + Duration::minutes(minutes),
        }
    }

    fn conversation() -> Conversation {
        Conversation::start("me", "ana", DateTime::<Utc>::UNIX_EPOCH).unwrap()
    }

    #[test]
    fn compose_trims_and_rejects_blank_content() {
        let draft = MessageDraft {
            conversation_id: 1,
            parent_id: None,
            sender: "me".into(),
            content: "  hello there \n".into(),
        };
        let sent = Message::compose(draft.clone(), Utc::now()).unwrap();
        assert_eq!(sent.content, "hello there");
        assert!(!sent.is_read);

        let blank = MessageDraft {
            content: "   ".into(),
            ..draft
        };
        assert!(Message::compose(blank, Utc::now()).is_err());
    }

    #[test]
    fn cannot_start_conversation_with_yourself() {
        let now = Utc::now();
        assert!(Conversation::start("me", "ME", now).is_err());
        assert!(Conversation::start("me", " ", now).is_err());
        let started = Conversation::start("me", " ana ", now).unwrap();
        assert_eq!(started.participants, vec!["me", "ana"]);
        assert_eq!(started.others("me").collect::<Vec<_>>(), vec!["ana"]);
    }

    #[test]
    fn summary_counts_only_unread_from_others() {
        let mut conversation = conversation();
        conversation.id = 1;
        let messages = vec![
            message(1, "ana", 0, false),
            message(2, "me", 5, false),
            message(3, "ana", 3, true),
            message(4, "ana", 4, false),
        ];

        let summary = ConversationSummary::new(conversation, &messages, "me");
        assert_eq!(summary.unread_count, 2);
        assert_eq!(summary.last_message.map(|m| m.id), Some(2));
    }

    #[test]
    fn search_matches_participants_and_last_message() {
        let mut conversation = conversation();
        conversation.id = 1;
        let summary = ConversationSummary::new(conversation, &[message(1, "ana", 0, true)], "me");

        assert!(summary.matches("ANA"));
        assert!(summary.matches("message 1"));
        assert!(summary.matches("  "));
        assert!(!summary.matches("zed"));
    }

    #[test]
    fn spam_report_needs_a_reason() {
        let mut msg = message(1, "ana", 0, false);
        assert!(msg.report_spam(" ", Utc::now()).is_err());
        assert!(!msg.is_reported());

        msg.report_spam("selling things", Utc::now()).unwrap();
        assert_eq!(msg.report.as_ref().map(|r| r.reason.as_str()), Some("selling things"));
    }
}
