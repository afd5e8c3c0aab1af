//! Bundled seed data for the in-memory stores.
//!
//! Fixture timestamps are authored relative to a fixed anchor instant and
//! shifted onto the current clock at load time, so "2 hours ago" in the JSON
//! stays "2 hours ago" whenever the server starts.

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use agora_core::domain::{
    AwardKind, Comment, Community, Conversation, Message, Notification, Post, PostContent,
};

const ANCHOR_MS: i64 = 1_700_000_000_000;

const COMMUNITIES: &str = include_str!("data/communities.json");
const POSTS: &str = include_str!("data/posts.json");
const COMMENTS: &str = include_str!("data/comments.json");
const NOTIFICATIONS: &str = include_str!("data/notifications.json");
const AWARDS: &str = include_str!("data/awards.json");
const CONVERSATIONS: &str = include_str!("data/conversations.json");
const MESSAGES: &str = include_str!("data/messages.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Invalid fixture {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fixture anchor is out of range")]
    Anchor,
}

/// Everything needed to pre-populate a fresh set of stores.
#[derive(Debug, Clone)]
pub struct Seed {
    pub communities: Vec<Community>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub notifications: Vec<Notification>,
    pub award_kinds: Vec<AwardKind>,
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
}

impl Seed {
    /// Load the bundled fixtures with timestamps rebased onto `now`.
    pub fn load(now: DateTime<Utc>) -> Result<Self, FixtureError> {
        let mut seed = Self {
            communities: parse("communities.json", COMMUNITIES)?,
            posts: parse("posts.json", POSTS)?,
            comments: parse("comments.json", COMMENTS)?,
            notifications: parse("notifications.json", NOTIFICATIONS)?,
            award_kinds: parse("awards.json", AWARDS)?,
            conversations: parse("conversations.json", CONVERSATIONS)?,
            messages: parse("messages.json", MESSAGES)?,
        };

        let anchor = DateTime::from_timestamp_millis(ANCHOR_MS).ok_or(FixtureError::Anchor)?;
        seed.shift(now.signed_duration_since(anchor));
        Ok(seed)
    }

    fn shift(&mut self, delta: TimeDelta) {
        for community in &mut self.communities {
            community.created_at += delta;
        }
        for post in &mut self.posts {
            post.created_at += delta;
            if let PostContent::Poll(poll) = &mut post.content {
                poll.ends_at += delta;
            }
        }
        for comment in &mut self.comments {
            comment.created_at += delta;
        }
        for notification in &mut self.notifications {
            notification.created_at += delta;
        }
        for conversation in &mut self.conversations {
            conversation.created_at += delta;
            conversation.updated_at += delta;
        }
        for message in &mut self.messages {
            message.created_at += delta;
            if let Some(report) = &mut message.report {
                report.reported_at += delta;
            }
        }
    }
}

fn parse<T: DeserializeOwned>(file: &'static str, raw: &str) -> Result<Vec<T>, FixtureError> {
    serde_json::from_str(raw).map_err(|source| FixtureError::Parse { file, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::domain::ContentKind;

    #[test]
    fn bundled_fixtures_parse() {
        let seed = Seed::load(Utc::now()).unwrap();
        assert_eq!(seed.communities.len(), 5);
        assert_eq!(seed.posts.len(), 8);
        assert_eq!(seed.comments.len(), 5);
        assert_eq!(seed.notifications.len(), 4);
        assert_eq!(seed.award_kinds.len(), 5);
        assert_eq!(seed.conversations.len(), 3);
        assert_eq!(seed.messages.len(), 8);
    }

    #[test]
    fn timestamps_are_rebased_onto_now() {
        let now = Utc::now();
        let seed = Seed::load(now).unwrap();

        let newest = seed.posts.iter().map(|p| p.created_at).max().unwrap();
        assert!(newest <= now);
        assert!(now - newest < TimeDelta::hours(2));

        let open_poll = seed.posts.iter().find(|p| p.id == 2).unwrap();
        assert!(open_poll.poll().unwrap().is_open(now));
        let expired_poll = seed.posts.iter().find(|p| p.id == 8).unwrap();
        assert!(!expired_poll.poll().unwrap().is_open(now));
    }

    #[test]
    fn comment_counts_match_comments() {
        let seed = Seed::load(Utc::now()).unwrap();
        for post in &seed.posts {
            let count = seed.comments.iter().filter(|c| c.post_id == post.id).count();
            assert_eq!(post.comment_count as usize, count, "post {}", post.id);
        }
    }

    #[test]
    fn conversations_end_at_their_last_message() {
        let seed = Seed::load(Utc::now()).unwrap();
        for conversation in &seed.conversations {
            let last = seed
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation.id)
                .map(|m| m.created_at)
                .max();
            assert_eq!(last, Some(conversation.updated_at), "conversation {}", conversation.id);
        }
    }

    #[test]
    fn every_content_kind_is_represented() {
        let seed = Seed::load(Utc::now()).unwrap();
        for kind in [
            ContentKind::Text,
            ContentKind::Image,
            ContentKind::Video,
            ContentKind::Link,
            ContentKind::Poll,
        ] {
            assert!(seed.posts.iter().any(|p| p.kind() == kind), "{kind:?}");
        }
    }
}
