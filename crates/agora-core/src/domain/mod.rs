//! Domain entities - the core business objects.

mod award;
mod comment;
mod community;
mod karma;
mod message;
mod notification;
mod poll;
mod post;
mod saved;
mod vote;

pub use award::{AwardGrant, AwardKind, AwardTarget};
pub use comment::{Comment, CommentDraft, MAX_COMMENT_DEPTH};
pub use community::{Community, CommunityChanges, CommunityDraft, CommunityRule, Moderator};
pub use karma::karma;
pub use message::{
    Conversation, ConversationSummary, MAX_MESSAGE_DEPTH, Message, MessageDraft, SpamReport,
};
pub use notification::{
    Delivery, DigestFrequency, KindToggles, Notification, NotificationKind, NotificationPreferences,
};
pub use poll::{Poll, PollOption};
pub use post::{ContentKind, DraftContent, Post, PostChanges, PostContent, PostDraft};
pub use saved::{BulkOutcome, DEFAULT_CATEGORIES, SavedContent, SavedItem, SavedKind};
pub use vote::{LikeState, Votable, VoteDirection, VoteTally};
