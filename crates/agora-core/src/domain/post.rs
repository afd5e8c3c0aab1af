use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::poll::Poll;
use super::vote::{LikeState, Votable, VoteTally};
use crate::error::DomainError;

pub const MAX_TITLE_LEN: usize = 300;

/// Content-type tag of a post, used for feed filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Video,
    Link,
    Poll,
}

impl std::str::FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "link" => Ok(Self::Link),
            "poll" => Ok(Self::Poll),
            other => Err(DomainError::validation(format!(
                "unknown content type '{other}'"
            ))),
        }
    }
}

/// Type-specific payload of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostContent {
    Text,
    Image {
        url: String,
        #[serde(default, rename = "thumbnailUrl")]
        thumbnail_url: Option<String>,
    },
    Video {
        url: String,
    },
    Link {
        url: String,
    },
    Poll(Poll),
}

impl PostContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            PostContent::Text => ContentKind::Text,
            PostContent::Image { .. } => ContentKind::Image,
            PostContent::Video { .. } => ContentKind::Video,
            PostContent::Link { .. } => ContentKind::Link,
            PostContent::Poll(_) => ContentKind::Poll,
        }
    }
}

/// Post entity - a submission to a community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub community: String,
    pub content: PostContent,
    pub votes: VoteTally,
    #[serde(default)]
    pub likes: LikeState,
    pub comment_count: u32,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub flair: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub original_content: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Type-specific input for a new post.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftContent {
    Text,
    Image {
        url: String,
        thumbnail_url: Option<String>,
    },
    Video {
        url: String,
    },
    Link {
        url: String,
    },
    Poll {
        options: Vec<String>,
        duration_days: u32,
    },
}

/// Everything needed to publish a post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub author: String,
    pub community: String,
    pub content: DraftContent,
    pub flair: Option<String>,
    pub nsfw: bool,
    pub spoiler: bool,
    pub original_content: bool,
}

/// Partial update of an existing post; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub flair: Option<String>,
    pub pinned: Option<bool>,
    pub nsfw: Option<bool>,
    pub spoiler: Option<bool>,
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(
            "Title must be 300 characters or less",
        ));
    }
    Ok(())
}

impl Post {
    /// Build a post from a draft. The id is assigned by the store on insert.
    pub fn publish(draft: PostDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_title(&draft.title)?;
        if draft.author.trim().is_empty() {
            return Err(DomainError::validation("Author is required"));
        }

        let content = match draft.content {
            DraftContent::Text => PostContent::Text,
            DraftContent::Image { url, thumbnail_url } => PostContent::Image { url, thumbnail_url },
            DraftContent::Video { url } => PostContent::Video { url },
            DraftContent::Link { url } => PostContent::Link { url },
            DraftContent::Poll {
                options,
                duration_days,
            } => PostContent::Poll(Poll::open(options, duration_days, now)?),
        };

        Ok(Self {
            id: 0,
            title: draft.title.trim().to_string(),
            body: draft.body,
            author: draft.author,
            community: draft.community.to_lowercase(),
            content,
            votes: VoteTally::authored(),
            likes: LikeState::default(),
            comment_count: 0,
            pinned: false,
            flair: draft.flair,
            nsfw: draft.nsfw,
            spoiler: draft.spoiler,
            original_content: draft.original_content,
            created_at: now,
        })
    }

    pub fn apply(&mut self, changes: PostChanges) -> Result<(), DomainError> {
        if let Some(title) = changes.title {
            validate_title(&title)?;
            self.title = title.trim().to_string();
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(flair) = changes.flair {
            self.flair = Some(flair).filter(|f| !f.is_empty());
        }
        if let Some(pinned) = changes.pinned {
            self.pinned = pinned;
        }
        if let Some(nsfw) = changes.nsfw {
            self.nsfw = nsfw;
        }
        if let Some(spoiler) = changes.spoiler {
            self.spoiler = spoiler;
        }
        Ok(())
    }

    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    pub fn score(&self) -> i64 {
        self.votes.score()
    }

    pub fn poll(&self) -> Option<&Poll> {
        match &self.content {
            PostContent::Poll(poll) => Some(poll),
            _ => None,
        }
    }

    pub fn poll_mut(&mut self) -> Option<&mut Poll> {
        match &mut self.content {
            PostContent::Poll(poll) => Some(poll),
            _ => None,
        }
    }

    pub fn in_community(&self, name: &str) -> bool {
        self.community.eq_ignore_ascii_case(name)
    }
}

impl Votable for Post {
    fn tally(&self) -> &VoteTally {
        &self.votes
    }

    fn tally_mut(&mut self) -> &mut VoteTally {
        &mut self.votes
    }

    fn like_state_mut(&mut self) -> &mut LikeState {
        &mut self.likes
    }
}
