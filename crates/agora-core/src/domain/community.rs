use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 21;
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRule {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moderator {
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Community entity. Names are unique ignoring case and stored lower-case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub member_count: u64,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub rules: Vec<CommunityRule>,
    #[serde(default)]
    pub moderators: Vec<Moderator>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityDraft {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub nsfw: bool,
    pub topics: Vec<String>,
    pub rules: Vec<CommunityRule>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityChanges {
    pub description: Option<String>,
    pub nsfw: Option<bool>,
    pub topics: Option<Vec<String>>,
    pub rules: Option<Vec<CommunityRule>>,
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(
            "Description must be 500 characters or less",
        ));
    }
    Ok(())
}

impl Community {
    /// Check a proposed community name: 3-21 characters of `[A-Za-z0-9_]`.
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        let len = name.chars().count();
        if len < MIN_NAME_LEN {
            return Err(DomainError::validation(
                "Community name must be at least 3 characters",
            ));
        }
        if len > MAX_NAME_LEN {
            return Err(DomainError::validation(
                "Community name must be 21 characters or less",
            ));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::validation(
                "Community name can only contain letters, numbers, and underscores",
            ));
        }
        Ok(())
    }

    /// Found a community; the creator becomes its first member and moderator.
    pub fn found(draft: CommunityDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = draft.name.trim();
        Self::validate_name(name)?;
        validate_description(&draft.description)?;

        let rules = draft
            .rules
            .into_iter()
            .filter(|rule| !rule.title.trim().is_empty())
            .collect();

        Ok(Self {
            id: 0,
            name: name.to_lowercase(),
            description: draft.description,
            member_count: 1,
            post_count: 0,
            nsfw: draft.nsfw,
            topics: draft.topics,
            rules,
            moderators: vec![Moderator {
                username: draft.creator,
                role: "Head Moderator".to_string(),
                is_active: true,
            }],
            created_at: now,
        })
    }

    pub fn apply(&mut self, changes: CommunityChanges) -> Result<(), DomainError> {
        if let Some(description) = changes.description {
            validate_description(&description)?;
            self.description = description;
        }
        if let Some(nsfw) = changes.nsfw {
            self.nsfw = nsfw;
        }
        if let Some(topics) = changes.topics {
            self.topics = topics;
        }
        if let Some(rules) = changes.rules {
            self.rules = rules;
        }
        Ok(())
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> CommunityDraft {
        CommunityDraft {
            name: name.to_string(),
            description: "All things crustacean".to_string(),
            creator: "ferris".to_string(),
            nsfw: false,
            topics: vec!["programming".into()],
            rules: vec![
                CommunityRule {
                    title: "Be kind".into(),
                    description: String::new(),
                },
                CommunityRule {
                    title: " ".into(),
                    description: "dropped".into(),
                },
            ],
        }
    }

    #[test]
    fn found_normalizes_name_and_rules() {
        let community = Community::found(draft("RustLang"), Utc::now()).unwrap();

        assert_eq!(community.name, "rustlang");
        assert_eq!(community.member_count, 1);
        assert_eq!(community.rules.len(), 1);
        assert_eq!(community.moderators[0].username, "ferris");
        assert!(community.is_named("RUSTLANG"));
    }

    #[test]
    fn name_rules() {
        assert!(Community::validate_name("ab").is_err());
        assert!(Community::validate_name("this_name_is_way_too_long").is_err());
        assert!(Community::validate_name("no spaces").is_err());
        assert!(Community::validate_name("rust_2024").is_ok());
    }

    #[test]
    fn search_matches_description() {
        let community = Community::found(draft("rust"), Utc::now()).unwrap();
        assert!(community.matches("CRUST"));
        assert!(!community.matches("golang"));
    }
}
