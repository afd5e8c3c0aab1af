use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reply,
    Mention,
    Upvote,
    Award,
    Follow,
    System,
}

impl std::str::FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reply" => Ok(Self::Reply),
            "mention" => Ok(Self::Mention),
            "upvote" => Ok(Self::Upvote),
            "award" => Ok(Self::Award),
            "follow" => Ok(Self::Follow),
            "system" => Ok(Self::System),
            other => Err(DomainError::validation(format!(
                "unknown notification type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub post_id: Option<i64>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        message: impl Into<String>,
        post_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            kind,
            message: message.into(),
            post_id,
            is_read: false,
            created_at: now,
        }
    }
}

/// One switch per notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindToggles {
    pub reply: bool,
    pub mention: bool,
    pub upvote: bool,
    pub award: bool,
    pub follow: bool,
    pub system: bool,
}

impl KindToggles {
    pub fn all(on: bool) -> Self {
        Self {
            reply: on,
            mention: on,
            upvote: on,
            award: on,
            follow: on,
            system: on,
        }
    }

    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Reply => self.reply,
            NotificationKind::Mention => self.mention,
            NotificationKind::Upvote => self.upvote,
            NotificationKind::Award => self.award,
            NotificationKind::Follow => self.follow,
            NotificationKind::System => self.system,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub email: bool,
    pub push: bool,
    pub email_important_only: bool,
    pub email_digest: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestFrequency {
    #[default]
    Instant,
    Hourly,
    Daily,
    Weekly,
}

/// What the user wants to be notified about, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub types: KindToggles,
    pub delivery: Delivery,
    pub frequency: DigestFrequency,
    /// Kinds that also go out by email.
    pub email_types: KindToggles,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            types: KindToggles::all(true),
            delivery: Delivery {
                email: true,
                push: true,
                email_important_only: false,
                email_digest: false,
            },
            frequency: DigestFrequency::Instant,
            email_types: KindToggles {
                upvote: false,
                follow: false,
                ..KindToggles::all(true)
            },
        }
    }
}

impl NotificationPreferences {
    /// Whether a notification of `kind` should be emailed.
    pub fn emails(&self, kind: NotificationKind) -> bool {
        self.delivery.email && self.types.allows(kind) && self.email_types.allows(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences_mute_email_for_noisy_kinds() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.types.allows(NotificationKind::Upvote));
        assert!(!prefs.emails(NotificationKind::Upvote));
        assert!(!prefs.emails(NotificationKind::Follow));
        assert!(prefs.emails(NotificationKind::Reply));
        assert_eq!(prefs.frequency, DigestFrequency::Instant);
    }

    #[test]
    fn preferences_use_camel_case_on_the_wire() {
        let json = serde_json::to_value(NotificationPreferences::default()).unwrap();
        assert_eq!(json["delivery"]["emailImportantOnly"], false);
        assert_eq!(json["frequency"], "instant");
        assert_eq!(json["emailTypes"]["upvote"], false);
    }

    #[test]
    fn unknown_frequency_is_rejected() {
        let mut json = serde_json::to_value(NotificationPreferences::default()).unwrap();
        json["frequency"] = "monthly".into();
        assert!(serde_json::from_value::<NotificationPreferences>(json).is_err());
    }
}
