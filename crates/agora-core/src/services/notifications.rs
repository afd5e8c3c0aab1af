//! Notification service.

use std::sync::Arc;

use chrono::Utc;

use super::flags::{LocalDocument, NOTIFICATION_PREFERENCES_KEY};
use crate::domain::{Notification, NotificationKind, NotificationPreferences};
use crate::error::{DomainError, RepoError};
use crate::ports::{LocalStore, NotificationRepository, Record};

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    preferences: LocalDocument<NotificationPreferences>,
}

fn not_found(id: i64) -> DomainError {
    DomainError::not_found(Notification::ENTITY, id)
}

fn newest_first(mut items: Vec<Notification>) -> Vec<Notification> {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            notifications,
            preferences: LocalDocument::new(local, NOTIFICATION_PREFERENCES_KEY),
        }
    }

    pub async fn list(&self) -> Result<Vec<Notification>, DomainError> {
        Ok(newest_first(self.notifications.find_all().await?))
    }

    pub async fn unread(&self) -> Result<Vec<Notification>, DomainError> {
        let mut items = self.notifications.find_all().await?;
        items.retain(|n| !n.is_read);
        Ok(newest_first(items))
    }

    pub async fn unread_count(&self) -> Result<usize, DomainError> {
        Ok(self.notifications.count_unread().await?)
    }

    pub async fn by_kind(&self, kind: NotificationKind) -> Result<Vec<Notification>, DomainError> {
        let mut items = self.notifications.find_all().await?;
        items.retain(|n| n.kind == kind);
        Ok(newest_first(items))
    }

    pub async fn create(
        &self,
        kind: NotificationKind,
        message: String,
        post_id: Option<i64>,
    ) -> Result<Notification, DomainError> {
        let notification = Notification::new(kind, message, post_id, Utc::now());
        Ok(self.notifications.insert(notification).await?)
    }

    pub async fn mark_read(&self, id: i64) -> Result<Notification, DomainError> {
        self.set_read(id, true).await
    }

    pub async fn mark_unread(&self, id: i64) -> Result<Notification, DomainError> {
        self.set_read(id, false).await
    }

    /// Mark everything read; returns how many notifications changed.
    pub async fn mark_all_read(&self) -> Result<usize, DomainError> {
        let changed = self
            .notifications
            .modify_all(Box::new(|n: &mut Notification| {
                let was_unread = !n.is_read;
                n.is_read = true;
                was_unread
            }))
            .await?;
        tracing::debug!(changed, "Marked all notifications read");
        Ok(changed)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        match self.notifications.delete(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn clear_all(&self) -> Result<(), DomainError> {
        Ok(self.notifications.clear().await?)
    }

    /// Stored preferences, or the defaults when none were saved.
    pub async fn preferences(&self) -> NotificationPreferences {
        self.preferences.load().await
    }

    pub async fn update_preferences(
        &self,
        preferences: NotificationPreferences,
    ) -> Result<NotificationPreferences, DomainError> {
        self.preferences.save(&preferences).await?;
        tracing::debug!(frequency = ?preferences.frequency, "Notification preferences saved");
        Ok(preferences)
    }

    pub async fn reset_preferences(&self) -> Result<NotificationPreferences, DomainError> {
        self.preferences.clear().await?;
        Ok(NotificationPreferences::default())
    }

    async fn set_read(&self, id: i64, is_read: bool) -> Result<Notification, DomainError> {
        self.notifications
            .modify(
                id,
                Box::new(move |n: &mut Notification| {
                    n.is_read = is_read;
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| not_found(id))
    }
}
