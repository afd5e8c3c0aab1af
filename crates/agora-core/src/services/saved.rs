//! Saved content - the saved list, categories and bulk actions over it.

use std::sync::Arc;

use super::flags::{
    CategoryAssignments, FlagList, LocalDocument, SAVED_CATEGORIES_KEY, SAVED_COMMENTS_KEY,
    SAVED_POSTS_KEY,
};
use crate::domain::{BulkOutcome, DEFAULT_CATEGORIES, SavedContent, SavedItem, SavedKind};
use crate::error::DomainError;
use crate::ports::{CommentRepository, LocalStore, PostRepository};

pub struct SavedService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    saved_posts: FlagList,
    saved_comments: FlagList,
    categories: LocalDocument<Vec<String>>,
    assignments: CategoryAssignments,
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

impl SavedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            saved_posts: FlagList::new(local.clone(), SAVED_POSTS_KEY),
            saved_comments: FlagList::new(local.clone(), SAVED_COMMENTS_KEY),
            categories: LocalDocument::new(local.clone(), SAVED_CATEGORIES_KEY),
            assignments: CategoryAssignments::new(local),
        }
    }

    fn flags(&self, kind: SavedKind) -> &FlagList {
        match kind {
            SavedKind::Post => &self.saved_posts,
            SavedKind::Comment => &self.saved_comments,
        }
    }

    /// Saved posts and comments that still exist.
    pub async fn content(&self) -> Result<SavedContent, DomainError> {
        let post_ids = self.saved_posts.load().await;
        let comment_ids = self.saved_comments.load().await;

        let mut posts = self.posts.find_all().await?;
        posts.retain(|p| post_ids.contains(&p.id));
        let mut comments = self.comments.find_all().await?;
        comments.retain(|c| comment_ids.contains(&c.id));
        Ok(SavedContent::new(posts, comments))
    }

    pub async fn is_saved(&self, item: SavedItem) -> bool {
        self.flags(item.kind).contains(&item.id).await
    }

    pub async fn categories(&self) -> Vec<String> {
        self.categories.load_or_else(default_categories).await
    }

    /// Add a category; an existing name is left as is.
    pub async fn create_category(&self, name: &str) -> Result<Vec<String>, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("Category name is required"));
        }

        let mut categories = self.categories().await;
        if !categories.iter().any(|c| c == name) {
            categories.push(name.to_string());
            self.categories.save(&categories).await?;
            tracing::debug!(category = name, "Saved category created");
        }
        Ok(categories)
    }

    /// Remove a category and unassign everything filed under it.
    pub async fn delete_category(&self, name: &str) -> Result<Vec<String>, DomainError> {
        let mut categories = self.categories().await;
        let before = categories.len();
        categories.retain(|c| c != name);
        if categories.len() == before {
            return Err(DomainError::not_found("Category", name));
        }

        self.categories.save(&categories).await?;
        let unassigned = self.assignments.clear_category(name).await?;
        tracing::debug!(category = name, unassigned, "Saved category deleted");
        Ok(categories)
    }

    /// File a saved item under an existing category.
    pub async fn assign(&self, item: SavedItem, category: &str) -> Result<(), DomainError> {
        if !self.categories().await.iter().any(|c| c == category) {
            return Err(DomainError::not_found("Category", category));
        }
        if !self.is_saved(item).await {
            return Err(DomainError::validation(format!(
                "{} {} is not saved",
                item.kind.as_str(),
                item.id
            )));
        }
        self.assignments.set(item, category).await
    }

    /// Returns false when the item had no category.
    pub async fn unassign(&self, item: SavedItem) -> Result<bool, DomainError> {
        Ok(self.assignments.remove(&[item]).await? > 0)
    }

    pub async fn category_of(&self, item: SavedItem) -> Option<String> {
        self.assignments.get(item).await
    }

    /// Unsave each item and drop its category.
    pub async fn bulk_unsave(&self, items: &[SavedItem]) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for &item in items {
            outcomes.push(match self.unsave(item).await {
                Ok(()) => BulkOutcome::ok(item.id),
                Err(e) => BulkOutcome::failed(item.id, e),
            });
        }
        tracing::info!(requested = items.len(), "Bulk unsave finished");
        outcomes
    }

    /// File each item under `category`.
    pub async fn bulk_categorize(&self, items: &[SavedItem], category: &str) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for &item in items {
            outcomes.push(match self.assign(item, category).await {
                Ok(()) => BulkOutcome::ok(item.id),
                Err(e) => BulkOutcome::failed(item.id, e),
            });
        }
        outcomes
    }

    async fn unsave(&self, item: SavedItem) -> Result<(), DomainError> {
        if !self.flags(item.kind).remove(&item.id).await? {
            return Err(DomainError::validation(format!(
                "{} {} is not saved",
                item.kind.as_str(),
                item.id
            )));
        }
        self.assignments.remove(&[item]).await?;
        Ok(())
    }
}
