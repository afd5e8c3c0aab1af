//! Post service - feed pages, post lifecycle, votes, polls and flags.

use std::sync::Arc;

use chrono::Utc;

use super::flags::{
    CategoryAssignments, FlagList, HIDDEN_POSTS_KEY, SAVED_COMMENTS_KEY, SAVED_POSTS_KEY,
};
use crate::domain::{
    AwardGrant, AwardTarget, BulkOutcome, Comment, Post, PostChanges, PostDraft, SavedItem,
    Votable, VoteDirection,
};
use crate::error::{DomainError, RepoError};
use crate::feed::{self, FeedPage, FeedQuery};
use crate::ports::{
    AwardRepository, CommentRepository, CommunityRepository, LocalStore, PostRepository, Record,
};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    communities: Arc<dyn CommunityRepository>,
    awards: Arc<dyn AwardRepository>,
    saved: FlagList,
    hidden: FlagList,
    saved_comments: FlagList,
    categories: CategoryAssignments,
}

fn not_found(id: i64) -> DomainError {
    DomainError::not_found(Post::ENTITY, id)
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        communities: Arc<dyn CommunityRepository>,
        awards: Arc<dyn AwardRepository>,
        local: Arc<dyn LocalStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            communities,
            awards,
            saved: FlagList::new(local.clone(), SAVED_POSTS_KEY),
            hidden: FlagList::new(local.clone(), HIDDEN_POSTS_KEY),
            saved_comments: FlagList::new(local.clone(), SAVED_COMMENTS_KEY),
            categories: CategoryAssignments::new(local),
        }
    }

    /// One page of the front-page feed, hidden posts excluded.
    pub async fn feed(&self, query: &FeedQuery) -> Result<FeedPage, DomainError> {
        let posts = self.posts.find_all().await?;
        let page = self.page_visible(posts, query).await;
        tracing::debug!(
            sort = %query.sort,
            returned = page.posts.len(),
            has_more = page.has_more,
            "Feed page ranked"
        );
        Ok(page)
    }

    /// One page of a single community's feed, hidden posts excluded.
    pub async fn community_feed(
        &self,
        community: &str,
        query: &FeedQuery,
    ) -> Result<FeedPage, DomainError> {
        let posts = self.posts.find_by_community(community).await?;
        Ok(self.page_visible(posts, query).await)
    }

    async fn page_visible(&self, mut posts: Vec<Post>, query: &FeedQuery) -> FeedPage {
        let hidden = self.hidden.load().await;
        posts.retain(|post| !hidden.contains(&post.id));
        feed::window(posts, query, Utc::now())
    }

    pub async fn get(&self, id: i64) -> Result<Post, DomainError> {
        self.posts.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, draft: PostDraft) -> Result<Post, DomainError> {
        if self.communities.find_by_name(&draft.community).await?.is_none() {
            return Err(DomainError::not_found("Community", &draft.community));
        }

        let post = Post::publish(draft, Utc::now())?;
        let post = self.posts.insert(post).await?;
        tracing::info!(post_id = post.id, community = %post.community, kind = ?post.kind(), "Post created");
        Ok(post)
    }

    pub async fn update(&self, id: i64, changes: PostChanges) -> Result<Post, DomainError> {
        self.mutate(id, move |post| post.apply(changes)).await
    }

    /// Delete a post along with its comments, the awards given to either,
    /// and every saved, hidden or category flag pointing at them.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        match self.posts.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(not_found(id)),
            Err(e) => return Err(e.into()),
        }

        let comment_ids: Vec<i64> = self
            .comments
            .remove_where(Box::new(move |c: &Comment| c.post_id == id))
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut targets = vec![AwardTarget::Post(id)];
        targets.extend(comment_ids.iter().map(|&c| AwardTarget::Comment(c)));
        let mut items = vec![SavedItem::post(id)];
        items.extend(comment_ids.iter().map(|&c| SavedItem::comment(c)));

        let awards = self
            .awards
            .remove_where(Box::new(move |g: &AwardGrant| targets.contains(&g.target)))
            .await?;
        self.saved.remove(&id).await?;
        self.hidden.remove(&id).await?;
        self.saved_comments.remove_all(&comment_ids).await?;
        self.categories.remove(&items).await?;

        tracing::info!(
            post_id = id,
            comments = comment_ids.len(),
            awards = awards.len(),
            "Post deleted"
        );
        Ok(())
    }

    pub async fn vote(&self, id: i64, direction: VoteDirection) -> Result<Post, DomainError> {
        self.mutate(id, move |post| {
            post.tally_mut().cast(direction);
            Ok(())
        })
        .await
    }

    pub async fn like(&self, id: i64) -> Result<Post, DomainError> {
        self.mutate(id, |post| {
            post.like_state_mut().toggle();
            Ok(())
        })
        .await
    }

    /// Cast `voter`'s vote for the option at `option` in a poll post.
    pub async fn vote_poll(&self, id: i64, option: usize, voter: &str) -> Result<Post, DomainError> {
        let voter = voter.to_string();
        let now = Utc::now();
        self.mutate(id, move |post| {
            post.poll_mut()
                .ok_or_else(|| DomainError::validation("Post has no poll"))?
                .cast(option, &voter, now)
        })
        .await
    }

    pub async fn end_poll(&self, id: i64) -> Result<Post, DomainError> {
        self.mutate(id, |post| {
            post.poll_mut()
                .ok_or_else(|| DomainError::validation("Post has no poll"))?
                .close();
            Ok(())
        })
        .await
    }

    /// Clear the active flag of every poll whose end time has passed.
    pub async fn close_expired_polls(&self) -> Result<usize, DomainError> {
        let now = Utc::now();
        let closed = self
            .posts
            .modify_all(Box::new(move |post: &mut Post| match post.poll_mut() {
                Some(poll) if poll.active && poll.ends_at <= now => {
                    poll.close();
                    true
                }
                _ => false,
            }))
            .await?;
        if closed > 0 {
            tracing::info!(closed, "Expired polls closed");
        }
        Ok(closed)
    }

    pub async fn save(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        self.saved.add(id).await?;
        Ok(())
    }

    pub async fn unsave(&self, id: i64) -> Result<(), DomainError> {
        self.saved.remove(&id).await?;
        Ok(())
    }

    pub async fn hide(&self, id: i64) -> Result<(), DomainError> {
        self.get(id).await?;
        self.hidden.add(id).await?;
        Ok(())
    }

    pub async fn unhide(&self, id: i64) -> Result<(), DomainError> {
        self.hidden.remove(&id).await?;
        Ok(())
    }

    /// Unhide each post, reporting per id. Ids that weren't hidden fail.
    pub async fn bulk_unhide(&self, ids: &[i64]) -> Vec<BulkOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push(match self.hidden.remove(&id).await {
                Ok(true) => BulkOutcome::ok(id),
                Ok(false) => BulkOutcome::failed(id, format!("Post {id} is not hidden")),
                Err(e) => BulkOutcome::failed(id, e),
            });
        }
        tracing::info!(
            requested = ids.len(),
            unhidden = outcomes.iter().filter(|o| o.success).count(),
            "Bulk unhide finished"
        );
        outcomes
    }

    pub async fn is_saved(&self, id: i64) -> bool {
        self.saved.contains(&id).await
    }

    pub async fn is_hidden(&self, id: i64) -> bool {
        self.hidden.contains(&id).await
    }

    pub async fn saved(&self) -> Result<Vec<Post>, DomainError> {
        self.flagged(&self.saved).await
    }

    pub async fn hidden(&self) -> Result<Vec<Post>, DomainError> {
        self.flagged(&self.hidden).await
    }

    async fn flagged(&self, flags: &FlagList) -> Result<Vec<Post>, DomainError> {
        let ids = flags.load().await;
        let mut posts = self.posts.find_all().await?;
        posts.retain(|post| ids.contains(&post.id));
        Ok(posts)
    }

    async fn mutate<F>(&self, id: i64, change: F) -> Result<Post, DomainError>
    where
        F: FnOnce(&mut Post) -> Result<(), DomainError> + Send + 'static,
    {
        self.posts
            .modify(id, Box::new(change))
            .await?
            .ok_or_else(|| not_found(id))
    }
}
