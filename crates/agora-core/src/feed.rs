//! Feed ranking.
//!
//! Orders posts by one of six sort modes, surfaces pinned posts first and
//! slices out a page. Everything here is pure: the caller supplies the posts
//! and the reference time.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ContentKind, Post};
use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: usize = 10;

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Net score plus half a point per comment.
    #[default]
    Hot,
    /// Newest first.
    New,
    /// Net score.
    TopAllTime,
    /// Net score, last seven days only.
    TopWeek,
    /// Most balanced disagreement first.
    Controversial,
    /// Net score per hour of age, last day only.
    Rising,
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Hot,
        SortMode::New,
        SortMode::TopAllTime,
        SortMode::TopWeek,
        SortMode::Controversial,
        SortMode::Rising,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Hot => "hot",
            SortMode::New => "new",
            SortMode::TopAllTime => "topAllTime",
            SortMode::TopWeek => "topWeek",
            SortMode::Controversial => "controversial",
            SortMode::Rising => "rising",
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown sort mode '{s}'")))
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which slice of which ordering to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery {
    pub sort: SortMode,
    pub limit: usize,
    pub offset: usize,
    pub content: Option<ContentKind>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            sort: SortMode::Hot,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            content: None,
        }
    }
}

fn hot_score(post: &Post) -> f64 {
    post.score() as f64 + 0.5 * f64::from(post.comment_count)
}

/// How far the up/down ratio is from an even split. The divisor is floored
/// at one so posts without downvotes still get a finite ratio.
fn ratio_distance(post: &Post) -> f64 {
    let ratio = f64::from(post.votes.upvotes) / f64::from(post.votes.downvotes.max(1));
    (1.0 - ratio).abs()
}

fn age_hours(post: &Post, now: DateTime<Utc>) -> f64 {
    (now - post.created_at).num_milliseconds() as f64 / HOUR_MS
}

fn rise_rate(post: &Post, now: DateTime<Utc>) -> f64 {
    post.score() as f64 / age_hours(post, now).max(1.0)
}

fn by_controversy(a: &Post, b: &Post) -> Ordering {
    let a_min = a.votes.upvotes.min(a.votes.downvotes);
    let b_min = b.votes.upvotes.min(b.votes.downvotes);
    b_min
        .cmp(&a_min)
        .then_with(|| ratio_distance(a).total_cmp(&ratio_distance(b)))
}

/// Filter and order `posts` for `sort`, pinned posts first.
///
/// The sort is stable, so posts that tie keep their input order.
pub fn rank(posts: Vec<Post>, sort: SortMode, now: DateTime<Utc>) -> Vec<Post> {
    let mut ranked = posts;

    match sort {
        SortMode::Hot => {
            ranked.sort_by(|a, b| hot_score(b).total_cmp(&hot_score(a)));
        }
        SortMode::New => {
            ranked.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortMode::TopAllTime => {
            ranked.sort_by_key(|p| std::cmp::Reverse(p.score()));
        }
        SortMode::TopWeek => {
            let week_ago = now - Duration::days(7);
            ranked.retain(|p| p.created_at >= week_ago);
            ranked.sort_by_key(|p| std::cmp::Reverse(p.score()));
        }
        SortMode::Controversial => {
            ranked.sort_by(by_controversy);
        }
        SortMode::Rising => {
            let day = Duration::hours(24);
            ranked.retain(|p| now - p.created_at < day);
            ranked.sort_by(|a, b| rise_rate(b, now).total_cmp(&rise_rate(a, now)));
        }
    }

    let (pinned, regular): (Vec<Post>, Vec<Post>) = ranked.into_iter().partition(|p| p.pinned);
    pinned.into_iter().chain(regular).collect()
}

/// Apply the content filter, rank and return the requested page.
///
/// Time-window modes filter before slicing, so a page can be short even when
/// more posts exist overall.
pub fn page(posts: Vec<Post>, query: &FeedQuery, now: DateTime<Utc>) -> Vec<Post> {
    window(posts, query, now).posts
}

/// A page of ranked posts and whether the ranking continues past it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub has_more: bool,
}

/// Like [`page`], but also reports whether at least one more post follows
/// the window. One extra post is taken past the limit to find out.
pub fn window(posts: Vec<Post>, query: &FeedQuery, now: DateTime<Utc>) -> FeedPage {
    let candidates = match query.content {
        Some(kind) => posts.into_iter().filter(|p| p.kind() == kind).collect(),
        None => posts,
    };

    let mut posts: Vec<Post> = rank(candidates, query.sort, now)
        .into_iter()
        .skip(query.offset)
        .take(query.limit.saturating_add(1))
        .collect();
    let has_more = posts.len() > query.limit;
    posts.truncate(query.limit);
    FeedPage { posts, has_more }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LikeState, PostContent, VoteTally};

    fn post(id: i64, up: u32, down: u32, comments: u32, hours_ago: i64, now: DateTime<Utc>) -> Post {
        Post {
            id,
            title: format!("post {id}"),
            body: String::new(),
            author: "tester".into(),
            community: "general".into(),
            content: PostContent::Text,
            votes: VoteTally::new(up, down),
            likes: LikeState::default(),
            comment_count: comments,
            pinned: false,
            flair: None,
            nsfw: false,
            spoiler: false,
            original_content: false,
            created_at: now - Duration::hours(hours_ago),
        }
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn hot_puts_pinned_first_on_tie() {
        let now = Utc::now();
        let mut pinned = post(2, 5, 1, 2, 1, now);
        pinned.pinned = true;
        let posts = vec![post(1, 5, 1, 2, 1, now), pinned];

        assert_eq!(ids(&rank(posts, SortMode::Hot, now)), vec![2, 1]);
    }

    #[test]
    fn hot_counts_half_point_per_comment() {
        let now = Utc::now();
        let posts = vec![post(1, 10, 0, 0, 1, now), post(2, 9, 0, 4, 1, now)];

        assert_eq!(ids(&rank(posts, SortMode::Hot, now)), vec![2, 1]);
    }

    #[test]
    fn new_is_non_increasing_in_time() {
        let now = Utc::now();
        let posts = vec![
            post(1, 0, 0, 0, 30, now),
            post(2, 0, 0, 0, 2, now),
            post(3, 0, 0, 0, 400, now),
            post(4, 0, 0, 0, 2, now),
        ];

        let ranked = rank(posts, SortMode::New, now);
        assert!(ranked.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(ids(&ranked), vec![2, 4, 1, 3]);
    }

    #[test]
    fn pinned_posts_lead_in_every_mode() {
        let now = Utc::now();
        let mut posts: Vec<Post> = (1..=8)
            .map(|i| post(i, (i * 7 % 11) as u32, (i * 3 % 5) as u32, i as u32, i * 2, now))
            .collect();
        posts[3].pinned = true;
        posts[6].pinned = true;

        for mode in SortMode::ALL {
            let ranked = rank(posts.clone(), mode, now);
            let first_regular = ranked.iter().position(|p| !p.pinned).unwrap_or(ranked.len());
            assert!(
                ranked[first_regular..].iter().all(|p| !p.pinned),
                "pinned post after regular one in {mode}"
            );
        }
    }

    #[test]
    fn top_week_drops_old_posts() {
        let now = Utc::now();
        let posts = vec![
            post(1, 100, 0, 0, 24 * 8, now),
            post(2, 3, 0, 0, 24 * 6, now),
            post(3, 10, 2, 0, 1, now),
        ];

        assert_eq!(ids(&rank(posts.clone(), SortMode::TopWeek, now)), vec![3, 2]);
        assert_eq!(ids(&rank(posts, SortMode::TopAllTime, now)), vec![1, 3, 2]);
    }

    #[test]
    fn controversial_prefers_balanced_disagreement() {
        let now = Utc::now();
        let posts = vec![
            post(1, 50, 2, 0, 1, now),
            post(2, 12, 10, 0, 1, now),
            post(3, 10, 10, 0, 1, now),
            post(4, 30, 0, 0, 1, now),
        ];

        // 2 and 3 tie on min(up, down); 3 has the even split.
        assert_eq!(ids(&rank(posts, SortMode::Controversial, now)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn controversial_guards_zero_downvotes() {
        let now = Utc::now();
        let posts = vec![post(1, 9, 0, 0, 1, now), post(2, 1, 0, 0, 1, now)];

        // ratio 9/1 vs 1/1: the second sits exactly on an even split.
        assert_eq!(ids(&rank(posts, SortMode::Controversial, now)), vec![2, 1]);
    }

    #[test]
    fn rising_rewards_fast_accumulation_in_last_day() {
        let now = Utc::now();
        let posts = vec![
            post(1, 40, 0, 0, 20, now),
            post(2, 10, 0, 0, 1, now),
            post(3, 500, 0, 0, 30, now),
        ];

        // 40/20 = 2 per hour, 10/1 = 10 per hour; post 3 is too old.
        assert_eq!(ids(&rank(posts, SortMode::Rising, now)), vec![2, 1]);
    }

    #[test]
    fn page_slices_after_filtering() {
        let now = Utc::now();
        let mut posts: Vec<Post> = (1..=5).map(|i| post(i, i as u32, 0, 0, 1, now)).collect();
        posts[0].content = PostContent::Link {
            url: "https://example.com".into(),
        };

        let query = FeedQuery {
            sort: SortMode::TopAllTime,
            limit: 2,
            offset: 1,
            content: None,
        };
        assert_eq!(ids(&page(posts.clone(), &query, now)), vec![4, 3]);

        let links = FeedQuery {
            content: Some(ContentKind::Link),
            ..query
        };
        assert!(page(posts.clone(), &links, now).is_empty());

        let first_link = FeedQuery { offset: 0, ..links };
        assert_eq!(ids(&page(posts, &first_link, now)), vec![1]);
    }

    #[test]
    fn window_knows_when_the_ranking_ends() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=4).map(|i| post(i, i as u32, 0, 0, 1, now)).collect();
        let query = |offset, limit| FeedQuery {
            sort: SortMode::TopAllTime,
            limit,
            offset,
            content: None,
        };

        let first = window(posts.clone(), &query(0, 2), now);
        assert_eq!(ids(&first.posts), vec![4, 3]);
        assert!(first.has_more);

        // Exactly the remaining posts: full page, nothing after it.
        let last = window(posts.clone(), &query(2, 2), now);
        assert_eq!(ids(&last.posts), vec![2, 1]);
        assert!(!last.has_more);

        let everything = window(posts, &query(0, 4), now);
        assert_eq!(everything.posts.len(), 4);
        assert!(!everything.has_more);
    }

    #[test]
    fn empty_input_gives_empty_page() {
        assert!(page(Vec::new(), &FeedQuery::default(), Utc::now()).is_empty());
    }

    #[test]
    fn ranking_is_deterministic() {
        let now = Utc::now();
        let posts: Vec<Post> = (1..=6).map(|i| post(i, 3, 1, 0, 1, now)).collect();

        let first = rank(posts.clone(), SortMode::Hot, now);
        let second = rank(posts, SortMode::Hot, now);
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(ids(&first), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn parses_sort_modes() {
        assert_eq!("topWeek".parse::<SortMode>(), Ok(SortMode::TopWeek));
        assert!("best".parse::<SortMode>().is_err());
    }
}
