//! Community activity: trending scores, statistics and related communities.
//!
//! Like the feed ranker this works on records the caller already loaded and a
//! reference time it passes in.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Community, Post};

/// Days of posting history a trending score looks at.
pub const TRENDING_WINDOW_DAYS: i64 = 7;
pub const RELATED_LIMIT: usize = 5;

const POST_VELOCITY_WEIGHT: f64 = 0.25;
const ENGAGEMENT_WEIGHT: f64 = 0.25;
const VOTE_VELOCITY_WEIGHT: f64 = 0.1;
const COMMENT_VELOCITY_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingCommunity {
    pub name: String,
    pub description: String,
    pub member_count: u64,
    pub recent_posts: usize,
    /// Comments plus votes per recent post, one decimal.
    pub engagement_rate: f64,
    pub trending_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityStats {
    pub total_members: u64,
    pub total_posts: usize,
    pub posts_today: usize,
    /// Posts per day since the community was created.
    pub avg_daily: f64,
    /// Distinct post authors.
    pub contributors: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCommunity {
    pub name: String,
    pub member_count: u64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Score one community from its posts in the trending window.
pub fn score(community: &Community, posts: &[Post], now: DateTime<Utc>) -> TrendingCommunity {
    let since = now - Duration::days(TRENDING_WINDOW_DAYS);
    let recent: Vec<&Post> = posts
        .iter()
        .filter(|p| p.in_community(&community.name) && p.created_at >= since)
        .collect();

    let comments: f64 = recent.iter().map(|p| f64::from(p.comment_count)).sum();
    let votes: f64 = recent
        .iter()
        .map(|p| f64::from(p.votes.upvotes) + f64::from(p.votes.downvotes))
        .sum();
    let days = TRENDING_WINDOW_DAYS as f64;
    let engagement = (comments + votes) / recent.len().max(1) as f64;

    let trending_score = POST_VELOCITY_WEIGHT * (recent.len() as f64 / days)
        + ENGAGEMENT_WEIGHT * engagement
        + VOTE_VELOCITY_WEIGHT * (votes / days)
        + COMMENT_VELOCITY_WEIGHT * (comments / days);

    TrendingCommunity {
        name: community.name.clone(),
        description: community.description.clone(),
        member_count: community.member_count,
        recent_posts: recent.len(),
        engagement_rate: round_to(engagement, 1),
        trending_score: round_to(trending_score, 2),
    }
}

/// The `limit` most active communities, highest score first.
pub fn trending(
    communities: &[Community],
    posts: &[Post],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<TrendingCommunity> {
    let mut scored: Vec<TrendingCommunity> = communities
        .iter()
        .map(|c| score(c, posts, now))
        .collect();
    scored.sort_by(|a, b| b.trending_score.total_cmp(&a.trending_score));
    scored.truncate(limit);
    scored
}

pub fn stats(community: &Community, posts: &[Post], now: DateTime<Utc>) -> CommunityStats {
    let own: Vec<&Post> = posts
        .iter()
        .filter(|p| p.in_community(&community.name))
        .collect();
    let day_ago = now - Duration::days(1);
    let age_days = (now - community.created_at).num_days().max(1);
    let contributors: HashSet<String> = own.iter().map(|p| p.author.to_lowercase()).collect();

    CommunityStats {
        total_members: community.member_count,
        total_posts: own.len(),
        posts_today: own.iter().filter(|p| p.created_at >= day_ago).count(),
        avg_daily: round_to(own.len() as f64 / age_days as f64, 2),
        contributors: contributors.len(),
        created_at: community.created_at,
    }
}

/// Other communities, most shared topics first, then in `candidates` order.
pub fn related(community: &Community, candidates: &[Community]) -> Vec<RelatedCommunity> {
    let topics: HashSet<String> = community.topics.iter().map(|t| t.to_lowercase()).collect();
    let mut others: Vec<(usize, &Community)> = candidates
        .iter()
        .filter(|c| !c.name.eq_ignore_ascii_case(&community.name))
        .map(|c| {
            let shared = c
                .topics
                .iter()
                .filter(|t| topics.contains(&t.to_lowercase()))
                .count();
            (shared, c)
        })
        .collect();
    others.sort_by(|a, b| b.0.cmp(&a.0));

    others
        .into_iter()
        .take(RELATED_LIMIT)
        .map(|(_, c)| RelatedCommunity {
            name: c.name.clone(),
            member_count: c.member_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostContent, VoteTally};

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(1000)
    }

    fn community(name: &str, topics: &[&str], members: u64) -> Community {
        Community {
            id: 0,
            name: name.into(),
            description: format!("all about {name}"),
            member_count: members,
            post_count: 0,
            nsfw: false,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            rules: Vec::new(),
            moderators: Vec::new(),
            created_at: now() - Duration::days(100),
        }
    }

    fn post(community: &str, author: &str, hours_ago: i64, up: u32, comments: u32) -> Post {
        Post {
            id: 0,
            title: "t".into(),
            body: String::new(),
            author: author.into(),
            community: community.into(),
            content: PostContent::Text,
            votes: VoteTally::new(up, 0),
            likes: Default::default(),
            comment_count: comments,
            pinned: false,
            flair: None,
            nsfw: false,
            spoiler: false,
            original_content: false,
            created_at: now() - Duration::hours(hours_ago),
        }
    }

    #[test]
    fn only_the_trending_window_counts() {
        let rust = community("rust", &[], 10);
        let posts = vec![
            post("rust", "a", 2, 70, 0),
            post("rust", "b", 24 * 8, 10_000, 50),
            post("go", "c", 1, 500, 5),
        ];

        let scored = score(&rust, &posts, now());
        assert_eq!(scored.recent_posts, 1);
        assert_eq!(scored.engagement_rate, 70.0);
        // 0.25 * 1/7 + 0.25 * 70 + 0.1 * 10
        assert_eq!(scored.trending_score, 18.54);
    }

    #[test]
    fn quiet_communities_sink() {
        let communities = vec![
            community("quiet", &[], 1_000_000),
            community("busy", &[], 10),
            community("mid", &[], 10),
        ];
        let posts = vec![
            post("busy", "a", 1, 400, 20),
            post("mid", "b", 1, 40, 2),
        ];

        let names: Vec<String> = trending(&communities, &posts, now(), 2)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["busy", "mid"]);
    }

    #[test]
    fn stats_count_posts_and_distinct_authors() {
        let rust = community("rust", &[], 42);
        let posts = vec![
            post("rust", "ana", 2, 1, 0),
            post("Rust", "ANA", 30, 1, 0),
            post("rust", "bo", 24 * 40, 1, 0),
            post("go", "cy", 1, 1, 0),
        ];

        let stats = stats(&rust, &posts, now());
        assert_eq!(stats.total_members, 42);
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.posts_today, 1);
        assert_eq!(stats.contributors, 2);
        assert_eq!(stats.avg_daily, 0.03);
    }

    #[test]
    fn related_prefers_shared_topics_and_excludes_self() {
        let rust = community("rust", &["programming", "systems"], 1);
        let all = vec![
            community("cooking", &["food"], 1),
            rust.clone(),
            community("golang", &["programming"], 1),
            community("osdev", &["Systems", "programming"], 1),
        ];

        let names: Vec<String> = related(&rust, &all).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["osdev", "golang", "cooking"]);
    }

    #[test]
    fn related_is_capped() {
        let rust = community("rust", &[], 1);
        let all: Vec<Community> = (0..9)
            .map(|i| community(&format!("c{i}"), &[], 1))
            .collect();
        assert_eq!(related(&rust, &all).len(), RELATED_LIMIT);
    }
}
