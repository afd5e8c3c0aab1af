use super::{Comment, Post};

/// Karma of `author`: net score summed over their posts and comments.
pub fn karma(author: &str, posts: &[Post], comments: &[Comment]) -> i64 {
    let from_posts: i64 = posts
        .iter()
        .filter(|p| p.author.eq_ignore_ascii_case(author))
        .map(Post::score)
        .sum();
    let from_comments: i64 = comments
        .iter()
        .filter(|c| c.author.eq_ignore_ascii_case(author))
        .map(Comment::score)
        .sum();
    from_posts + from_comments
}
