//! Data Transfer Objects - request/response types for the API.
//!
//! Enumerated fields (sort mode, vote direction, content type) travel as
//! plain strings and are parsed by the server.

use serde::{Deserialize, Serialize};

/// Query string of a feed page, e.g. `?sort=topWeek&limit=10&offset=20`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Content type filter: `text`, `image`, `video`, `link` or `poll`.
    #[serde(rename = "type")]
    pub content: Option<String>,
}

/// Request to publish a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub author: String,
    pub community: String,
    #[serde(rename = "type", default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub poll_options: Vec<String>,
    #[serde(default)]
    pub poll_duration_days: Option<u32>,
    #[serde(default)]
    pub flair: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub spoiler: bool,
    #[serde(default)]
    pub original_content: bool,
}

fn default_post_type() -> String {
    "text".to_string()
}

/// Partial update of a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub flair: Option<String>,
    pub pinned: Option<bool>,
    pub nsfw: Option<bool>,
    pub spoiler: Option<bool>,
}

/// `{"direction": "up"}` or `{"direction": "down"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVoteRequest {
    pub option_index: usize,
    pub voter: String,
}

/// Poll state with the remaining time already formatted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollStatusResponse {
    pub post_id: i64,
    pub active: bool,
    pub total_votes: u32,
    pub time_remaining: String,
}

/// Result of a save/hide toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub id: i64,
    pub flagged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditCommentRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDto {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creator: String,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommunityRequest {
    pub description: Option<String>,
    pub nsfw: Option<bool>,
    pub topics: Option<Vec<String>>,
    pub rules: Option<Vec<RuleDto>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameAvailabilityResponse {
    pub name: String,
    pub available: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationParams {
    pub kind: Option<String>,
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAwardRequest {
    pub award_id: i64,
    pub given_by: String,
}

/// Grants of one award type on a target, e.g. "Gold x2".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardSummary {
    pub award_id: i64,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KarmaResponse {
    pub username: String,
    pub karma: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResponse {
    pub username: String,
    pub blocked: bool,
}

/// A saved post or comment, as `{"type": "post", "id": 4}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItemDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemsRequest {
    pub items: Vec<SavedItemDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCategorizeRequest {
    pub items: Vec<SavedItemDto>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIdsRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCategoryRequest {
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCategoryResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationRequest {
    pub participant: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_post_defaults_to_text() {
        let req: CreatePostRequest = serde_json::from_str(
            r#"{"title":"Hi","author":"ann","community":"rust"}"#,
        )
        .unwrap();
        assert_eq!(req.post_type, "text");
        assert!(req.poll_options.is_empty());
        assert!(!req.nsfw);
    }

    #[test]
    fn poll_post_fields_are_camel_case() {
        let req: CreatePostRequest = serde_json::from_str(
            r#"{"title":"Pick","author":"ann","community":"rust","type":"poll",
                "pollOptions":["a","b"],"pollDurationDays":3}"#,
        )
        .unwrap();
        assert_eq!(req.post_type, "poll");
        assert_eq!(req.poll_options, vec!["a", "b"]);
        assert_eq!(req.poll_duration_days, Some(3));
    }

    #[test]
    fn saved_items_use_type_and_messages_default_to_top_level() {
        let req: BulkItemsRequest =
            serde_json::from_str(r#"{"items":[{"type":"comment","id":4}]}"#).unwrap();
        assert_eq!(req.items[0].kind, "comment");

        let msg: SendMessageRequest =
            serde_json::from_str(r#"{"sender":"ann","content":"hi"}"#).unwrap();
        assert_eq!(msg.parent_id, None);
    }

    #[test]
    fn feed_params_read_type_filter() {
        let params: FeedParams = serde_json::from_str(r#"{"sort":"new","type":"image"}"#).unwrap();
        assert_eq!(params.sort.as_deref(), Some("new"));
        assert_eq!(params.content.as_deref(), Some("image"));
        assert_eq!(params.limit, None);
    }
}
