//! Post handlers - feed, lifecycle, votes, polls and per-viewer flags.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use agora_core::domain::{ContentKind, DraftContent, PostChanges, PostDraft, VoteDirection};
use agora_core::{FeedQuery, SortMode};
use agora_shared::dto::{
    CreatePostRequest, FeedParams, FlagResponse, PollStatusResponse, PollVoteRequest,
    UpdatePostRequest, VoteRequest,
};
use agora_shared::{ApiResponse, Page};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve feed query parameters against the configured page size.
pub(crate) fn feed_query(params: FeedParams, default_limit: usize) -> AppResult<FeedQuery> {
    let sort = match params.sort.as_deref() {
        Some(raw) => raw.parse::<SortMode>()?,
        None => SortMode::default(),
    };
    let content = params
        .content
        .as_deref()
        .map(str::parse::<ContentKind>)
        .transpose()?;

    Ok(FeedQuery {
        sort,
        limit: params.limit.unwrap_or(default_limit),
        offset: params.offset.unwrap_or(0),
        content,
    })
}

fn draft_content(req: &CreatePostRequest) -> AppResult<DraftContent> {
    let kind: ContentKind = req.post_type.parse()?;
    let url = || {
        req.url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("A {} post needs a url", req.post_type)))
    };

    Ok(match kind {
        ContentKind::Text => DraftContent::Text,
        ContentKind::Image => DraftContent::Image {
            url: url()?,
            thumbnail_url: req.thumbnail_url.clone(),
        },
        ContentKind::Video => DraftContent::Video { url: url()? },
        ContentKind::Link => DraftContent::Link { url: url()? },
        ContentKind::Poll => DraftContent::Poll {
            options: req.poll_options.clone(),
            duration_days: req.poll_duration_days.unwrap_or(1),
        },
    })
}

/// GET /api/posts
pub async fn feed(
    state: web::Data<AppState>,
    params: web::Query<FeedParams>,
) -> AppResult<HttpResponse> {
    let query = feed_query(params.into_inner(), state.feed_page_size)?;
    let page = state.posts.feed(&query).await?;
    let page = Page::new(page.posts, query.offset, query.limit, page.has_more);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let content = draft_content(&req)?;

    let draft = PostDraft {
        title: req.title,
        body: req.body,
        author: req.author,
        community: req.community,
        content,
        flair: req.flair,
        nsfw: req.nsfw,
        spoiler: req.spoiler,
        original_content: req.original_content,
    };
    let post = state.posts.create(draft).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        body: req.body,
        flair: req.flair,
        pinned: req.pinned,
        nsfw: req.nsfw,
        spoiler: req.spoiler,
    };
    let post = state.posts.update(path.into_inner(), changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Post deleted")))
}

/// POST /api/posts/{id}/vote
pub async fn vote(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let direction: VoteDirection = body.direction.parse()?;
    let post = state.posts.vote(path.into_inner(), direction).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/like
pub async fn like(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.posts.like(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/posts/{id}/poll
pub async fn poll_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    let poll = post
        .poll()
        .ok_or_else(|| AppError::BadRequest("Post has no poll".to_string()))?;

    let now = Utc::now();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(PollStatusResponse {
        post_id: post.id,
        active: poll.is_open(now),
        total_votes: poll.total_votes(),
        time_remaining: poll.time_remaining(now),
    })))
}

/// POST /api/posts/{id}/poll/vote
pub async fn poll_vote(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PollVoteRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post = state
        .posts
        .vote_poll(path.into_inner(), req.option_index, &req.voter)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(post, "Vote recorded")))
}

/// POST /api/posts/{id}/poll/end
pub async fn end_poll(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post = state.posts.end_poll(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/save
pub async fn save(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.save(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: true })))
}

/// DELETE /api/posts/{id}/save
pub async fn unsave(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.unsave(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: false })))
}

/// POST /api/posts/{id}/hide
pub async fn hide(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.hide(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: true })))
}

/// DELETE /api/posts/{id}/hide
pub async fn unhide(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.unhide(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: false })))
}

/// GET /api/posts/saved
pub async fn saved(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.saved().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/hidden
pub async fn hidden(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.hidden().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}
