//! Comment handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::value::RawValue;

use agora_core::ThreadNode;
use agora_core::domain::{CommentDraft, VoteDirection};
use agora_core::thread::{count_comments, to_json_string};
use agora_shared::ApiResponse;
use agora_shared::dto::{CreateCommentRequest, EditCommentRequest, FlagResponse, VoteRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub post_id: i64,
    pub total: usize,
    /// Pre-rendered forest; nesting depth is unbounded.
    pub comments: Box<RawValue>,
}

/// Render a reply forest without recursing once per nesting level.
pub(crate) fn render_forest<T: Serialize>(forest: &[ThreadNode<T>]) -> AppResult<Box<RawValue>> {
    let json = to_json_string(forest).map_err(|e| AppError::Internal(e.to_string()))?;
    RawValue::from_string(json).map_err(|e| AppError::Internal(e.to_string()))
}

/// GET /api/posts/{id}/comments
pub async fn by_post(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let comments = state.comments.by_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// GET /api/posts/{id}/thread
pub async fn thread(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let forest = state.comments.thread(post_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ThreadResponse {
        post_id,
        total: count_comments(&forest),
        comments: render_forest(&forest)?,
    })))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = CommentDraft {
        post_id: path.into_inner(),
        parent_id: req.parent_id,
        author: req.author,
        body: req.body,
    };
    let comment = state.comments.create(draft).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}

/// GET /api/comments/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let comment = state.comments.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// PATCH /api/comments/{id}
pub async fn edit(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<EditCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .edit(path.into_inner(), body.into_inner().body)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// DELETE /api/comments/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.comments.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Comment deleted")))
}

/// POST /api/comments/{id}/vote
pub async fn vote(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let direction: VoteDirection = body.direction.parse()?;
    let comment = state.comments.vote(path.into_inner(), direction).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// POST /api/comments/{id}/like
pub async fn like(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let comment = state.comments.like(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// POST /api/comments/{id}/save
pub async fn save(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.comments.save(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: true })))
}

/// DELETE /api/comments/{id}/save
pub async fn unsave(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.comments.unsave(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(FlagResponse { id, flagged: false })))
}

/// GET /api/comments/saved
pub async fn saved(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let comments = state.comments.saved().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}
