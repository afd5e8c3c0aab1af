//! Conversation and message handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use serde_json::value::RawValue;

use agora_core::thread::count_nodes;
use agora_shared::ApiResponse;
use agora_shared::dto::{
    ConversationParams, CountResponse, ReportRequest, SendMessageRequest, StartConversationRequest,
};

use super::comments::render_forest;
use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageThreadResponse {
    pub conversation_id: i64,
    pub total: usize,
    pub messages: Box<RawValue>,
}

/// GET /api/conversations?q=
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<ConversationParams>,
) -> AppResult<HttpResponse> {
    let conversations = match params.q.as_deref() {
        Some(query) => state.messages.search(query).await?,
        None => state.messages.visible().await?,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversations)))
}

/// POST /api/conversations
pub async fn start(
    state: web::Data<AppState>,
    body: web::Json<StartConversationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let conversation = state.messages.start(&req.participant, req.message).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(conversation)))
}

/// GET /api/conversations/unread-count
pub async fn unread_count(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.messages.unread_count().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// GET /api/conversations/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let conversation = state.messages.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(conversation)))
}

/// DELETE /api/conversations/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.messages.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Conversation deleted")))
}

/// GET /api/conversations/{id}/messages
pub async fn messages(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let messages = state.messages.messages(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(messages)))
}

/// POST /api/conversations/{id}/messages
pub async fn send(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<SendMessageRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let req = body.into_inner();
    let message = match req.parent_id {
        Some(parent_id) => {
            state
                .messages
                .reply(id, parent_id, &req.sender, req.content)
                .await?
        }
        None => state.messages.send(id, &req.sender, req.content).await?,
    };
    Ok(HttpResponse::Created().json(ApiResponse::ok(message)))
}

/// GET /api/conversations/{id}/thread
pub async fn thread(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let conversation_id = path.into_inner();
    let forest = state.messages.thread(conversation_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(MessageThreadResponse {
        conversation_id,
        total: count_nodes(&forest),
        messages: render_forest(&forest)?,
    })))
}

/// POST /api/conversations/{id}/read
pub async fn mark_read(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let count = state.messages.mark_read(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/conversations/{id}/unread
pub async fn mark_unread(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let changed = state.messages.mark_unread(path.into_inner()).await?;
    let count = usize::from(changed);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/messages/{id}/report
pub async fn report(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ReportRequest>,
) -> AppResult<HttpResponse> {
    let message = state
        .messages
        .report_spam(path.into_inner(), &body.reason)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(message, "Message reported")))
}
