//! User handlers - karma and the viewer's block list.

use actix_web::{HttpResponse, web};

use agora_shared::ApiResponse;
use agora_shared::dto::{BlockResponse, KarmaResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users/{username}/karma
pub async fn karma(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let karma = state.users.karma(&username).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(KarmaResponse { username, karma })))
}

/// GET /api/users/blocked
pub async fn blocked(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.users.blocked().await)))
}

/// POST /api/users/{username}/block
pub async fn block(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let added = state.users.block(&username).await?;
    let response = BlockResponse {
        username,
        blocked: true,
    };
    let message = if added { "User blocked" } else { "User was already blocked" };
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(response, message)))
}

/// DELETE /api/users/{username}/block
pub async fn unblock(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    state.users.unblock(&username).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(BlockResponse {
        username,
        blocked: false,
    })))
}
