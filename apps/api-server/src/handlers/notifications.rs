//! Notification handlers.

use actix_web::{HttpResponse, web};

use agora_core::domain::{NotificationKind, NotificationPreferences};
use agora_shared::ApiResponse;
use agora_shared::dto::{CountResponse, CreateNotificationRequest, NotificationParams};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/notifications?kind=reply&unread=true
pub async fn list(
    state: web::Data<AppState>,
    params: web::Query<NotificationParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let mut notifications = match params.kind.as_deref() {
        Some(raw) => {
            let kind: NotificationKind = raw.parse()?;
            state.notifications.by_kind(kind).await?
        }
        None => state.notifications.list().await?,
    };
    if params.unread {
        notifications.retain(|n| !n.is_read);
    }
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notifications)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.notifications.unread_count().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/notifications
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateNotificationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let kind: NotificationKind = req.kind.parse()?;
    let notification = state
        .notifications
        .create(kind, req.message, req.post_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(notification)))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let notification = state.notifications.mark_read(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notification)))
}

/// POST /api/notifications/{id}/unread
pub async fn mark_unread(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let notification = state.notifications.mark_unread(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(notification)))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.notifications.mark_all_read().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// DELETE /api/notifications/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.notifications.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Notification deleted")))
}

/// DELETE /api/notifications
pub async fn clear_all(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    state.notifications.clear_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Notifications cleared")))
}

/// GET /api/notifications/preferences
pub async fn preferences(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.notifications.preferences().await)))
}

/// PUT /api/notifications/preferences
pub async fn update_preferences(
    state: web::Data<AppState>,
    body: web::Json<NotificationPreferences>,
) -> AppResult<HttpResponse> {
    let preferences = state
        .notifications
        .update_preferences(body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(preferences)))
}

/// DELETE /api/notifications/preferences
pub async fn reset_preferences(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let preferences = state.notifications.reset_preferences().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(preferences, "Preferences reset")))
}
