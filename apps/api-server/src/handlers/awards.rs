//! Award handlers.

use actix_web::{HttpResponse, web};

use agora_core::domain::{AwardGrant, AwardTarget};
use agora_shared::ApiResponse;
use agora_shared::dto::{AwardSummary, GrantAwardRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/awards
pub async fn catalog(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.awards.catalog())))
}

/// POST /api/posts/{id}/awards
pub async fn grant_to_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<GrantAwardRequest>,
) -> AppResult<HttpResponse> {
    grant(&state, AwardTarget::Post(path.into_inner()), body.into_inner()).await
}

/// POST /api/comments/{id}/awards
pub async fn grant_to_comment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<GrantAwardRequest>,
) -> AppResult<HttpResponse> {
    grant(&state, AwardTarget::Comment(path.into_inner()), body.into_inner()).await
}

/// GET /api/posts/{id}/awards
pub async fn for_post(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    summary(&state, AwardTarget::Post(path.into_inner())).await
}

/// GET /api/comments/{id}/awards
pub async fn for_comment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    summary(&state, AwardTarget::Comment(path.into_inner())).await
}

/// DELETE /api/awards/grants/{id}
pub async fn revoke(state: web::Data<AppState>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    state.awards.revoke(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Award removed")))
}

async fn grant(
    state: &AppState,
    target: AwardTarget,
    req: GrantAwardRequest,
) -> AppResult<HttpResponse> {
    let grant = state.awards.grant(target, req.award_id, &req.given_by).await?;
    let name = state
        .awards
        .kind(grant.award_id)
        .map(|kind| kind.name.clone())
        .unwrap_or_default();
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(grant, format!("{name} awarded!"))))
}

/// Per-type counts in catalog order, types never granted left out.
async fn summary(state: &AppState, target: AwardTarget) -> AppResult<HttpResponse> {
    let grants = state.awards.grants_for(target).await?;
    let summaries: Vec<AwardSummary> = state
        .awards
        .catalog()
        .iter()
        .filter_map(|kind| {
            let count = count_of(&grants, kind.id);
            (count > 0).then(|| AwardSummary {
                award_id: kind.id,
                name: kind.name.clone(),
                count,
            })
        })
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summaries)))
}

fn count_of(grants: &[AwardGrant], award_id: i64) -> usize {
    grants.iter().filter(|g| g.award_id == award_id).count()
}
