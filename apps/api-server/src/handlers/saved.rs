//! Saved content handlers - the saved list, categories and bulk actions.

use actix_web::{HttpResponse, web};

use agora_core::domain::{SavedItem, SavedKind};
use agora_shared::ApiResponse;
use agora_shared::dto::{
    AssignCategoryRequest, BulkCategorizeRequest, BulkIdsRequest, BulkItemsRequest,
    CategoryRequest, ItemCategoryResponse, SavedItemDto,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn item(kind: &str, id: i64) -> AppResult<SavedItem> {
    let kind: SavedKind = kind.parse()?;
    Ok(SavedItem { kind, id })
}

fn items(dtos: &[SavedItemDto]) -> AppResult<Vec<SavedItem>> {
    dtos.iter().map(|dto| item(&dto.kind, dto.id)).collect()
}

/// GET /api/saved
pub async fn content(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let content = state.saved.content().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(content)))
}

/// GET /api/saved/categories
pub async fn categories(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(state.saved.categories().await)))
}

/// POST /api/saved/categories
pub async fn create_category(
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let categories = state.saved.create_category(&body.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(categories)))
}

/// DELETE /api/saved/categories/{name}
pub async fn delete_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let categories = state.saved.delete_category(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(categories, "Category deleted")))
}

/// GET /api/saved/{type}/{id}/category
pub async fn item_category(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> AppResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    let category = state.saved.category_of(item(&kind, id)?).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ItemCategoryResponse { kind, id, category })))
}

/// PUT /api/saved/{type}/{id}/category
pub async fn assign(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
    body: web::Json<AssignCategoryRequest>,
) -> AppResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    let category = body.into_inner().category;
    state.saved.assign(item(&kind, id)?, &category).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ItemCategoryResponse {
        kind,
        id,
        category: Some(category),
    })))
}

/// DELETE /api/saved/{type}/{id}/category
pub async fn unassign(
    state: web::Data<AppState>,
    path: web::Path<(String, i64)>,
) -> AppResult<HttpResponse> {
    let (kind, id) = path.into_inner();
    state.saved.unassign(item(&kind, id)?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ItemCategoryResponse {
        kind,
        id,
        category: None,
    })))
}

/// POST /api/saved/bulk/unsave
pub async fn bulk_unsave(
    state: web::Data<AppState>,
    body: web::Json<BulkItemsRequest>,
) -> AppResult<HttpResponse> {
    let items = items(&body.items)?;
    let outcomes = state.saved.bulk_unsave(&items).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcomes)))
}

/// POST /api/saved/bulk/categorize
pub async fn bulk_categorize(
    state: web::Data<AppState>,
    body: web::Json<BulkCategorizeRequest>,
) -> AppResult<HttpResponse> {
    let items = items(&body.items)?;
    let outcomes = state.saved.bulk_categorize(&items, &body.category).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcomes)))
}

/// POST /api/posts/hidden/bulk-unhide
pub async fn bulk_unhide(
    state: web::Data<AppState>,
    body: web::Json<BulkIdsRequest>,
) -> AppResult<HttpResponse> {
    let outcomes = state.posts.bulk_unhide(&body.ids).await;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcomes)))
}
