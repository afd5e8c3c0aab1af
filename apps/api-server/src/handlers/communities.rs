//! Community handlers.

use actix_web::{HttpResponse, web};

use agora_core::domain::{CommunityChanges, CommunityDraft, CommunityRule};
use agora_shared::dto::{
    CreateCommunityRequest, FeedParams, LimitParams, NameAvailabilityResponse, RuleDto,
    SearchParams, UpdateCommunityRequest,
};
use agora_shared::{ApiResponse, Page};

use super::posts::feed_query;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const DEFAULT_POPULAR_LIMIT: usize = 5;
const DEFAULT_TRENDING_LIMIT: usize = 10;

fn rules(dtos: Vec<RuleDto>) -> Vec<CommunityRule> {
    dtos.into_iter()
        .map(|r| CommunityRule {
            title: r.title,
            description: r.description,
        })
        .collect()
}

/// GET /api/communities
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let communities = state.communities.list().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(communities)))
}

/// GET /api/communities/popular?limit=5
pub async fn popular(
    state: web::Data<AppState>,
    params: web::Query<LimitParams>,
) -> AppResult<HttpResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
    let communities = state.communities.popular(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(communities)))
}

/// GET /api/communities/search?q=term
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let communities = state.communities.search(&params.q).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(communities)))
}

/// GET /api/communities/available/{name}
pub async fn availability(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let available = state.communities.is_name_available(&name).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(NameAvailabilityResponse { name, available })))
}

/// POST /api/communities
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreateCommunityRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = CommunityDraft {
        name: req.name,
        description: req.description,
        creator: req.creator,
        nsfw: req.nsfw,
        topics: req.topics,
        rules: rules(req.rules),
    };
    let community = state.communities.create(draft).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(community)))
}

/// GET /api/communities/{name}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let community = state.communities.get(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(community)))
}

/// PATCH /api/communities/{name}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateCommunityRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = CommunityChanges {
        description: req.description,
        nsfw: req.nsfw,
        topics: req.topics,
        rules: req.rules.map(rules),
    };
    let community = state.communities.update(&path, changes).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(community)))
}

/// DELETE /api/communities/{name}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.communities.delete(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::done("Community deleted")))
}

/// GET /api/communities/{name}/rules
pub async fn community_rules(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let rules = state.communities.rules(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(rules)))
}

/// GET /api/communities/{name}/moderators
pub async fn moderators(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let moderators = state.communities.moderators(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(moderators)))
}

/// GET /api/communities/{name}/posts
pub async fn feed(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<FeedParams>,
) -> AppResult<HttpResponse> {
    let community = state.communities.get(&path).await?;
    let query = feed_query(params.into_inner(), state.feed_page_size)?;
    let page = state.posts.community_feed(&community.name, &query).await?;
    let page = Page::new(page.posts, query.offset, query.limit, page.has_more);
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page)))
}

/// GET /api/communities/trending?limit=10
pub async fn trending(
    state: web::Data<AppState>,
    params: web::Query<LimitParams>,
) -> AppResult<HttpResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_TRENDING_LIMIT);
    let trending = state.communities.trending(limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(trending)))
}

/// GET /api/communities/{name}/stats
pub async fn stats(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let stats = state.communities.stats(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(stats)))
}

/// GET /api/communities/{name}/related
pub async fn related(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let related = state.communities.related(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(related)))
}
