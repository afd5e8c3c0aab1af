//! HTTP handlers and route configuration.

mod awards;
mod comments;
mod communities;
mod health;
mod messages;
mod notifications;
mod posts;
mod saved;
mod users;

use actix_web::web;

use crate::middleware::error::{json_error, path_error, query_error};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .route("/awards", web::get().to(awards::catalog))
                .route("/awards/grants/{id}", web::delete().to(awards::revoke))
                .route("/users/blocked", web::get().to(users::blocked))
                .route("/users/{username}/karma", web::get().to(users::karma))
                .route("/users/{username}/block", web::post().to(users::block))
                .route("/users/{username}/block", web::delete().to(users::unblock))
                .route("/messages/{id}/report", web::post().to(messages::report))
                .service(post_routes())
                .service(comment_routes())
                .service(community_routes())
                .service(notification_routes())
                .service(conversation_routes())
                .service(saved_routes()),
        );
}

fn post_routes() -> actix_web::Scope {
    // Fixed segments go before `/{id}` so they are not read as ids.
    web::scope("/posts")
        .route("", web::get().to(posts::feed))
        .route("", web::post().to(posts::create))
        .route("/saved", web::get().to(posts::saved))
        .route("/hidden", web::get().to(posts::hidden))
        .route("/hidden/bulk-unhide", web::post().to(saved::bulk_unhide))
        .route("/{id}", web::get().to(posts::get))
        .route("/{id}", web::patch().to(posts::update))
        .route("/{id}", web::delete().to(posts::delete))
        .route("/{id}/vote", web::post().to(posts::vote))
        .route("/{id}/like", web::post().to(posts::like))
        .route("/{id}/poll", web::get().to(posts::poll_status))
        .route("/{id}/poll/vote", web::post().to(posts::poll_vote))
        .route("/{id}/poll/end", web::post().to(posts::end_poll))
        .route("/{id}/save", web::post().to(posts::save))
        .route("/{id}/save", web::delete().to(posts::unsave))
        .route("/{id}/hide", web::post().to(posts::hide))
        .route("/{id}/hide", web::delete().to(posts::unhide))
        .route("/{id}/comments", web::get().to(comments::by_post))
        .route("/{id}/comments", web::post().to(comments::create))
        .route("/{id}/thread", web::get().to(comments::thread))
        .route("/{id}/awards", web::get().to(awards::for_post))
        .route("/{id}/awards", web::post().to(awards::grant_to_post))
}

fn comment_routes() -> actix_web::Scope {
    web::scope("/comments")
        .route("/saved", web::get().to(comments::saved))
        .route("/{id}", web::get().to(comments::get))
        .route("/{id}", web::patch().to(comments::edit))
        .route("/{id}", web::delete().to(comments::delete))
        .route("/{id}/vote", web::post().to(comments::vote))
        .route("/{id}/like", web::post().to(comments::like))
        .route("/{id}/save", web::post().to(comments::save))
        .route("/{id}/save", web::delete().to(comments::unsave))
        .route("/{id}/awards", web::get().to(awards::for_comment))
        .route("/{id}/awards", web::post().to(awards::grant_to_comment))
}

fn community_routes() -> actix_web::Scope {
    web::scope("/communities")
        .route("", web::get().to(communities::list))
        .route("", web::post().to(communities::create))
        .route("/popular", web::get().to(communities::popular))
        .route("/trending", web::get().to(communities::trending))
        .route("/search", web::get().to(communities::search))
        .route("/available/{name}", web::get().to(communities::availability))
        .route("/{name}", web::get().to(communities::get))
        .route("/{name}", web::patch().to(communities::update))
        .route("/{name}", web::delete().to(communities::delete))
        .route("/{name}/rules", web::get().to(communities::community_rules))
        .route("/{name}/moderators", web::get().to(communities::moderators))
        .route("/{name}/posts", web::get().to(communities::feed))
        .route("/{name}/stats", web::get().to(communities::stats))
        .route("/{name}/related", web::get().to(communities::related))
}

fn notification_routes() -> actix_web::Scope {
    web::scope("/notifications")
        .route("", web::get().to(notifications::list))
        .route("", web::post().to(notifications::create))
        .route("", web::delete().to(notifications::clear_all))
        .route("/unread-count", web::get().to(notifications::unread_count))
        .route("/read-all", web::post().to(notifications::mark_all_read))
        .route("/preferences", web::get().to(notifications::preferences))
        .route("/preferences", web::put().to(notifications::update_preferences))
        .route("/preferences", web::delete().to(notifications::reset_preferences))
        .route("/{id}", web::delete().to(notifications::delete))
        .route("/{id}/read", web::post().to(notifications::mark_read))
        .route("/{id}/unread", web::post().to(notifications::mark_unread))
}

fn conversation_routes() -> actix_web::Scope {
    web::scope("/conversations")
        .route("", web::get().to(messages::list))
        .route("", web::post().to(messages::start))
        .route("/unread-count", web::get().to(messages::unread_count))
        .route("/{id}", web::get().to(messages::get))
        .route("/{id}", web::delete().to(messages::delete))
        .route("/{id}/messages", web::get().to(messages::messages))
        .route("/{id}/messages", web::post().to(messages::send))
        .route("/{id}/thread", web::get().to(messages::thread))
        .route("/{id}/read", web::post().to(messages::mark_read))
        .route("/{id}/unread", web::post().to(messages::mark_unread))
}

fn saved_routes() -> actix_web::Scope {
    web::scope("/saved")
        .route("", web::get().to(saved::content))
        .route("/categories", web::get().to(saved::categories))
        .route("/categories", web::post().to(saved::create_category))
        .route("/categories/{name}", web::delete().to(saved::delete_category))
        .route("/bulk/unsave", web::post().to(saved::bulk_unsave))
        .route("/bulk/categorize", web::post().to(saved::bulk_categorize))
        .route("/{type}/{id}/category", web::get().to(saved::item_category))
        .route("/{type}/{id}/category", web::put().to(saved::assign))
        .route("/{type}/{id}/category", web::delete().to(saved::unassign))
}
