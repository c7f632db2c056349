use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Read-only endpoints backing the marketing site. Unauthenticated; every handler
/// here only reads.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /players
        .route("/players", get(handlers::list_players))
        // GET /blogs?category=...&search=...
        .route("/blogs", get(handlers::list_blogs))
        // GET /news?category=...&search=...
        // The featured article is picked before filtering, so it never disappears
        // because of the active category.
        .route("/news", get(handlers::get_news_feed))
        // GET /videos?category=...
        .route("/videos", get(handlers::get_video_feed))
        // GET /sponsors
        // Grouped by tier, highest tier first; empty tiers are left out.
        .route("/sponsors", get(handlers::get_sponsors_by_tier))
}
