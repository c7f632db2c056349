use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, put},
};

/// Admin Router Module
///
/// The back-office. Every route below is mounted behind the session-check
/// middleware in `create_router`, so no handler runs without an admitted session.
///
/// `{resource}` is one of `players`, `blogs`, `news`, `videos`, `sponsors`; any
/// other value is rejected by the path extractor before the handler runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // Row counts for all five tables plus the recent blog/news activity.
        .route("/dashboard", get(handlers::get_dashboard))
        // GET /admin/navigation?path=...
        .route("/navigation", get(handlers::get_navigation))
        // GET  /admin/{resource}   -> controller view (list)
        // POST /admin/{resource}   -> create mode submit
        .route(
            "/{resource}",
            get(handlers::list_resource).post(handlers::create_resource),
        )
        // PUT    /admin/{resource}/{id}               -> edit mode submit
        // DELETE /admin/{resource}/{id}?confirm=true  -> remove
        .route(
            "/{resource}/{id}",
            put(handlers::update_resource).delete(handlers::delete_resource),
        )
        // PATCH /admin/{resource}/{id}/featured
        // News and videos only; other tables answer 405.
        .route("/{resource}/{id}/featured", patch(handlers::toggle_featured))
}
