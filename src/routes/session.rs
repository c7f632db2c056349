use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Session Router Module
///
/// The shell's session lifecycle. Neither route sits behind the auth middleware:
/// `/session` is how the front-end learns it must redirect, and `/logout` must
/// work with whatever token the client still holds.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        // GET /session?path=/dashboard/players
        // 200 with the user and highlighted navigation, 204 on the login route,
        // 401 with `redirect` when signed out.
        .route("/session", get(handlers::get_session))
        // POST /logout
        // Ends the provider session and returns the login route.
        .route("/logout", post(handlers::logout))
}
