use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Content model: the five tables and their typed records.
pub mod models;
pub mod resource;

// Collaborators and the admin logic built on them.
pub mod auth;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod shell;

// Module for routing segregation (Public, Session, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, public, session};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use controller::ResourceAdminController;
pub use error::{AdminError, AdminResult, RepoError};
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryState};
pub use resource::{Record, Resource};
pub use shell::{AdminShell, AuthProvider, AuthState, StaticAuthProvider, SupabaseAuthProvider};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_players, handlers::list_blogs, handlers::get_news_feed,
        handlers::get_video_feed, handlers::get_sponsors_by_tier, handlers::get_session,
        handlers::logout, handlers::get_dashboard, handlers::get_navigation,
        handlers::list_resource, handlers::create_resource, handlers::update_resource,
        handlers::delete_resource, handlers::toggle_featured
    ),
    components(
        schemas(
            models::Player, models::BlogPost, models::NewsItem, models::Video, models::Sponsor,
            models::User, models::SessionInfo, models::NavItem, models::LogoutResponse,
            models::ResourceCounts, models::RecentItem, models::DashboardSummary,
            models::TierGroup, models::NewsFeed, models::VideoFeed,
            controller::ControllerView, resource::Resource, error::ErrorBody,
        )
    ),
    tags(
        (name = "zero-strikes", description = "Zero Strikes site catalog and admin API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of the application's collaborators and
/// configuration, cloned into every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for the five content tables and the `profiles` role lookup.
    pub repo: RepositoryState,
    /// Session verification and sign-out.
    pub auth: AuthState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Runs the shell's session check before any admin handler. `AuthUser` rejects
/// with 401 (plus the login redirect) or 403, so the handler never executes for
/// a visitor the shell would send away. The admitted session is stored in the
/// request extensions, where the handlers' own `AuthUser` picks it up without a
/// second check.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies scoped and global middleware and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session::session_routes())
        // Admin Routes: nested under '/admin', every one behind the session check.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, URI and the `x-request-id` so every
/// log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
