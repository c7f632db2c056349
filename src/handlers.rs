use crate::{
    AppState,
    auth::{AuthUser, bearer_token},
    catalog,
    config::LOGIN_ROUTE,
    controller::{Confirmation, ControllerView, RemoveOutcome, ResourceAdminController},
    dashboard,
    error::{AdminError, AdminResult, ErrorBody},
    models::{
        BlogPost, DashboardSummary, LogoutResponse, NavItem, NewsFeed, Player, SessionInfo,
        TierGroup, VideoFeed,
    },
    resource::{Record, Resource},
    shell::{AdminShell, SessionOutcome},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// CatalogFilter
///
/// Query parameters of the public listings. `category=All` (or no category)
/// disables the category filter; `search` matches titles case-insensitively.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// NavigationQuery
///
/// The front-end route currently displayed, used to highlight the navigation.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigationQuery {
    #[serde(default)]
    pub path: String,
}

/// DeleteQuery
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Must be `true`; a delete without it is refused and nothing is removed.
    #[serde(default)]
    pub confirm: bool,
}

// --- Public Catalog ---

/// list_players
///
/// [Public Route] The full roster, newest first.
#[utoipa::path(
    get,
    path = "/players",
    responses((status = 200, description = "Players", body = [Player]))
)]
pub async fn list_players(State(state): State<AppState>) -> AdminResult<Json<Vec<Player>>> {
    Ok(Json(catalog::load(&state.repo, Resource::Players).await?))
}

/// list_blogs
///
/// [Public Route] Blog posts filtered by category and title search.
#[utoipa::path(
    get,
    path = "/blogs",
    params(CatalogFilter),
    responses((status = 200, description = "Blog posts", body = [BlogPost]))
)]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> AdminResult<Json<Vec<BlogPost>>> {
    let blogs = catalog::load(&state.repo, Resource::Blogs).await?;
    Ok(Json(catalog::filter_blogs(
        blogs,
        filter.category.as_deref(),
        filter.search.as_deref(),
    )))
}

/// get_news_feed
///
/// [Public Route] The featured article plus the filtered remaining articles.
#[utoipa::path(
    get,
    path = "/news",
    params(CatalogFilter),
    responses((status = 200, description = "News feed", body = NewsFeed))
)]
pub async fn get_news_feed(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> AdminResult<Json<NewsFeed>> {
    let news = catalog::load(&state.repo, Resource::News).await?;
    Ok(Json(catalog::news_feed(
        news,
        filter.category.as_deref(),
        filter.search.as_deref(),
    )))
}

/// get_video_feed
///
/// [Public Route] Featured videos plus the category-filtered list.
#[utoipa::path(
    get,
    path = "/videos",
    params(CatalogFilter),
    responses((status = 200, description = "Video feed", body = VideoFeed))
)]
pub async fn get_video_feed(
    State(state): State<AppState>,
    Query(filter): Query<CatalogFilter>,
) -> AdminResult<Json<VideoFeed>> {
    let videos = catalog::load(&state.repo, Resource::Videos).await?;
    Ok(Json(catalog::video_feed(videos, filter.category.as_deref())))
}

/// get_sponsors_by_tier
///
/// [Public Route] Sponsors grouped by tier, highest tier first.
#[utoipa::path(
    get,
    path = "/sponsors",
    responses((status = 200, description = "Sponsors by tier", body = [TierGroup]))
)]
pub async fn get_sponsors_by_tier(State(state): State<AppState>) -> AdminResult<Json<Vec<TierGroup>>> {
    let sponsors = catalog::load(&state.repo, Resource::Sponsors).await?;
    Ok(Json(catalog::group_by_tier(sponsors)))
}

// --- Session ---

/// get_session
///
/// [Session Route] The shell's navigation check for the front-end route in `path`.
/// The login route is never gated (204). Without a valid session the answer is
/// 401 with a redirect to the login route.
#[utoipa::path(
    get,
    path = "/session",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Signed in", body = SessionInfo),
        (status = 204, description = "Login route, not gated"),
        (status = 401, description = "Signed out", body = ErrorBody)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> AdminResult<Response> {
    let shell = AdminShell::new(state.auth.clone(), state.config.role_policy);

    match shell.check_session(&query.path, bearer_token(&headers)).await? {
        SessionOutcome::Skipped => Ok(StatusCode::NO_CONTENT.into_response()),
        SessionOutcome::Redirect(redirect) => Err(AdminError::Unauthenticated { redirect }),
        SessionOutcome::Granted(session) => Ok(Json(SessionInfo {
            user: session.user,
            role: session.role,
            is_admin: session.is_admin,
            navigation: AdminShell::navigation(&query.path),
        })
        .into_response()),
    }
}

/// logout
///
/// [Session Route] Ends the session with the auth provider and points the client
/// at the login route, even when the provider could not be reached.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Signed out", body = LogoutResponse))
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<LogoutResponse> {
    let redirect = match bearer_token(&headers) {
        Some(token) => {
            AdminShell::new(state.auth.clone(), state.config.role_policy)
                .logout(token)
                .await
        }
        None => LOGIN_ROUTE.to_string(),
    };
    Json(LogoutResponse { redirect })
}

// --- Admin ---

/// get_dashboard
///
/// [Admin Route] Row counts per table and the five most recent blog/news items.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses((status = 200, description = "Dashboard", body = DashboardSummary))
)]
pub async fn get_dashboard(AuthUser(_session): AuthUser, State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(dashboard::summary(&state.repo).await)
}

/// get_navigation
///
/// [Admin Route] The admin navigation with the entry for `path` highlighted.
#[utoipa::path(
    get,
    path = "/admin/navigation",
    params(NavigationQuery),
    responses((status = 200, description = "Navigation", body = [NavItem]))
)]
pub async fn get_navigation(Query(query): Query<NavigationQuery>) -> Json<Vec<NavItem>> {
    Json(AdminShell::navigation(&query.path))
}

/// list_resource
///
/// [Admin Route] Mounts the controller for a table and returns its view.
/// A failed fetch is reported as 502 so the page can retry.
#[utoipa::path(
    get,
    path = "/admin/{resource}",
    params(("resource" = Resource, Path, description = "Content table")),
    responses(
        (status = 200, description = "Controller view", body = ControllerView),
        (status = 502, description = "Fetch failed", body = ErrorBody)
    )
)]
pub async fn list_resource(
    AuthUser(_session): AuthUser,
    State(state): State<AppState>,
    Path(resource): Path<Resource>,
) -> AdminResult<Json<ControllerView>> {
    let controller = ResourceAdminController::new(state.repo.clone(), resource);
    controller.refresh().await?;
    Ok(Json(controller.view()))
}

/// create_resource
///
/// [Admin Route] Create mode: the body is merged into the empty template,
/// validated, inserted, and the refreshed list is returned.
#[utoipa::path(
    post,
    path = "/admin/{resource}",
    params(("resource" = Resource, Path, description = "Content table")),
    request_body = Object,
    responses(
        (status = 201, description = "Created", body = ControllerView),
        (status = 422, description = "Validation failed", body = ErrorBody)
    )
)]
pub async fn create_resource(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Path(resource): Path<Resource>,
    Json(values): Json<Record>,
) -> AdminResult<(StatusCode, Json<ControllerView>)> {
    let controller = ResourceAdminController::new(state.repo.clone(), resource);
    controller.open_create();
    controller.apply(values);
    controller.submit().await?;

    tracing::info!(user_id = %session.user.id, table = resource.table(), "record created");
    Ok((StatusCode::CREATED, Json(controller.view())))
}

/// update_resource
///
/// [Admin Route] Edit mode: the stored row seeds the draft, the body overrides
/// the fields it names, and the whole draft is written back.
#[utoipa::path(
    put,
    path = "/admin/{resource}/{id}",
    params(
        ("resource" = Resource, Path, description = "Content table"),
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated", body = ControllerView),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ErrorBody)
    )
)]
pub async fn update_resource(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Path((resource, id)): Path<(Resource, Uuid)>,
    Json(values): Json<Record>,
) -> AdminResult<Json<ControllerView>> {
    let controller = ResourceAdminController::new(state.repo.clone(), resource);
    controller.refresh().await?;
    let record = controller
        .find(id)
        .ok_or_else(|| AdminError::NotFound(format!("{} {id}", resource.schema().label)))?;

    controller.open_edit(record);
    controller.apply(values);
    controller.submit().await?;

    tracing::info!(user_id = %session.user.id, table = resource.table(), %id, "record updated");
    Ok(Json(controller.view()))
}

/// delete_resource
///
/// [Admin Route] Deletes a row. Requires `?confirm=true`; without it nothing is
/// sent to the store and 428 is returned.
#[utoipa::path(
    delete,
    path = "/admin/{resource}/{id}",
    params(
        ("resource" = Resource, Path, description = "Content table"),
        ("id" = Uuid, Path, description = "Row ID"),
        DeleteQuery
    ),
    responses(
        (status = 200, description = "Deleted", body = ControllerView),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 428, description = "Confirmation required", body = ErrorBody)
    )
)]
pub async fn delete_resource(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Path((resource, id)): Path<(Resource, Uuid)>,
    Query(query): Query<DeleteQuery>,
) -> AdminResult<Json<ControllerView>> {
    let controller = ResourceAdminController::new(state.repo.clone(), resource);

    match controller.remove(id, Confirmation::from(query.confirm)).await? {
        RemoveOutcome::Removed => {
            tracing::info!(user_id = %session.user.id, table = resource.table(), %id, "record deleted");
            Ok(Json(controller.view()))
        }
        RemoveOutcome::Cancelled => Err(AdminError::ConfirmationRequired(resource.schema().label)),
    }
}

/// toggle_featured
///
/// [Admin Route] Flips the `featured` flag of a news article or video.
#[utoipa::path(
    patch,
    path = "/admin/{resource}/{id}/featured",
    params(
        ("resource" = Resource, Path, description = "Content table"),
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Toggled", body = ControllerView),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 405, description = "Table has no featured flag", body = ErrorBody)
    )
)]
pub async fn toggle_featured(
    AuthUser(_session): AuthUser,
    State(state): State<AppState>,
    Path((resource, id)): Path<(Resource, Uuid)>,
) -> AdminResult<Json<ControllerView>> {
    let controller = ResourceAdminController::new(state.repo.clone(), resource);
    controller.refresh().await?;
    let record = controller
        .find(id)
        .ok_or_else(|| AdminError::NotFound(format!("{} {id}", resource.schema().label)))?;

    controller.toggle_featured(&record).await?;
    Ok(Json(controller.view()))
}
