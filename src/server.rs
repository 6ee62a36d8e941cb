//! Portfolio HTTP server.
//!
//! Serves the portfolio content as a JSON API for the front end. All
//! endpoints are public reads except `POST /skills`, which requires the
//! admin credential.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/profile` | Full profile with all content attached |
//! | `GET`  | `/skills/top` | Top skills in insertion order |
//! | `POST` | `/skills` | Create a skill (HTTP Basic auth) |
//! | `GET`  | `/projects` | Projects, optional skill filter + pagination |
//! | `GET`  | `/search` | Substring search over projects and skills |
//! | `GET`  | `/by-category/{name}` | Content tagged with a category |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "profile not found" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `not_found`
//! (404), `conflict` (409), `too_many_requests` (429), `internal` (500).
//! Store failures are logged server-side and surface only the generic
//! `internal` message.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the static front end
//! can be hosted anywhere.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::num::NonZeroU32;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::categories;
use crate::config::Config;
use crate::db;
use crate::models::Skill;
use crate::profile;
use crate::projects::{self, DEFAULT_PAGE_LIMIT};
use crate::search;
use crate::skills;

/// Process-wide limiter for the profile endpoint.
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
    profile_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let pool = db::connect(config).await?;

    let profile_limiter = config
        .server
        .profile_rate_limit_per_minute
        .and_then(NonZeroU32::new)
        .map(|per_minute| Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))));

    let state = AppState {
        config: Arc::new(config.clone()),
        pool,
        profile_limiter,
    };

    let app = build_router(state);

    tracing::info!("me-api listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/profile", get(handle_profile))
        .route("/skills/top", get(handle_top_skills))
        .route("/skills", post(handle_create_skill))
        .route("/projects", get(handle_projects))
        .route("/search", get(handle_search))
        .route("/by-category/{name}", get(handle_by_category))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable
/// message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Basic realm=\"me-api\""),
            );
        }
        response
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 401 error; the response carries a Basic challenge header.
fn unauthorized(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNAUTHORIZED,
        code: "unauthorized".to_string(),
        message: message.into(),
    }
}

/// Constructs a 404 Not Found error.
fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

/// Constructs a 409 Conflict error.
fn conflict(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::CONFLICT,
        code: "conflict".to_string(),
        message: message.into(),
    }
}

/// Constructs a 429 Too Many Requests error.
fn too_many_requests(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::TOO_MANY_REQUESTS,
        code: "too_many_requests".to_string(),
        message: message.into(),
    }
}

/// Logs a store/internal failure and returns the generic 500 error.
fn internal(err: anyhow::Error) -> AppError {
    tracing::error!("internal error: {:#}", err);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: "internal server error".to_string(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /profile ============

async fn handle_profile(
    State(state): State<AppState>,
) -> Result<Json<profile::ProfileResponse>, AppError> {
    if let Some(limiter) = &state.profile_limiter {
        if limiter.check().is_err() {
            return Err(too_many_requests("rate limit exceeded, try again later"));
        }
    }

    let response = profile::full_profile(&state.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("profile not found"))?;

    Ok(Json(response))
}

// ============ GET /skills/top, POST /skills ============

async fn handle_top_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, AppError> {
    let top = skills::top_skills(&state.pool).await.map_err(internal)?;
    Ok(Json(top))
}

/// JSON request body for `POST /skills`.
#[derive(Deserialize)]
struct CreateSkillRequest {
    name: String,
    #[serde(default)]
    is_top_skill: bool,
}

async fn handle_create_skill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    if !auth::authorize(&headers, &state.config.auth) {
        return Err(unauthorized("incorrect username or password"));
    }

    let name = body.name.trim();
    if name.is_empty() {
        return Err(bad_request("skill name must not be empty"));
    }

    let created = skills::create_skill(&state.pool, name, body.is_top_skill)
        .await
        .map_err(internal)?
        .ok_or_else(|| conflict(format!("skill already exists: {}", name)))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// ============ GET /projects ============

/// Query parameters for `GET /projects`.
#[derive(Deserialize)]
struct ProjectsParams {
    /// Case-insensitive substring matched against skill names.
    skill: Option<String>,
    skip: Option<i64>,
    limit: Option<i64>,
}

async fn handle_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectsParams>,
) -> Result<Json<Vec<crate::present::ProjectView>>, AppError> {
    let offset = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(0);

    let list = projects::list_projects(&state.pool, params.skill.as_deref(), offset, limit)
        .await
        .map_err(internal)?;

    Ok(Json(list))
}

// ============ GET /search ============

/// Query parameters for `GET /search`. `q` is required; blank values
/// produce empty result lists rather than an error.
#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<search::SearchResponse>, AppError> {
    let response = search::search_content(&state.pool, &params.q, state.config.server.search_cap)
        .await
        .map_err(internal)?;

    Ok(Json(response))
}

// ============ GET /by-category/{name} ============

async fn handle_by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<categories::CategoryContent>, AppError> {
    let content = categories::by_category(&state.pool, &name)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            not_found(format!(
                "no projects or work experience found for category: {}",
                name
            ))
        })?;

    Ok(Json(content))
}
