use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use faniko_types::api::HealthResponse;

use crate::state::AppState;
use crate::{auth, creators, payments, posts, requests};

pub const BANNER: &str = "Faniko API is running. Try GET /api/creators, POST /api/creators, or GET /api/creators/:username/posts";

/// The whole HTTP surface: API routes, uploaded files under `/uploads`,
/// body limit, CORS for the frontend origin, and request tracing.
pub fn app(state: AppState, cors_origin: HeaderValue, body_limit: usize) -> Router {
    let uploads = ServeDir::new(state.storage.dir());

    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    router(state)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API routes only.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/creators",
            get(creators::list_creators).post(creators::create_creator),
        )
        .route(
            "/api/creators/{username}",
            get(creators::get_creator).patch(creators::update_creator),
        )
        .route("/api/creators/{username}/status", patch(creators::review_creator))
        .route(
            "/api/creators/{username}/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/creators/{username}/posts/{post_id}",
            patch(posts::update_post).delete(posts::delete_post),
        )
        .route(
            "/api/creators/{username}/posts/{post_id}/like",
            post(posts::toggle_like),
        )
        .route(
            "/api/creators/{username}/posts/{post_id}/unlock",
            post(payments::unlock),
        )
        .route("/api/creators/{username}/tips", post(payments::tip))
        .route(
            "/api/creators/{username}/subscribe",
            post(payments::subscribe).delete(payments::unsubscribe),
        )
        .route("/api/creators/{username}/access", get(payments::access))
        .route("/api/creators/{username}/earnings", get(payments::earnings))
        .route(
            "/api/creators/{username}/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/api/creators/{username}/requests/{request_id}",
            patch(requests::update_request),
        )
        .with_state(state)
}

async fn root() -> &'static str {
    BANNER
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
