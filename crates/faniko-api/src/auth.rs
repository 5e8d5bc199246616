use axum::{Json, extract::State};

use faniko_types::api::{AuthUserResponse, LoginRequest, SignupRequest};
use faniko_types::models::User;

use crate::error::ApiError;
use crate::state::AppState;

fn account_view(user: User) -> AuthUserResponse {
    AuthUserResponse {
        id: user.id,
        email: user.email,
        username: user.username,
        role: user.role,
    }
}

/// POST /api/auth/signup: create a fan account.
pub async fn signup(
    State(state): State<AppState>,
    body: Option<Json<SignupRequest>>,
) -> Result<Json<AuthUserResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    // Run hashing off the async runtime
    let user = tokio::task::spawn_blocking(move || state.store.signup(req)).await??;

    Ok(Json(account_view(user)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<AuthUserResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let user = tokio::task::spawn_blocking(move || state.store.login(req)).await??;

    Ok(Json(account_view(user)))
}
