use axum::{
    Json,
    extract::{Path, State},
};

use faniko_store::{REQUEST_NOT_FOUND, StoreError};
use faniko_types::api::{CustomRequestResponse, NewCustomRequest, RequestStatusUpdate};
use faniko_types::models::CustomRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/creators/{username}/requests
pub async fn create_request(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<NewCustomRequest>>,
) -> Result<Json<CustomRequestResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let request = state.store.create_request(&username, req)?;
    Ok(Json(CustomRequestResponse {
        success: true,
        request,
    }))
}

/// GET /api/creators/{username}/requests
pub async fn list_requests(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<CustomRequest>>, ApiError> {
    Ok(Json(state.store.list_requests(&username)?))
}

/// PATCH /api/creators/{username}/requests/{request_id}
pub async fn update_request(
    State(state): State<AppState>,
    Path((username, request_id)): Path<(String, String)>,
    body: Option<Json<RequestStatusUpdate>>,
) -> Result<Json<CustomRequestResponse>, ApiError> {
    let Ok(request_id) = request_id.trim().parse::<u64>() else {
        state.store.get_creator(&username)?;
        return Err(StoreError::NotFound(REQUEST_NOT_FOUND).into());
    };
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let request = state
        .store
        .update_request_status(&username, request_id, &req.status)?;
    Ok(Json(CustomRequestResponse {
        success: true,
        request,
    }))
}
