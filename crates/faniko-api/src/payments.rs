use axum::{
    Json,
    extract::{Path, Query, State},
};

use faniko_store::payments::{SubscribeOutcome, UnlockOutcome};
use faniko_types::api::{
    AccessQuery, AccessResponse, EarningsResponse, FanRequest, SubscribeResponse,
    SubscriptionResponse, TipRequest, TipResponse, UnlockResponse,
};

use crate::error::ApiError;
use crate::posts::parse_post_id;
use crate::state::AppState;

/// POST /api/creators/{username}/tips
pub async fn tip(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<TipRequest>>,
) -> Result<Json<TipResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let transaction = state.store.tip(&username, req)?;
    Ok(Json(TipResponse {
        success: true,
        transaction,
    }))
}

/// POST /api/creators/{username}/posts/{post_id}/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
    body: Option<Json<FanRequest>>,
) -> Result<Json<UnlockResponse>, ApiError> {
    let post_id = parse_post_id(&state, &username, &post_id)?;
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let response = match state.store.unlock_post(&username, post_id, req)? {
        UnlockOutcome::AlreadyUnlocked { post_id } => UnlockResponse {
            success: true,
            already_unlocked: Some(true),
            unlocked_post_id: post_id,
            transaction: None,
        },
        UnlockOutcome::Unlocked {
            post_id,
            transaction,
        } => UnlockResponse {
            success: true,
            already_unlocked: None,
            unlocked_post_id: post_id,
            transaction: Some(transaction),
        },
    };
    Ok(Json(response))
}

/// POST /api/creators/{username}/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<FanRequest>>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let response = match state.store.subscribe(&username, req)? {
        SubscribeOutcome::AlreadySubscribed(subscription) => SubscribeResponse {
            success: true,
            already_subscribed: Some(true),
            subscription,
            transaction: None,
        },
        SubscribeOutcome::Subscribed {
            subscription,
            transaction,
        } => SubscribeResponse {
            success: true,
            already_subscribed: None,
            subscription,
            transaction: Some(transaction),
        },
    };
    Ok(Json(response))
}

/// DELETE /api/creators/{username}/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<FanRequest>>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let subscription = state
        .store
        .unsubscribe(&username, req.fan_username.as_deref())?;
    Ok(Json(SubscriptionResponse {
        success: true,
        subscription,
    }))
}

/// GET /api/creators/{username}/access?fanUsername=
pub async fn access(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, ApiError> {
    Ok(Json(
        state
            .store
            .access(&username, query.fan_username.as_deref())?,
    ))
}

/// GET /api/creators/{username}/earnings
pub async fn earnings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<EarningsResponse>, ApiError> {
    Ok(Json(state.store.earnings(&username)?))
}
