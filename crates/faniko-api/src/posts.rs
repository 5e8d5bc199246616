use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use tracing::warn;

use faniko_store::posts::MediaFile;
use faniko_store::{POST_NOT_FOUND, StoreError};
use faniko_types::api::{
    LikeRequest, LikeResponse, NewPost, NumberLike, PostResponse, SuccessResponse,
    UpdatePostRequest,
};
use faniko_types::models::Post;

use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::Form;

const MEDIA_FIELD: &str = "media";

/// Parse a post id from the path. An unparseable id still reports a missing
/// creator first, then a missing post.
pub(crate) fn parse_post_id(state: &AppState, username: &str, raw: &str) -> Result<u64, ApiError> {
    match raw.trim().parse::<u64>() {
        Ok(id) => Ok(id),
        Err(_) => {
            state.store.get_creator(username)?;
            Err(StoreError::NotFound(POST_NOT_FOUND).into())
        }
    }
}

/// GET /api/creators/{username}/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.store.list_posts(&username)?))
}

/// POST /api/creators/{username}/posts: multipart, optional `media` file.
pub async fn create_post(
    State(state): State<AppState>,
    Path(username): Path<String>,
    multipart: Multipart,
) -> Result<Json<PostResponse>, ApiError> {
    let form = Form::read(multipart).await?;

    let new = NewPost {
        title: form.text_or_default("title"),
        visibility: form.text_or_default("visibility"),
        price: form.text("price").map(NumberLike::from),
        description: form.text("description").map(str::to_string),
    };

    let media = match form.store_file(&state.storage, MEDIA_FIELD).await? {
        Some(filename) => Some(MediaFile {
            filename,
            mime: form
                .files
                .get(MEDIA_FIELD)
                .and_then(|f| f.content_type.clone()),
        }),
        None => None,
    };
    let stored = media.as_ref().map(|m| m.filename.clone());

    match state.store.create_post(&username, new, media) {
        Ok(post) => Ok(Json(PostResponse {
            success: true,
            post,
        })),
        Err(e) => {
            state.storage.discard(stored.as_deref()).await;
            Err(e.into())
        }
    }
}

/// PATCH /api/creators/{username}/posts/{post_id}
pub async fn update_post(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
    body: Option<Json<UpdatePostRequest>>,
) -> Result<Json<PostResponse>, ApiError> {
    let post_id = parse_post_id(&state, &username, &post_id)?;
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let post = state.store.update_post(&username, post_id, req)?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// DELETE /api/creators/{username}/posts/{post_id}: hard delete, media
/// included. Payments made for the post are kept.
pub async fn delete_post(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let post_id = parse_post_id(&state, &username, &post_id)?;
    let post = state.store.delete_post(&username, post_id)?;

    if let Some(media) = &post.media_filename
        && let Err(e) = state.storage.delete_file(media).await
    {
        warn!("Post {} deleted but media {} remains: {}", post.id, media, e);
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/creators/{username}/posts/{post_id}/like: toggles.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path((username, post_id)): Path<(String, String)>,
    body: Option<Json<LikeRequest>>,
) -> Result<Json<LikeResponse>, ApiError> {
    let post_id = parse_post_id(&state, &username, &post_id)?;
    let req = body.map(|Json(b)| b).unwrap_or_default();

    let toggle = state
        .store
        .toggle_like(&username, post_id, req.fan_username.as_deref())?;

    Ok(Json(LikeResponse {
        success: true,
        post_id: toggle.post_id,
        likes: toggle.likes,
        liked_by_me: toggle.liked_by_me,
    }))
}
