use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use faniko_store::creators::KycFiles;
use faniko_types::api::{
    CreateCreatorResponse, CreatorApplication, CreatorResponse, NumberLike, ReviewCreatorRequest,
    UpdateCreatorRequest,
};
use faniko_types::models::Creator;

use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::Form;

const KYC_FIELDS: [&str; 3] = ["idFront", "idBack", "selfie"];

/// POST /api/creators: multipart creator application with KYC documents.
pub async fn create_creator(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreateCreatorResponse>, ApiError> {
    let form = Form::read(multipart).await?;

    let application = CreatorApplication {
        display_name: form.text_or_default("displayName"),
        username: form.text_or_default("username"),
        email: form.text_or_default("email"),
        account_type: form.text_or_default("accountType"),
        price: form.text("price").map(NumberLike::from),
    };

    let mut stored = Vec::new();
    let mut kyc = KycFiles::default();
    for field in KYC_FIELDS {
        let name = match form.store_file(&state.storage, field).await {
            Ok(name) => name,
            Err(e) => {
                state.storage.discard(stored.iter().map(String::as_str)).await;
                return Err(e);
            }
        };
        if let Some(name) = &name {
            stored.push(name.clone());
        }
        match field {
            "idFront" => kyc.id_front = name,
            "idBack" => kyc.id_back = name,
            _ => kyc.selfie = name,
        }
    }

    match state.store.create_creator(application, kyc) {
        Ok(creator) => Ok(Json(CreateCreatorResponse {
            success: true,
            creator_id: creator.id,
        })),
        Err(e) => {
            state.storage.discard(stored.iter().map(String::as_str)).await;
            Err(e.into())
        }
    }
}

/// GET /api/creators
pub async fn list_creators(State(state): State<AppState>) -> Result<Json<Vec<Creator>>, ApiError> {
    Ok(Json(state.store.list_creators()?))
}

/// GET /api/creators/{username}
pub async fn get_creator(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Creator>, ApiError> {
    Ok(Json(state.store.get_creator(&username)?))
}

/// PATCH /api/creators/{username}: display name, account type, price.
pub async fn update_creator(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<UpdateCreatorRequest>>,
) -> Result<Json<CreatorResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let creator = state.store.update_creator(&username, req)?;
    Ok(Json(CreatorResponse {
        success: true,
        creator,
    }))
}

/// PATCH /api/creators/{username}/status: record a KYC review decision.
pub async fn review_creator(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Option<Json<ReviewCreatorRequest>>,
) -> Result<Json<CreatorResponse>, ApiError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let creator = state.store.review_creator(&username, &req.status)?;
    Ok(Json(CreatorResponse {
        success: true,
        creator,
    }))
}
