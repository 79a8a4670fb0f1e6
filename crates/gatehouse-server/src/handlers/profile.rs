use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use serde_json::{json, Value};

use entity::{profile, user};

use crate::error::AppError;
use crate::jwt;
use crate::state::AppState;
use crate::util::{now_ts, ts_to_rfc3339};
use crate::validate::{validate_bio, validate_dob, validate_full_name, validate_gender};

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the bearer access token to an account row.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<user::Model, AppError> {
    let token = extract_bearer_token(headers).ok_or(AppError::Unauthorized)?;
    let user_id = jwt::verify_access(&state.config.jwt_secret, &token)?;

    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)
}

fn profile_json(account: &user::Model, demographics: Option<&profile::Model>) -> Value {
    json!({
        "id": account.id,
        "email": account.email,
        "fullName": account.full_name,
        "verifiedAt": account.verified_at.map(ts_to_rfc3339),
        "image": account.image,
        "dob": demographics.and_then(|p| p.date_of_birth.clone()),
        "gender": demographics.and_then(|p| p.gender.clone()),
        "bio": demographics.and_then(|p| p.bio.clone()),
    })
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let account = authenticate(&state, &headers).await?;

    let demographics = profile::Entity::find_by_id(&account.id)
        .one(&state.db)
        .await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile_json(&account, demographics.as_ref()),
    })))
}

/// One typed update shape; unknown or extra fields are rejected outright
/// instead of being accepted loosely.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    full_name: Option<String>,
    dob: Option<String>,
    gender: Option<String>,
    bio: Option<String>,
    image: Option<String>,
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let account = authenticate(&state, &headers).await?;

    let full_name = payload
        .full_name
        .as_deref()
        .map(validate_full_name)
        .transpose()?;
    if let Some(dob) = payload.dob.as_deref() {
        validate_dob(dob)?;
    }
    if let Some(gender) = payload.gender.as_deref() {
        validate_gender(gender)?;
    }
    if let Some(bio) = payload.bio.as_deref() {
        validate_bio(bio)?;
    }

    let now = now_ts();

    let mut account_active: user::ActiveModel = account.clone().into();
    if let Some(name) = full_name {
        account_active.full_name = Set(name);
    }
    if let Some(image) = payload.image.clone() {
        account_active.image = Set(Some(image));
    }
    account_active.updated_at = Set(now);
    let account = account_active.update(&state.db).await?;

    let demographics = profile::Entity::find_by_id(&account.id)
        .one(&state.db)
        .await?;

    let demographics = match demographics {
        Some(existing) => {
            let mut active: profile::ActiveModel = existing.into();
            if payload.dob.is_some() {
                active.date_of_birth = Set(payload.dob.clone());
            }
            if payload.gender.is_some() {
                active.gender = Set(payload.gender.clone());
            }
            if payload.bio.is_some() {
                active.bio = Set(payload.bio.clone());
            }
            active.updated_at = Set(now);
            active.update(&state.db).await?
        }
        None => {
            profile::ActiveModel {
                user_id: Set(account.id.clone()),
                date_of_birth: Set(payload.dob.clone()),
                gender: Set(payload.gender.clone()),
                bio: Set(payload.bio.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&state.db)
            .await?
        }
    };

    Ok(Json(json!({
        "success": true,
        "profile": profile_json(&account, Some(&demographics)),
    })))
}
