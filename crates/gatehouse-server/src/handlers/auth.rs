use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use entity::user;

use crate::crypto;
use crate::error::AppError;
use crate::jwt;
use crate::registration;
use crate::state::AppState;
use crate::validate::normalize_email;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    email: String,
    password: String,
    full_name: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    registration::register(
        &state.db,
        state.mailer.as_ref(),
        &state.config,
        &payload.email,
        &payload.password,
        &payload.full_name,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification email sent",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    email: String,
    /// The presented secret; named `code` on the wire for form compatibility.
    code: String,
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<Value>, AppError> {
    registration::redeem(&state.db, &payload.email, &payload.code).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Email verified successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyLinkQuery {
    token: String,
}

fn redirect_reason(err: &AppError) -> &'static str {
    match err {
        AppError::NotFound => "not_found",
        AppError::Expired => "expired",
        AppError::AlreadyVerified => "already_verified",
        AppError::Mismatch => "invalid_code",
        _ => "verification_failed",
    }
}

/// Clickable-link variant: always lands the browser on the sign-in page,
/// carrying the outcome as a query flag.
pub async fn verify_link(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyLinkQuery>,
) -> Redirect {
    let base = state.config.public_base_url.trim_end_matches('/').to_string();

    match registration::redeem_by_token(&state.db, &query.token).await {
        Ok(_) => Redirect::to(&format!("{base}/sign-in?verified=true")),
        Err(err) => {
            debug!("Link verification failed: {err}");
            Redirect::to(&format!("{base}/sign-in?error={}", redirect_reason(&err)))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    email: String,
}

pub async fn resend(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResendRequest>,
) -> Result<Json<Value>, AppError> {
    registration::resend(
        &state.db,
        state.mailer.as_ref(),
        &state.config,
        &payload.email,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Verification email sent",
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let email = normalize_email(&payload.email).map_err(|_| AppError::InvalidCredentials)?;

    let account = registration::find_user_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Only verified accounts may log in; by construction rows are created
    // verified, but identity edge paths keep this check honest.
    if account.verified_at.is_none() {
        return Err(AppError::InvalidCredentials);
    }

    if !crypto::verify_password_hash_blocking(
        payload.password.into_bytes(),
        account.salt.clone(),
        account.password_hash.clone(),
        account.password_iterations as u32,
    )
    .await
    {
        return Err(AppError::InvalidCredentials);
    }

    let pair = jwt::issue_token_pair(&state.config.jwt_secret, &account.id)?;

    Ok(Json(json!({
        "accessToken": pair.access_token,
        "refreshToken": pair.refresh_token,
        "tokenType": "Bearer",
        "expiresIn": pair.expires_in,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    refresh_token: String,
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, AppError> {
    let pair = jwt::refresh_access(&state.config.jwt_secret, &payload.refresh_token)?;

    // Reject tokens whose account has disappeared since issuance.
    let user_id = jwt::verify_access(&state.config.jwt_secret, &pair.access_token)?;
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(json!({
        "accessToken": pair.access_token,
        "tokenType": "Bearer",
        "expiresIn": pair.expires_in,
    })))
}
