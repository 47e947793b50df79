use crate::api::error::AppError;
use crate::entities::{prelude::*, users};
use crate::services::reset_code;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// One outward-facing failure signal for every confirm outcome: unknown
/// email, wrong code and expired code must be indistinguishable.
const RESET_FAILED: &str = "Password reset failed";

#[derive(Deserialize, ToSchema, Validate)]
pub struct RequestResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct ConfirmResetRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub code: i64,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/password-reset/request",
    request_body = RequestResetRequest,
    responses(
        (status = 204, description = "Accepted; a code was issued if the account exists"),
        (status = 400, description = "Malformed email")
    ),
    tag = "password-reset"
)]
pub async fn request_reset(
    State(state): State<crate::AppState>,
    Json(payload): Json<RequestResetRequest>,
) -> Result<StatusCode, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = Users::find()
        .filter(users::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?;

    // Respond identically whether or not the account exists
    if let Some(user) = user {
        reset_code::issue(&state.db, &user.id, &state.config).await?;
        tracing::info!(user_id = %user.id, "issued password reset code");
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/password-reset/confirm",
    request_body = ConfirmResetRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Password reset failed")
    ),
    tag = "password-reset"
)]
pub async fn confirm_reset(
    State(state): State<crate::AppState>,
    Json(payload): Json<ConfirmResetRequest>,
) -> Result<StatusCode, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = Users::find()
        .filter(users::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest(RESET_FAILED.to_string()))?;

    let valid =
        reset_code::validate_and_consume(&state.db, &user.id, payload.code, Utc::now()).await?;
    if !valid {
        return Err(AppError::BadRequest(RESET_FAILED.to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.new_password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .to_string();

    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now());
    active.update(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}
