use crate::api::error::AppError;
use crate::entities::{app_settings, prelude::*};
use axum::{Json, extract::State};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct AppSettingsResponse {
    pub settings_name: String,
    pub actual_app_version_ios: Option<String>,
    pub min_app_version_ios: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current client-compatibility settings", body = AppSettingsResponse),
        (status = 404, description = "No settings row configured")
    ),
    tag = "settings"
)]
pub async fn get_actual_settings(
    State(state): State<crate::AppState>,
) -> Result<Json<AppSettingsResponse>, AppError> {
    let settings = AppSettings::find()
        .filter(app_settings::Column::SettingsName.eq(&state.config.settings_actual_name))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Settings not found".to_string()))?;

    Ok(Json(AppSettingsResponse {
        settings_name: settings.settings_name,
        actual_app_version_ios: settings.actual_app_version_ios,
        min_app_version_ios: settings.min_app_version_ios,
    }))
}
