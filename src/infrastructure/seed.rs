use crate::config::AppConfig;
use crate::entities::{app_settings, prelude::*};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

/// Makes sure the configured app-settings row exists so the settings
/// endpoint has something to serve. Version fields start empty and are
/// filled in by operators.
pub async fn seed_app_settings(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let existing = AppSettings::find()
        .filter(app_settings::Column::SettingsName.eq(&config.settings_actual_name))
        .one(db)
        .await?;

    if existing.is_none() {
        let settings = app_settings::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            settings_name: Set(config.settings_actual_name.clone()),
            actual_app_version_ios: Set(None),
            min_app_version_ios: Set(None),
        };
        settings.insert(db).await?;
        info!("🌱 Seeded app settings row '{}'", config.settings_actual_name);
    }

    Ok(())
}
