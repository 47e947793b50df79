use crate::config::AppConfig;
use crate::services::storage::LocalPhotoStorage;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<LocalPhotoStorage>> {
    tokio::fs::create_dir_all(&config.media_root).await?;

    info!("🖼️  Photo storage: {}", config.media_root);

    Ok(Arc::new(LocalPhotoStorage::new(config.media_root.clone())))
}
