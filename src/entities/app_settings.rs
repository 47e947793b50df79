use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client-compatibility settings, keyed by a unique name. The row matching
/// the configured "actual" name is the one served to clients.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub settings_name: String,
    pub actual_app_version_ios: Option<String>,
    pub min_app_version_ios: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
