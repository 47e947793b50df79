use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether a pet was lost or found.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementType {
    #[sea_orm(num_value = 1)]
    Lost,
    #[sea_orm(num_value = 2)]
    Found,
}

impl std::str::FromStr for AnnouncementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" | "1" => Ok(Self::Lost),
            "found" | "2" => Ok(Self::Found),
            other => Err(format!("unknown announcement type '{}'", other)),
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum AnimalType {
    #[sea_orm(num_value = 1)]
    Dog,
    #[sea_orm(num_value = 2)]
    Cat,
    #[sea_orm(num_value = 3)]
    Other,
}

impl std::str::FromStr for AnimalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" | "1" => Ok(Self::Dog),
            "cat" | "2" => Ok(Self::Cat),
            "other" | "3" => Ok(Self::Other),
            unknown => Err(format!("unknown animal type '{}'", unknown)),
        }
    }
}

/// A lost-or-found pet report. `photo` holds the storage key of the
/// uploaded image, never a client-supplied path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub photo: String,
    pub announcement_type: AnnouncementType,
    pub animal_type: AnimalType,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_phone_number: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing() {
        assert_eq!("lost".parse::<AnnouncementType>(), Ok(AnnouncementType::Lost));
        assert_eq!("2".parse::<AnnouncementType>(), Ok(AnnouncementType::Found));
        assert_eq!(" Found ".parse::<AnnouncementType>(), Ok(AnnouncementType::Found));
        assert!("missing".parse::<AnnouncementType>().is_err());

        assert_eq!("dog".parse::<AnimalType>(), Ok(AnimalType::Dog));
        assert_eq!("CAT".parse::<AnimalType>(), Ok(AnimalType::Cat));
        assert_eq!("3".parse::<AnimalType>(), Ok(AnimalType::Other));
        assert!("hamster".parse::<AnimalType>().is_err());
    }
}
