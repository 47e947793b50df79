use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Select,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::announcements::{AnimalType, AnnouncementType};
use crate::entities::{announcements, prelude::*};

/// Ownership predicate behind every listing: the whole board, one user's
/// own reports, or everyone else's (the feed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerFilter<'a> {
    Any,
    Only(&'a str),
    Excluding(&'a str),
}

/// Selects the announcements matching `filter`, newest first. The id
/// tiebreak keeps the order stable when timestamps collide.
pub fn partition(filter: OwnerFilter<'_>) -> Select<Announcements> {
    let query = match filter {
        OwnerFilter::Any => Announcements::find(),
        OwnerFilter::Only(user_id) => {
            Announcements::find().filter(announcements::Column::UserId.eq(user_id))
        }
        OwnerFilter::Excluding(user_id) => {
            Announcements::find().filter(announcements::Column::UserId.ne(user_id))
        }
    };

    query
        .order_by_desc(announcements::Column::CreatedAt)
        .order_by_asc(announcements::Column::Id)
}

/// A single pin on the map: coordinates plus just enough to pick an icon.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MapPoint {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub announcement_type: AnnouncementType,
    pub animal_type: AnimalType,
}

/// Reduced projection of a partition for geographic display. Description,
/// photo and contact fields are dropped to keep the payload small.
pub async fn map_points<C: ConnectionTrait>(
    db: &C,
    filter: OwnerFilter<'_>,
) -> Result<Vec<MapPoint>, DbErr> {
    let rows = partition(filter).all(db).await?;

    Ok(rows
        .into_iter()
        .map(|a| MapPoint {
            id: a.id,
            latitude: a.latitude,
            longitude: a.longitude,
            announcement_type: a.announcement_type,
            animal_type: a.animal_type,
        })
        .collect())
}
