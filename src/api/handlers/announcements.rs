use crate::api::error::AppError;
use crate::entities::announcements::{AnimalType, AnnouncementType};
use crate::entities::{announcements, prelude::*};
use crate::services::announcement_service::{self, MapPoint, OwnerFilter};
use crate::services::storage::photo_key;
use crate::utils::auth::Claims;
use crate::utils::pagination::{Page, paginate};
use crate::utils::validation::validate_photo;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AnnouncementResponse {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<announcements::Model> for AnnouncementResponse {
    fn from(a: announcements::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            description: a.description,
            photo: format!("/media/{}", a.photo),
            announcement_type: a.announcement_type,
            animal_type: a.animal_type,
            address: a.address,
            latitude: a.latitude,
            longitude: a.longitude,
            contact_phone_number: a.contact_phone_number,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Text fields of a new announcement, validated before anything is stored.
#[derive(Validate)]
struct NewAnnouncement {
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    description: String,
    #[validate(length(min = 1, max = 1000, message = "Address must be 1-1000 characters"))]
    address: String,
    #[validate(length(min = 1, max = 12, message = "Contact phone must be 1-12 characters"))]
    contact_phone_number: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    longitude: f64,
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing field: {}", name)))
}

async fn list_partition(
    state: &crate::AppState,
    filter: OwnerFilter<'_>,
    query: PageQuery,
) -> Result<Json<Page<AnnouncementResponse>>, AppError> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::BadRequest("Page numbers start at 1".to_string()));
    }

    let result = paginate(
        &state.db,
        announcement_service::partition(filter),
        page,
        state.config.page_size,
    )
    .await?;

    Ok(Json(Page {
        items: result.items.into_iter().map(Into::into).collect(),
        page: result.page,
        total: result.total,
        has_next: result.has_next,
        has_previous: result.has_previous,
    }))
}

#[utoipa::path(
    get,
    path = "/api/announcements",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Paginated list of all announcements"),
        (status = 400, description = "Invalid page number")
    ),
    tag = "announcements"
)]
pub async fn list_announcements(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<AnnouncementResponse>>, AppError> {
    list_partition(&state, OwnerFilter::Any, query).await
}

#[utoipa::path(
    get,
    path = "/api/announcements/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owner user ID"),
        ("page" = Option<u64>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Announcements that belong to the user")
    ),
    tag = "announcements"
)]
pub async fn list_user_announcements(
    State(state): State<crate::AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<AnnouncementResponse>>, AppError> {
    list_partition(&state, OwnerFilter::Only(&user_id), query).await
}

#[utoipa::path(
    get,
    path = "/api/feed/{user_id}",
    params(
        ("user_id" = String, Path, description = "User whose own announcements are excluded"),
        ("page" = Option<u64>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Announcements authored by everyone else")
    ),
    tag = "announcements"
)]
pub async fn feed_for_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<AnnouncementResponse>>, AppError> {
    list_partition(&state, OwnerFilter::Excluding(&user_id), query).await
}

#[utoipa::path(
    get,
    path = "/api/map",
    responses(
        (status = 200, description = "Map projection of all announcements", body = Vec<MapPoint>)
    ),
    tag = "map"
)]
pub async fn map_all(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<MapPoint>>, AppError> {
    let points = announcement_service::map_points(&state.db, OwnerFilter::Any).await?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/api/map/{user_id}",
    params(
        ("user_id" = String, Path, description = "User whose own announcements are excluded")
    ),
    responses(
        (status = 200, description = "Map projection without the user's own announcements", body = Vec<MapPoint>)
    ),
    tag = "map"
)]
pub async fn map_for_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MapPoint>>, AppError> {
    let points =
        announcement_service::map_points(&state.db, OwnerFilter::Excluding(&user_id)).await?;
    Ok(Json(points))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(
        ("id" = String, Path, description = "Announcement ID")
    ),
    responses(
        (status = 200, description = "Announcement detail", body = AnnouncementResponse),
        (status = 404, description = "Announcement not found")
    ),
    tag = "announcements"
)]
pub async fn get_announcement(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<AnnouncementResponse>, AppError> {
    let announcement = Announcements::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    Ok(Json(announcement.into()))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body(content = Object, description = "Multipart form: photo file + announcement fields", content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Announcement created", body = AnnouncementResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Photo too large")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "announcements"
)]
pub async fn create_announcement(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnnouncementResponse>), AppError> {
    let mut description = None;
    let mut announcement_type = None;
    let mut animal_type = None;
    let mut address = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut contact_phone_number = None;
    let mut photo: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                photo = Some(data.to_vec());
            }
            "description" => description = Some(read_text(field).await?),
            "announcement_type" => announcement_type = Some(read_text(field).await?),
            "animal_type" => animal_type = Some(read_text(field).await?),
            "address" => address = Some(read_text(field).await?),
            "latitude" => latitude = Some(read_text(field).await?),
            "longitude" => longitude = Some(read_text(field).await?),
            "contact_phone_number" => contact_phone_number = Some(read_text(field).await?),
            // Ownership comes from the token; a smuggled user field is dropped
            _ => {}
        }
    }

    let fields = NewAnnouncement {
        description: require(description, "description")?,
        address: require(address, "address")?,
        contact_phone_number: require(contact_phone_number, "contact_phone_number")?,
        latitude: parse_coordinate(require(latitude, "latitude")?, "latitude")?,
        longitude: parse_coordinate(require(longitude, "longitude")?, "longitude")?,
    };
    fields
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let announcement_type: AnnouncementType = require(announcement_type, "announcement_type")?
        .parse()
        .map_err(AppError::BadRequest)?;
    let animal_type: AnimalType = require(animal_type, "animal_type")?
        .parse()
        .map_err(AppError::BadRequest)?;

    let photo = require(photo, "photo")?;
    if photo.len() > state.config.max_photo_size {
        return Err(AppError::PayloadTooLarge(format!(
            "Photo exceeds the {} byte limit",
            state.config.max_photo_size
        )));
    }
    let extension =
        validate_photo(&photo, state.config.max_photo_size).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let key = photo_key(extension);
    state
        .storage
        .store(&key, photo)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store photo: {}", e)))?;

    let now = Utc::now();
    let model = announcements::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(claims.sub.clone()),
        description: Set(fields.description),
        photo: Set(key),
        announcement_type: Set(announcement_type),
        animal_type: Set(animal_type),
        address: Set(fields.address),
        latitude: Set(fields.latitude),
        longitude: Set(fields.longitude),
        contact_phone_number: Set(fields.contact_phone_number),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: Option<String>,
    pub announcement_type: Option<AnnouncementType>,
    pub animal_type: Option<AnimalType>,
    #[validate(length(min = 1, max = 1000, message = "Address must be 1-1000 characters"))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub longitude: Option<f64>,
    #[validate(length(min = 1, max = 12, message = "Contact phone must be 1-12 characters"))]
    pub contact_phone_number: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(
        ("id" = String, Path, description = "Announcement ID")
    ),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = AnnouncementResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the announcement"),
        (status = 404, description = "Announcement not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "announcements"
)]
pub async fn update_announcement(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> Result<Json<AnnouncementResponse>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let announcement = Announcements::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    if announcement.user_id != claims.sub {
        return Err(AppError::Forbidden(
            "Only the owner may update an announcement".to_string(),
        ));
    }

    let mut active: announcements::ActiveModel = announcement.into();

    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(announcement_type) = payload.announcement_type {
        active.announcement_type = Set(announcement_type);
    }
    if let Some(animal_type) = payload.animal_type {
        active.animal_type = Set(animal_type);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(latitude) = payload.latitude {
        active.latitude = Set(latitude);
    }
    if let Some(longitude) = payload.longitude {
        active.longitude = Set(longitude);
    }
    if let Some(contact_phone_number) = payload.contact_phone_number {
        active.contact_phone_number = Set(contact_phone_number);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(
        ("id" = String, Path, description = "Announcement ID")
    ),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the announcement"),
        (status = 404, description = "Announcement not found")
    ),
    security(
        ("jwt" = [])
    ),
    tag = "announcements"
)]
pub async fn delete_announcement(
    State(state): State<crate::AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let announcement = Announcements::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

    if announcement.user_id != claims.sub {
        return Err(AppError::Forbidden(
            "Only the owner may delete an announcement".to_string(),
        ));
    }

    let photo = announcement.photo.clone();
    announcement.delete(&state.db).await?;

    // Best-effort cleanup; the record itself is already gone
    if let Err(e) = state.storage.delete(&photo).await {
        tracing::warn!("failed to remove photo {}: {}", photo, e);
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn parse_coordinate(raw: String, name: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {}", name)))
}
