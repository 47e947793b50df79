use crate::api::error::AppError;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use mime::Mime;

fn content_type_for(key: &str) -> Mime {
    match key.rsplit('.').next() {
        Some("png") => mime::IMAGE_PNG,
        Some("jpg") | Some("jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("webp") => "image/webp"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[utoipa::path(
    get,
    path = "/media/{key}",
    params(
        ("key" = String, Path, description = "Photo storage key")
    ),
    responses(
        (status = 200, description = "Photo bytes"),
        (status = 404, description = "Photo not found")
    ),
    tag = "media"
)]
pub async fn serve_photo(
    State(state): State<crate::AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let data = state
        .storage
        .load(&key)
        .await
        .map_err(|_| AppError::NotFound("Photo not found".to_string()))?;

    let mime = content_type_for(&key);

    Ok(([(header::CONTENT_TYPE, mime.to_string())], data).into_response())
}
