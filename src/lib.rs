pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::storage::PhotoStorage;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::users::get_user,
        api::handlers::password_reset::request_reset,
        api::handlers::password_reset::confirm_reset,
        api::handlers::announcements::list_announcements,
        api::handlers::announcements::list_user_announcements,
        api::handlers::announcements::feed_for_user,
        api::handlers::announcements::map_all,
        api::handlers::announcements::map_for_user,
        api::handlers::announcements::get_announcement,
        api::handlers::announcements::create_announcement,
        api::handlers::announcements::update_announcement,
        api::handlers::announcements::delete_announcement,
        api::handlers::app_settings::get_actual_settings,
        api::handlers::media::serve_photo,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::AuthResponse,
            api::handlers::users::UserInfoResponse,
            api::handlers::password_reset::RequestResetRequest,
            api::handlers::password_reset::ConfirmResetRequest,
            api::handlers::announcements::AnnouncementResponse,
            api::handlers::announcements::UpdateAnnouncementRequest,
            api::handlers::app_settings::AppSettingsResponse,
            api::handlers::health::HealthResponse,
            services::announcement_service::MapPoint,
            entities::announcements::AnnouncementType,
            entities::announcements::AnimalType,
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "announcements", description = "Lost-and-found pet announcements"),
        (name = "map", description = "Geographic projections of announcements"),
        (name = "password-reset", description = "Confirmation-code password recovery")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn PhotoStorage>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/register", post(api::handlers::auth::register))
        .route("/api/login", post(api::handlers::auth::login))
        .route(
            "/api/password-reset/request",
            post(api::handlers::password_reset::request_reset),
        )
        .route(
            "/api/password-reset/confirm",
            post(api::handlers::password_reset::confirm_reset),
        )
        .route(
            "/api/users/:id",
            get(api::handlers::users::get_user).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/announcements",
            get(api::handlers::announcements::list_announcements),
        )
        .route(
            "/api/announcements",
            post(api::handlers::announcements::create_announcement)
                .layer(axum::extract::DefaultBodyLimit::max(
                    state.config.max_photo_size + 1024 * 1024, // multipart overhead
                ))
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::auth::auth_middleware,
                )),
        )
        .route(
            "/api/announcements/:id",
            get(api::handlers::announcements::get_announcement),
        )
        .route(
            "/api/announcements/:id",
            put(api::handlers::announcements::update_announcement).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/announcements/:id",
            delete(api::handlers::announcements::delete_announcement).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/announcements/user/:user_id",
            get(api::handlers::announcements::list_user_announcements),
        )
        .route(
            "/api/feed/:user_id",
            get(api::handlers::announcements::feed_for_user),
        )
        .route("/api/map", get(api::handlers::announcements::map_all))
        .route(
            "/api/map/:user_id",
            get(api::handlers::announcements::map_for_user),
        )
        .route(
            "/api/settings",
            get(api::handlers::app_settings::get_actual_settings),
        )
        .route("/media/*key", get(api::handlers::media::serve_photo))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
