use std::env;

/// Runtime configuration for the announcement platform
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JWT secret key (required in production)
    pub jwt_secret: String,

    /// Bearer token lifetime in days (default: 365)
    pub token_lifetime_days: i64,

    /// Root directory for uploaded photos (default: "./media")
    pub media_root: String,

    /// Maximum photo upload size in bytes (default: 5 MiB)
    pub max_photo_size: usize,

    /// Items per listing page, server-controlled (default: 10)
    pub page_size: u64,

    /// Digits in a password-reset confirmation code (default: 6)
    pub reset_code_length: u32,

    /// Seconds a reset code stays valid (default: 3600)
    pub reset_code_lifetime_secs: i64,

    /// Name of the app-settings row served to clients (default: "actual")
    pub settings_actual_name: String,

    /// Allowed CORS origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "secret".to_string(),
            token_lifetime_days: 365,
            media_root: "./media".to_string(),
            max_photo_size: 5 * 1024 * 1024,
            page_size: 10,
            reset_code_length: 6,
            reset_code_lifetime_secs: 3600,
            settings_actual_name: "actual".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),

            token_lifetime_days: env::var("TOKEN_LIFETIME_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.token_lifetime_days),

            media_root: env::var("MEDIA_ROOT").unwrap_or(default.media_root),

            max_photo_size: env::var("MAX_PHOTO_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_photo_size),

            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.page_size),

            reset_code_length: env::var("RESET_CODE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.reset_code_length),

            reset_code_lifetime_secs: env::var("RESET_CODE_LIFETIME_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.reset_code_lifetime_secs),

            settings_actual_name: env::var("SETTINGS_ACTUAL_NAME")
                .unwrap_or(default.settings_actual_name),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (relaxed secrets, short reset codes)
    pub fn development() -> Self {
        Self {
            reset_code_lifetime_secs: 600,
            ..Self::default()
        }
    }

    /// Create config for production (strict secrets)
    pub fn production() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET").expect("CRITICAL: JWT_SECRET must be set"),
            ..Self::from_env()
        }
    }
}
