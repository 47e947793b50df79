use anyhow::{Result, anyhow};

/// Image types accepted for announcement photos, with the extension used
/// for the generated storage key.
pub const ALLOWED_PHOTO_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates an uploaded photo and returns the storage extension to use.
///
/// The claimed content type from the request is ignored entirely; the real
/// type comes from magic bytes and the image must actually decode.
pub fn validate_photo(data: &[u8], max_size: usize) -> Result<&'static str> {
    if data.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_PHOTO",
            message: "Photo file is empty".to_string(),
        }));
    }

    if data.len() > max_size {
        return Err(anyhow!(ValidationError {
            code: "PHOTO_TOO_LARGE",
            message: format!(
                "Photo size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                data.len(),
                max_size,
                max_size / 1024 / 1024
            ),
        }));
    }

    let detected = infer::get(data).map(|t| t.mime_type()).unwrap_or("unknown");

    let extension = ALLOWED_PHOTO_TYPES
        .iter()
        .find(|(mime, _)| *mime == detected)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            anyhow!(ValidationError {
                code: "NOT_AN_IMAGE",
                message: format!(
                    "Content type '{}' is not allowed. Only JPEG, PNG, GIF and WebP images are permitted.",
                    detected
                ),
            })
        })?;

    // A correct magic header over a corrupt body still gets rejected
    image::load_from_memory(data).map_err(|e| {
        anyhow!(ValidationError {
            code: "UNDECODABLE_IMAGE",
            message: format!("Photo could not be decoded: {}", e),
        })
    })?;

    Ok(extension)
}
