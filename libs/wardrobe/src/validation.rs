//! Input validation utilities

use uuid::Uuid;

use crate::models::{Category, ImageUpload};

/// Image content types accepted for clothing photos, with the file extension
/// used for the stored object
const IMAGE_TYPES: [(&str, &str); 6] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/heic", "heic"),
    ("image/heif", "heif"),
];

/// Validate a collection name
pub fn validate_collection_name(name: Option<&str>) -> Result<&str, String> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err("Collection name is required".to_string()),
    }
}

/// Parse every raw id, failing on the first malformed one
pub fn parse_item_ids(raw: &[String]) -> Result<Vec<Uuid>, String> {
    raw.iter()
        .map(|value| {
            Uuid::parse_str(value).map_err(|_| format!("Invalid clothing item id: {}", value))
        })
        .collect()
}

/// Validate a category name
pub fn validate_category(category: Option<&str>) -> Result<Category, String> {
    match category {
        Some(category) if !category.is_empty() => category.parse(),
        _ => Err("Category is required".to_string()),
    }
}

/// Validate an uploaded image and return the extension for its content type
pub fn validate_image(image: Option<&ImageUpload>) -> Result<&'static str, String> {
    let image = image.ok_or_else(|| "Image is required".to_string())?;

    if image.bytes.is_empty() {
        return Err("Image is empty".to_string());
    }

    let content_type = image
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .ok_or_else(|| "Image content type is required".to_string())?;

    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| format!("Unsupported image type: {}", content_type))
}

/// Normalize an optional display name: blank names are stored as absent
pub fn normalize_clothing_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
