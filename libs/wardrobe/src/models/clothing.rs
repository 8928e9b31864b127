//! Clothing item model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Clothing category. Stored and matched by its exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Top,
    Bottom,
    Dresses,
    Shoes,
    Accessory,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Top,
        Category::Bottom,
        Category::Dresses,
        Category::Shoes,
        Category::Accessory,
    ];

    /// Get the category name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Bottom => "Bottom",
            Category::Dresses => "Dresses",
            Category::Shoes => "Shoes",
            Category::Accessory => "Accessory",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
                format!(
                    "Invalid category '{}', expected one of: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// Clothing item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub clothing_name: Option<String>,
    pub category: Category,
    /// URI of the stored image object
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New clothing item, after validation and image upload
#[derive(Debug, Clone)]
pub struct NewClothingItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub clothing_name: Option<String>,
    pub category: Category,
    pub image: String,
}

/// Raw image payload as received from the client
#[derive(Clone, Default)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Unvalidated add-clothing request
#[derive(Debug, Clone, Default)]
pub struct NewItemRequest {
    pub clothing_name: Option<String>,
    pub category: Option<String>,
    pub image: Option<ImageUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_exact_names_only() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert!("top".parse::<Category>().is_err());
        assert!("Hat".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_string(&Category::Dresses).unwrap();
        assert_eq!(json, "\"Dresses\"");
    }

    #[test]
    fn test_image_upload_debug_hides_bytes() {
        let upload = ImageUpload {
            file_name: Some("shirt.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![0; 4096],
        };
        let debug = format!("{:?}", upload);
        assert!(debug.contains("len: 4096"));
        assert!(!debug.contains("0, 0"));
    }
}
