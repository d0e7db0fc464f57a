use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One image's full metadata entry, keyed in the store by its file path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageMetadataRecord {
    pub file_info: FileInfo,
    pub file_size: FileSize,
    pub image_dimensions: ImageDimensions,
    pub aspect_ratio: AspectRatio,
    pub color_info: ColorInfo,
    pub timestamps: Timestamps,
    pub system_info: SystemInfo,
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileInfo {
    pub filename: String,
    pub filename_without_extension: String,
    pub filepath: String,
    pub directory: String,
    pub drive: String,
    pub file_extension: String,
    pub file_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSize {
    pub bytes: u64,
    pub kilobytes: f64,
    pub megabytes: f64,
    pub gigabytes: f64,
    pub human_readable: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageDimensions {
    pub width_pixels: u32,
    pub height_pixels: u32,
    pub resolution: String,
    pub total_pixels: u64,
    pub megapixels: f64,
    pub resolution_category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AspectRatio {
    pub decimal: f64,
    pub ratio: String,
    pub orientation: String,
    pub is_landscape: bool,
    pub is_portrait: bool,
    pub is_square: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorInfo {
    pub bits_per_pixel: u16,
    pub has_alpha_channel: bool,
    pub color_depth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timestamps {
    pub metadata_created: String,
    pub file_modified: String,
    pub file_accessed: String,
    pub file_created_system: String,
    pub unix_timestamp_modified: i64,
    pub unix_timestamp_accessed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemInfo {
    pub file_mode: String,
    pub file_inode: Option<u64>,
    pub operating_system: String,
    pub file_hash_md5: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub aspect_ratio_percentage: f64,
    pub compression_ratio_estimate: String,
    pub pixel_density_category: String,
    pub recommended_use: String,
}

/// Top-level persisted document wrapping version metadata, settings and
/// the path -> record mapping. Rewritten in full on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub metadata_version: String,
    pub created_at: String,
    pub last_updated: String,
    pub total_images: usize,
    pub images: BTreeMap<String, ImageMetadataRecord>,
    pub settings: StoreSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    pub auto_backup: bool,
    // Stored for compatibility with existing documents; not enforced.
    pub max_images: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            max_images: 1000,
        }
    }
}

/// Summary row for the saved-images listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub filepath: String,
    pub filename: String,
    pub resolution: String,
    pub saved_at: String,
}

/// One credential record in the users file. `password` holds the SHA-256
/// hex digest of the plaintext, never the plaintext itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub password: String,
    pub name: String,
    pub created_at: String,
}
