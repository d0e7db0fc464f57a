use crate::config::{format_unix, now_string};
use crate::error::{Error, Result};
use crate::models::{
    AspectRatio, ColorInfo, FileInfo, FileSize, ImageDimensions, ImageMetadataRecord, Statistics,
    SystemInfo, Timestamps,
};
use image::GenericImageView;
use md5::{Digest, Md5};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};

const HASH_CHUNK_SIZE: usize = 8192;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Derives the full metadata record for an image file. Deterministic for
/// unchanged file content, apart from the `metadata_created` stamp.
pub fn compute_metadata(path: &Path) -> Result<ImageMetadataRecord> {
    let img = image::open(path)
        .map_err(|err| Error::FileNotReadable(format!("{}: {}", path.display(), err)))?;
    let (width, height) = img.dimensions();
    let color = img.color();
    let fs_meta = fs::metadata(path)
        .map_err(|err| Error::FileNotReadable(format!("{}: {}", path.display(), err)))?;

    let size_bytes = fs_meta.len();
    let size_mb = round_to(size_bytes as f64 / MIB, 2);

    Ok(ImageMetadataRecord {
        file_info: build_file_info(path),
        file_size: build_file_size(size_bytes),
        image_dimensions: build_dimensions(width, height),
        aspect_ratio: build_aspect_ratio(width, height),
        color_info: build_color_info(color),
        timestamps: build_timestamps(&fs_meta),
        system_info: build_system_info(path, &fs_meta)?,
        statistics: build_statistics(width, height, size_mb),
    })
}

fn build_file_info(path: &Path) -> FileInfo {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let directory = path
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_default();
    let drive = match path.components().next() {
        Some(Component::Prefix(prefix)) => prefix.as_os_str().to_string_lossy().into_owned(),
        _ => String::new(),
    };
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let format = if extension.is_empty() {
        "UNKNOWN".to_string()
    } else {
        extension.clone()
    };

    FileInfo {
        filename,
        filename_without_extension: stem,
        filepath: path.to_string_lossy().into_owned(),
        directory,
        drive,
        file_extension: extension,
        file_format: format,
    }
}

fn build_file_size(bytes: u64) -> FileSize {
    let kilobytes = round_to(bytes as f64 / KIB, 2);
    let megabytes = round_to(bytes as f64 / MIB, 2);
    let gigabytes = round_to(bytes as f64 / GIB, 4);
    let human_readable = if megabytes >= 1.0 {
        format!("{} MB", decimal_string(megabytes))
    } else {
        format!("{} KB", decimal_string(kilobytes))
    };

    FileSize {
        bytes,
        kilobytes,
        megabytes,
        gigabytes,
        human_readable,
        category: size_category(megabytes).to_string(),
    }
}

fn build_dimensions(width: u32, height: u32) -> ImageDimensions {
    let total_pixels = width as u64 * height as u64;
    ImageDimensions {
        width_pixels: width,
        height_pixels: height,
        resolution: format!("{}x{}", width, height),
        total_pixels,
        megapixels: round_to(total_pixels as f64 / 1_000_000.0, 2),
        resolution_category: resolution_category(total_pixels).to_string(),
    }
}

fn build_aspect_ratio(width: u32, height: u32) -> AspectRatio {
    let decimal = if height > 0 {
        round_to(width as f64 / height as f64, 4)
    } else {
        0.0
    };
    let (ratio_w, ratio_h) = reduce_ratio(width, height);
    let orientation = if width > height {
        "Horizontal (Landscape)"
    } else if height > width {
        "Vertical (Portrait)"
    } else {
        "Cuadrado (Square)"
    };

    AspectRatio {
        decimal,
        ratio: format!("{}:{}", ratio_w, ratio_h),
        orientation: orientation.to_string(),
        is_landscape: width > height,
        is_portrait: height > width,
        is_square: width == height,
    }
}

fn build_color_info(color: image::ColorType) -> ColorInfo {
    let bits = color.bits_per_pixel();
    ColorInfo {
        bits_per_pixel: bits,
        has_alpha_channel: color.has_alpha(),
        color_depth: format!("{} bits", bits),
    }
}

fn build_timestamps(meta: &fs::Metadata) -> Timestamps {
    let mtime = system_time_secs(meta.modified().ok());
    let atime = system_time_secs(meta.accessed().ok());
    let ctime = change_time_secs(meta).unwrap_or(mtime);

    Timestamps {
        metadata_created: now_string(),
        file_modified: format_unix(mtime),
        file_accessed: format_unix(atime),
        file_created_system: format_unix(ctime),
        unix_timestamp_modified: mtime,
        unix_timestamp_accessed: atime,
    }
}

fn build_system_info(path: &Path, meta: &fs::Metadata) -> Result<SystemInfo> {
    Ok(SystemInfo {
        file_mode: file_mode_string(meta),
        file_inode: inode(meta),
        operating_system: std::env::consts::OS.to_string(),
        file_hash_md5: file_digest(path)?,
    })
}

fn build_statistics(width: u32, height: u32, _size_mb: f64) -> Statistics {
    let total_pixels = width as u64 * height as u64;
    let percentage = if height > 0 {
        round_to(width as f64 / height as f64 * 100.0, 2)
    } else {
        0.0
    };

    Statistics {
        aspect_ratio_percentage: percentage,
        // No compression analysis is performed.
        compression_ratio_estimate: "N/A".to_string(),
        pixel_density_category: resolution_category(total_pixels).to_string(),
        recommended_use: recommended_use(total_pixels).to_string(),
    }
}

/// MD5 of the full file contents, streamed in fixed-size chunks so large
/// files are never held in memory whole.
fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Reduces a dimension pair by its GCD; a degenerate pair with a zero
/// width or height is returned unreduced.
pub fn reduce_ratio(width: u32, height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let divisor = gcd(width, height);
    (width / divisor, height / divisor)
}

/// Size bands over the rounded megabyte value. Lower bound inclusive,
/// upper bound exclusive, first match wins.
fn size_category(megabytes: f64) -> &'static str {
    if megabytes < 0.1 {
        "Muy pequeño"
    } else if megabytes < 1.0 {
        "Pequeño"
    } else if megabytes < 5.0 {
        "Mediano"
    } else if megabytes < 10.0 {
        "Grande"
    } else {
        "Muy grande"
    }
}

fn resolution_category(total_pixels: u64) -> &'static str {
    if total_pixels < 500_000 {
        "Baja resolución"
    } else if total_pixels < 2_000_000 {
        "Resolución estándar"
    } else if total_pixels < 8_000_000 {
        "Alta resolución (HD)"
    } else if total_pixels < 20_000_000 {
        "Muy alta resolución (Full HD/4K)"
    } else {
        "Ultra alta resolución (8K+)"
    }
}

fn recommended_use(total_pixels: u64) -> &'static str {
    if total_pixels < 500_000 {
        "Iconos, miniaturas, web pequeña"
    } else if total_pixels < 2_000_000 {
        "Web estándar, redes sociales"
    } else if total_pixels < 8_000_000 {
        "Impresión pequeña, pantallas HD"
    } else if total_pixels < 20_000_000 {
        "Impresión grande, fotografía profesional"
    } else {
        "Impresión comercial, publicidad, arte digital"
    }
}

/// Renders an already-rounded value with at least one decimal place, so
/// whole numbers read "1.0 MB" as in documents written by earlier
/// versions.
fn decimal_string(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn system_time_secs(time: Option<SystemTime>) -> i64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(unix)]
fn change_time_secs(meta: &fs::Metadata) -> Option<i64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ctime())
}

#[cfg(not(unix))]
fn change_time_secs(meta: &fs::Metadata) -> Option<i64> {
    meta.created().ok().map(|t| system_time_secs(Some(t)))
}

#[cfg(unix)]
fn file_mode_string(meta: &fs::Metadata) -> String {
    use std::os::unix::fs::MetadataExt;
    format!("0o{:o}", meta.mode())
}

#[cfg(not(unix))]
fn file_mode_string(_meta: &fs::Metadata) -> String {
    "N/A".to_string()
}

#[cfg(unix)]
fn inode(meta: &fs::Metadata) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    Some(meta.ino())
}

#[cfg(not(unix))]
fn inode(_meta: &fs::Metadata) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn reduce_full_hd_to_sixteen_nine() {
        assert_eq!(reduce_ratio(1920, 1080), (16, 9));
    }

    #[test]
    fn reduce_with_zero_dimension_falls_back() {
        assert_eq!(reduce_ratio(0, 500), (0, 500));
        assert_eq!(reduce_ratio(640, 0), (640, 0));
    }

    #[test]
    fn one_mebibyte_is_mediano() {
        // 1_048_576 bytes rounds to exactly 1.0 MB, which must land in
        // the "Mediano" band, not "Pequeño".
        let size = build_file_size(1_048_576);
        assert_eq!(size.megabytes, 1.0);
        assert_eq!(size.category, "Mediano");
        assert_eq!(size.human_readable, "1.0 MB");
    }

    #[test]
    fn human_readable_keeps_one_decimal_minimum() {
        // Whole numbers render with a trailing ".0", fractional values
        // keep their rounded form.
        assert_eq!(build_file_size(1_572_864).human_readable, "1.5 MB");
        assert_eq!(build_file_size(2_097_152).human_readable, "2.0 MB");
        assert_eq!(build_file_size(1_280).human_readable, "1.25 KB");
    }

    #[test]
    fn sub_megabyte_reads_in_kilobytes() {
        let size = build_file_size(512 * 1024);
        assert_eq!(size.category, "Pequeño");
        assert_eq!(size.human_readable, "512.0 KB");
        assert_eq!(size.gigabytes, 0.0005);
    }

    #[test]
    fn half_million_pixels_is_estandar() {
        assert_eq!(resolution_category(499_999), "Baja resolución");
        assert_eq!(resolution_category(500_000), "Resolución estándar");
        assert_eq!(resolution_category(20_000_000), "Ultra alta resolución (8K+)");
    }

    #[test]
    fn aspect_ratio_of_landscape_image() {
        let aspect = build_aspect_ratio(1920, 1080);
        assert_eq!(aspect.ratio, "16:9");
        assert_eq!(aspect.decimal, 1.7778);
        assert_eq!(aspect.orientation, "Horizontal (Landscape)");
        assert!(aspect.is_landscape);
        assert!(!aspect.is_portrait);
        assert!(!aspect.is_square);
    }

    #[test]
    fn square_image_sets_square_flags() {
        let aspect = build_aspect_ratio(256, 256);
        assert_eq!(aspect.ratio, "1:1");
        assert_eq!(aspect.decimal, 1.0);
        assert_eq!(aspect.orientation, "Cuadrado (Square)");
        assert!(aspect.is_square);
    }

    #[test]
    fn md5_digest_matches_known_vector() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vector.bin");
        std::fs::write(&path, b"hello world").unwrap();
        assert_eq!(
            file_digest(&path).unwrap(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[test]
    fn unreadable_path_reports_file_not_readable() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.png");
        match compute_metadata(&missing) {
            Err(Error::FileNotReadable(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }

        let not_an_image = tmp.path().join("notes.png");
        std::fs::write(&not_an_image, b"plain text").unwrap();
        match compute_metadata(&not_an_image) {
            Err(Error::FileNotReadable(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn record_fields_for_a_small_png() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "sample.png", 640, 480);
        let record = compute_metadata(&path).unwrap();

        assert_eq!(record.file_info.filename, "sample.png");
        assert_eq!(record.file_info.filename_without_extension, "sample");
        assert_eq!(record.file_info.file_extension, "PNG");
        assert_eq!(record.file_info.file_format, "PNG");
        assert_eq!(
            record.file_info.directory,
            tmp.path().to_string_lossy().as_ref()
        );

        assert_eq!(record.image_dimensions.resolution, "640x480");
        assert_eq!(record.image_dimensions.total_pixels, 307_200);
        assert_eq!(record.image_dimensions.megapixels, 0.31);
        assert_eq!(
            record.image_dimensions.resolution_category,
            "Baja resolución"
        );

        assert_eq!(record.aspect_ratio.ratio, "4:3");
        assert!(record.color_info.has_alpha_channel);
        assert_eq!(record.color_info.bits_per_pixel, 32);
        assert_eq!(record.color_info.color_depth, "32 bits");

        assert_eq!(record.statistics.compression_ratio_estimate, "N/A");
        assert_eq!(
            record.statistics.recommended_use,
            "Iconos, miniaturas, web pequeña"
        );
        assert_eq!(record.statistics.aspect_ratio_percentage, 133.33);
    }

    #[test]
    fn recomputation_is_deterministic_for_unchanged_content() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "stable.png", 320, 200);
        let first = compute_metadata(&path).unwrap();
        let second = compute_metadata(&path).unwrap();

        // Timestamps are excluded: metadata_created moves by definition
        // and atime may move when the hashing pass reads the file.
        assert_eq!(first.file_info, second.file_info);
        assert_eq!(first.file_size, second.file_size);
        assert_eq!(first.image_dimensions, second.image_dimensions);
        assert_eq!(first.aspect_ratio, second.aspect_ratio);
        assert_eq!(first.color_info, second.color_info);
        assert_eq!(first.system_info, second.system_info);
        assert_eq!(first.statistics, second.statistics);
    }
}
