use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "image_metadata.json";
pub const USERS_FILE: &str = "users.json";
pub const BACKUPS_DIR: &str = "backups";

/// Resolved locations of everything the application persists.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub metadata_path: PathBuf,
    pub users_path: PathBuf,
    pub backups_dir: PathBuf,
}

impl AppPaths {
    /// Resolves the per-user data directory and ensures it exists.
    pub fn discover() -> Result<Self> {
        let root = dirs::data_dir()
            .map(|dir| dir.join("metadata-gen"))
            .ok_or_else(|| Error::Path("Failed to get user data dir".to_string()))?;
        Self::at(root)
    }

    /// Anchors all paths under an explicit root. Used by the CLI's
    /// `--data-dir` override and by tests.
    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            metadata_path: root.join(METADATA_FILE),
            users_path: root.join(USERS_FILE),
            backups_dir: root.join(BACKUPS_DIR),
            root,
        })
    }
}

/// Timestamp format used everywhere a human-readable time is persisted.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_string() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Formats Unix seconds in the local timezone, empty string when the
/// value does not map to a valid local time.
pub fn format_unix(secs: i64) -> String {
    use chrono::TimeZone;
    chrono::Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn at_creates_root_and_joins_children() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("data");
        let paths = AppPaths::at(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(paths.metadata_path, root.join(METADATA_FILE));
        assert_eq!(paths.users_path, root.join(USERS_FILE));
        assert_eq!(paths.backups_dir, root.join(BACKUPS_DIR));
    }

    #[test]
    fn format_unix_roundtrips_through_local_time() {
        use chrono::TimeZone;
        let formatted = format_unix(1_700_000_000);
        let parsed = chrono::NaiveDateTime::parse_from_str(&formatted, TIMESTAMP_FORMAT).unwrap();
        let local = chrono::Local.from_local_datetime(&parsed).single().unwrap();
        assert_eq!(local.timestamp(), 1_700_000_000);
    }

    #[test]
    fn json_extension_check_is_case_insensitive() {
        assert!(is_json_file(Path::new("export.JSON")));
        assert!(!is_json_file(Path::new("export.csv")));
    }
}
