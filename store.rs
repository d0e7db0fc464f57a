use crate::config::{now_string, AppPaths};
use crate::error::{Error, Result};
use crate::models::{CatalogEntry, ImageMetadataRecord, MetadataDocument, StoreSettings};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const BACKUP_PREFIX: &str = "metadata_backup_";
const BACKUP_SUFFIX: &str = ".json";
const MAX_BACKUPS: usize = 10;

/// File-backed catalog of image metadata records. The whole envelope
/// document lives in memory; every save rewrites it in full.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    backups_dir: PathBuf,
    document: MetadataDocument,
}

impl MetadataStore {
    /// Loads the catalog. An absent file is initialized with an empty
    /// envelope; a legacy plain-mapping file is adopted as the images
    /// mapping; anything unparseable is logged and treated as empty.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let document = match fs::read_to_string(&paths.metadata_path) {
            Ok(raw) => parse_document(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "Initializing metadata store at {}",
                    paths.metadata_path.display()
                );
                let document = empty_document();
                write_document(&paths.metadata_path, &document)?;
                document
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path: paths.metadata_path.clone(),
            backups_dir: paths.backups_dir.clone(),
            document,
        })
    }

    pub fn images(&self) -> &BTreeMap<String, ImageMetadataRecord> {
        &self.document.images
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.document.settings
    }

    pub fn is_empty(&self) -> bool {
        self.document.images.is_empty()
    }

    /// Inserts or overwrites the record for a path. Re-saving the same
    /// path never duplicates an entry.
    pub fn upsert(&mut self, path: impl Into<String>, record: ImageMetadataRecord) {
        self.document.images.insert(path.into(), record);
    }

    /// Rewrites the envelope document in full, then triggers a
    /// best-effort backup when auto-backup is enabled.
    pub fn save(&mut self) -> Result<()> {
        self.document.total_images = self.document.images.len();
        self.document.last_updated = now_string();
        write_document(&self.path, &self.document)
            .map_err(|err| Error::Persistence(format!("{}: {}", self.path.display(), err)))?;

        if self.document.settings.auto_backup {
            if let Err(err) = self.backup() {
                log::warn!("Backup failed for {}: {}", self.path.display(), err);
            }
        }
        Ok(())
    }

    /// Copies the just-written document into the backup directory under
    /// a second-precision timestamped name and prunes old copies. The
    /// caller may ignore the result; `save` logs and continues.
    pub fn backup(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.backups_dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = self
            .backups_dir
            .join(format!("{}{}{}", BACKUP_PREFIX, stamp, BACKUP_SUFFIX));
        fs::copy(&self.path, &backup_path)?;
        prune_backups(&self.backups_dir, MAX_BACKUPS)?;
        Ok(backup_path)
    }

    /// Writes the raw path -> record mapping, without the envelope, to
    /// the destination.
    pub fn export(&self, destination: &Path) -> Result<()> {
        if self.document.images.is_empty() {
            return Err(Error::NothingToExport);
        }
        fs::write(
            destination,
            serde_json::to_string_pretty(&self.document.images)?,
        )
        .map_err(|err| Error::Persistence(format!("{}: {}", destination.display(), err)))?;
        log::info!(
            "Exported {} records to {}",
            self.document.images.len(),
            destination.display()
        );
        Ok(())
    }

    /// Summary rows for the saved-images listing, in stable path order.
    pub fn list(&self) -> Vec<CatalogEntry> {
        self.document
            .images
            .iter()
            .map(|(path, record)| CatalogEntry {
                filepath: path.clone(),
                filename: record.file_info.filename.clone(),
                resolution: record.image_dimensions.resolution.clone(),
                saved_at: record.timestamps.metadata_created.clone(),
            })
            .collect()
    }
}

fn empty_document() -> MetadataDocument {
    let now = now_string();
    MetadataDocument {
        metadata_version: "1.0".to_string(),
        created_at: now.clone(),
        last_updated: now,
        total_images: 0,
        images: BTreeMap::new(),
        settings: StoreSettings::default(),
    }
}

/// Resolves the two accepted on-disk shapes into the canonical envelope:
/// the envelope itself, or a legacy bare path -> record mapping.
fn parse_document(raw: &str) -> MetadataDocument {
    match serde_json::from_str::<MetadataDocument>(raw) {
        Ok(document) => document,
        Err(envelope_err) => {
            match serde_json::from_str::<BTreeMap<String, ImageMetadataRecord>>(raw) {
                Ok(images) => {
                    log::info!("Migrating legacy metadata file ({} records)", images.len());
                    let mut document = empty_document();
                    document.total_images = images.len();
                    document.images = images;
                    document
                }
                Err(_) => {
                    log::error!("Failed to parse metadata file: {}", envelope_err);
                    empty_document()
                }
            }
        }
    }
}

fn write_document(path: &Path, document: &MetadataDocument) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(document)?)?;
    Ok(())
}

/// Deletes all but the `keep` most recent backups. Filenames embed a
/// fixed-width timestamp, so lexicographic descending order is newest
/// first.
fn prune_backups(dir: &Path, keep: usize) -> Result<()> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX))
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));

    for stale in names.iter().skip(keep) {
        fs::remove_file(dir.join(stale))?;
    }
    Ok(())
}
