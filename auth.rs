use crate::error::{AuthError, RegisterError, Result};
use crate::models::UserRecord;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin123";
const DEFAULT_DISPLAY_NAME: &str = "Administrador";
// Seeded literally, matching documents written by earlier versions.
const DEFAULT_CREATED_AT: &str = "2025-12-01";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Flat-file credential store. Every call re-reads the backing file, so
/// there is no cache to invalidate; single-process synchronous use only.
///
/// The password digest is unsalted SHA-256. That is a known weakness
/// (identical passwords share a digest) kept for compatibility with
/// existing users files; see DESIGN.md.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the users file with the default admin record if absent.
    pub fn ensure_store_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        log::info!("Creating users file at {}", self.path.display());
        let mut users = BTreeMap::new();
        users.insert(
            DEFAULT_USERNAME.to_string(),
            UserRecord {
                password: hash_password(DEFAULT_PASSWORD),
                name: DEFAULT_DISPLAY_NAME.to_string(),
                created_at: DEFAULT_CREATED_AT.to_string(),
            },
        );
        self.write_users(&users)
    }

    /// Checks a username/password pair and returns the stored display
    /// name on success.
    pub fn verify(&self, username: &str, password: &str) -> Result<String> {
        let users = self.read_users()?;
        let record = users.get(username).ok_or(AuthError::UserNotFound)?;
        if record.password != hash_password(password) {
            return Err(AuthError::WrongPassword.into());
        }
        Ok(record.name.clone())
    }

    /// Validates and appends a new credential record, rewriting the
    /// whole file. Validation order matches the registration dialog:
    /// missing fields, username length, password length, confirmation,
    /// then uniqueness.
    pub fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        let name = name.trim();
        let username = username.trim();
        if name.is_empty() || username.is_empty() || password.is_empty() {
            return Err(RegisterError::MissingField.into());
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(RegisterError::UsernameTooShort.into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::PasswordTooShort.into());
        }
        if password != confirm {
            return Err(RegisterError::PasswordMismatch.into());
        }

        let mut users = self.read_users()?;
        if users.contains_key(username) {
            return Err(RegisterError::UsernameTaken.into());
        }
        users.insert(
            username.to_string(),
            UserRecord {
                password: hash_password(password),
                name: name.to_string(),
                created_at: crate::config::now_string(),
            },
        );
        self.write_users(&users)?;
        log::info!("Registered user {}", username);
        Ok(())
    }

    fn read_users(&self) -> Result<BTreeMap<String, UserRecord>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_users(&self, users: &BTreeMap<String, UserRecord>) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(users)?)?;
        Ok(())
    }
}

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
