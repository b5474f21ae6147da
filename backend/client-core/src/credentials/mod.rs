//! Operator credentials persisted across sessions.
//!
//! Two values survive restarts: the operator secret and the last pager
//! address. Both are written on operator actions only; nothing the
//! controller pushes ever lands here.

use crate::error::credentials::CredentialsError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// The persisted values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredCredentials {
    pub password: Option<String>,
    pub pager_address: Option<u32>,
}

/// JSON-file store for [`StoredCredentials`].
///
/// Writes go through a temp file and rename, so a crash mid-save never
/// leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The per-user default location, `None` when the platform has no
    /// config directory.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pagerctl"))
    }

    fn path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE_NAME)
    }

    /// Load the stored credentials.
    ///
    /// A missing file reads as defaults; an unreadable or unparseable file
    /// is an error the caller decides how to handle.
    pub fn load(&self) -> Result<StoredCredentials, CredentialsError> {
        let path = self.path();

        if !path.exists() {
            debug!("No credentials file at {}, using defaults", path.display());
            return Ok(StoredCredentials::default());
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|e| CredentialsError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: path.clone(),
                source: e,
            })?;

        serde_json::from_str(&contents).map_err(|e| CredentialsError::ParseError {
            location: ErrorLocation::from(Location::caller()),
            path,
            reason: e.to_string(),
        })
    }

    /// Load, downgrading any error to defaults with a warning.
    pub fn load_or_default(&self) -> StoredCredentials {
        self.load().unwrap_or_else(|e| {
            warn!("Failed to read stored credentials, starting clean: {e}");
            StoredCredentials::default()
        })
    }

    /// Save the credentials using an atomic write.
    pub fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialsError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CredentialsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path();
        let temp_path = self.dir.join(format!("{CREDENTIALS_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(credentials).map_err(|e| {
            CredentialsError::SerializeError {
                location: ErrorLocation::from(Location::caller()),
                reason: e.to_string(),
            }
        })?;

        std::fs::write(&temp_path, json).map_err(|e| CredentialsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        // Atomic rename (POSIX guarantees atomicity)
        std::fs::rename(&temp_path, &path).map_err(|e| CredentialsError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path,
            source: e,
        })
    }

    /// Persist the operator secret, keeping the stored pager address.
    ///
    /// An existing unreadable file is overwritten rather than treated
    /// as fatal.
    pub fn store_password(&self, password: &str) -> Result<(), CredentialsError> {
        let mut credentials = self.load_or_default();
        credentials.password = Some(password.to_owned());
        self.save(&credentials)
    }

    /// Persist the pager address, keeping the stored secret.
    pub fn store_address(&self, address: u32) -> Result<(), CredentialsError> {
        let mut credentials = self.load_or_default();
        credentials.pager_address = Some(address);
        self.save(&credentials)
    }
}
