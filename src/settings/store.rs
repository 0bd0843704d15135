//! Settings persistence.
//!
//! # Responsibilities
//! - Hold the single canonical settings blob
//! - Replace it atomically on write
//! - Keep backend detail out of caller-facing messages
//!
//! The blob is opaque here; decoding and validation happen above this layer.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::config::schema::{StoreBackend, StoreConfig};
use crate::settings::document::Settings;
use crate::settings::error::SettingsError;

/// Longest backend message surfaced to callers.
const MAX_PUBLIC_MESSAGE_LEN: usize = 200;

static URL_CREDENTIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)[^/@\s]+@")
        .expect("valid credentials pattern")
});

static KEY_VALUE_SECRETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?P<key>password|passwd|secret|token)=\S+").expect("valid secret pattern")
});

/// Errors raised by a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No settings document has been written yet.
    #[error("settings have not been initialized")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (unreachable, query error, ...).
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Message safe to hand back to an API caller.
    pub fn sanitized(&self) -> String {
        sanitize_store_message(&self.to_string())
    }
}

/// Strip backend-internal detail from a storage error message.
///
/// Keeps the first line only, masks credentials embedded in URLs and
/// `key=value` pairs, and caps the length.
pub fn sanitize_store_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    let masked = URL_CREDENTIALS.replace_all(first_line, "${scheme}***@");
    let masked = KEY_VALUE_SECRETS.replace_all(&masked, "${key}=***");

    if masked.chars().count() > MAX_PUBLIC_MESSAGE_LEN {
        let mut out: String = masked.chars().take(MAX_PUBLIC_MESSAGE_LEN).collect();
        out.push_str("...");
        out
    } else {
        masked.into_owned()
    }
}

/// Storage for the single settings document.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current canonical blob.
    async fn get(&self) -> Result<Vec<u8>, StoreError>;

    /// Replace the stored blob as a whole.
    async fn put(&self, blob: &[u8]) -> Result<(), StoreError>;
}

/// In-process store. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a blob.
    pub fn with_blob(blob: Vec<u8>) -> Self {
        Self {
            blob: RwLock::new(Some(blob)),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> Result<Vec<u8>, StoreError> {
        self.blob.read().await.clone().ok_or(StoreError::NotFound)
    }

    async fn put(&self, blob: &[u8]) -> Result<(), StoreError> {
        *self.blob.write().await = Some(blob.to_vec());
        Ok(())
    }
}

/// Store backed by a single file on disk.
///
/// Writes go to a uniquely named sibling file which is then renamed over the
/// target, so readers see either the old or the new document.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl SettingsStore for FileStore {
    async fn get(&self) -> Result<Vec<u8>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(&self, blob: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = self.staging_path();
        if let Err(e) = write_synced(&staging, blob).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(path = ?self.path, bytes = blob.len(), "Settings file replaced");
        Ok(())
    }
}

/// Write `blob` to a fresh file and flush it to disk before it is renamed
/// over the live document.
async fn write_synced(path: &Path, blob: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(blob).await?;
    file.sync_all().await
}

/// Build the store selected by the bootstrap configuration.
pub fn open(config: &StoreConfig) -> Arc<dyn SettingsStore> {
    match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::new(&config.path)),
    }
}

/// Write the bootstrap document if the store is empty.
///
/// Returns `true` when a document was written.
pub async fn ensure_initialized(store: &dyn SettingsStore) -> Result<bool, SettingsError> {
    match store.get().await {
        Ok(_) => Ok(false),
        Err(StoreError::NotFound) => {
            let blob = Settings::bootstrap()
                .canonicalize()
                .map_err(SettingsError::Encode)?;
            store.put(&blob).await.map_err(SettingsError::Update)?;
            tracing::info!("Settings store initialized with bootstrap document");
            Ok(true)
        }
        Err(e) => Err(SettingsError::Fetch(e)),
    }
}
