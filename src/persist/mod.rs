//! Snapshot persistence
//!
//! The engine core is tick-driven and synchronous; only this boundary is
//! async. Snapshots are serialized to pretty JSON and handed to a
//! [`ByteStore`], whose default implementation writes plain files under a
//! data directory.

pub mod presets;

use crate::store::Snapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Abstract keyed byte storage. Keys are relative slash-separated paths
/// (e.g. `"autosave.json"`, `"presets/race.json"`).
#[async_trait]
pub trait ByteStore {
    /// Read the bytes stored under `key`, or `None` when absent.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `bytes` under `key`, replacing any previous content.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// List keys directly under `prefix`, in sorted order.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Filesystem-backed [`ByteStore`] rooted at a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ByteStore for FileStore {
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", path.display()))
            },
        }
    }

    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.resolve(prefix);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()))
            },
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?
        {
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                let name = entry.file_name().to_string_lossy().into_owned();
                keys.push(format!("{prefix}/{name}"));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Serialize a snapshot to pretty JSON and store it under `key`.
pub async fn save_snapshot(store: &dyn ByteStore, key: &str, snapshot: &Snapshot) -> Result<()> {
    let json =
        serde_json::to_vec_pretty(snapshot).context("Failed to serialize snapshot")?;
    store.write_bytes(key, &json).await?;
    info!("Snapshot saved to {key}");
    Ok(())
}

/// Load a snapshot stored under `key`, or `None` when absent.
pub async fn load_snapshot(store: &dyn ByteStore, key: &str) -> Result<Option<Snapshot>> {
    let Some(bytes) = store.read_bytes(key).await? else {
        return Ok(None);
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse snapshot {key}"))?;
    debug!("Snapshot loaded from {key} ({} parameters)", snapshot.len());
    Ok(Some(snapshot))
}
