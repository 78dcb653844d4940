//! Core storage engine: sandboxed, atomic, optionally compressed file I/O.

use crate::error::{StorageError, StorageErrorExt};
use crate::sandbox::{self, NamespaceName};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Marker embedded in in-flight temporary file names.
const TMP_MARKER: &str = ".atltmp.";
/// Temporary files older than this are considered crash leftovers.
const TMP_STALE_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn encode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decode(self, data: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(data).context("Lz4 decompression failed")
            },
        }
    }
}

#[derive(Debug)]
struct StorageInner {
    root: PathBuf,
    compression: Compression,
    tmp_counter: AtomicU64,
}

/// A thread-safe handle to the attachment store.
///
/// All paths are validated against the canonical root, writes use an
/// atomic temp-write + fsync + rename swap, and owner namespaces shard
/// their files into prefix directories. The handle is reference-counted
/// and cheap to clone.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

/// A scoped view of the store for one owner namespace.
///
/// Inherits the sandbox and compression settings of the parent handle;
/// cloning is cheap.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: Arc<str>,
}

/// Builder for [`Storage`].
#[must_use = "The storage engine is not initialized until you call .connect()"]
#[derive(Debug, Default)]
pub struct StorageBuilder {
    root: Option<PathBuf>,
    compression: Compression,
    create: bool,
}

impl StorageBuilder {
    pub fn new() -> Self {
        Self { root: None, compression: Compression::None, create: true }
    }

    /// Sets the root directory of the sandbox.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Enables transparent compression for stored payloads.
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Whether to create the root directory when missing (default: true).
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }

    /// Initializes the engine: bootstraps and canonicalizes the root, then
    /// sweeps stale temporary files left behind by earlier crashes.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] when the root is missing (with
    /// `create(false)`) or cannot be resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = self.root.ok_or_else(|| StorageError::FileNotFound {
            message: "storage root not configured".into(),
            context: None,
        })?;

        if self.create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
            info!(path = %root.display(), "Bootstrapped storage root directory");
        }

        let canonical = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                compression: self.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        Ok(storage)
    }
}

impl Storage {
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Returns a namespaced view of the store.
    ///
    /// Names must be non-empty and alphanumeric/underscore; they are
    /// lowercased.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversal`] for illegal names.
    pub fn namespace(&self, name: impl AsRef<str>) -> Result<NamespacedStorage, StorageError> {
        let ns = NamespaceName::try_from(name.as_ref())?;
        Ok(NamespacedStorage { storage: self.clone(), namespace: Arc::from(ns.0.as_str()) })
    }

    /// Resolves a relative path to its physical sandbox location.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversal`] if the path escapes the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        sandbox::resolve(&self.inner.root, path)
    }

    /// Reads a file, transparently decompressing when enabled.
    ///
    /// # Errors
    /// Returns [`StorageError::FileNotFound`] for missing targets and
    /// [`StorageError::Decompress`] for corrupted payloads.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.read_scoped(None, path).await
    }

    /// Writes a file atomically (unique temp + fsync + rename).
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversal`] if the path escapes the
    /// sandbox and [`StorageError::Io`] on hardware failures.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.write_scoped(None, path, data).await
    }

    /// Deletes a file.
    ///
    /// # Errors
    /// Returns [`StorageError::FileNotFound`] for missing targets.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.delete_scoped(None, path).await
    }

    /// Checks file existence.
    ///
    /// # Errors
    /// Fails only when path resolution itself fails.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve_scoped(None, path)?.exists())
    }

    /// Filesystem metadata for a stored file. With compression enabled,
    /// `len()` is the on-disk size, not the payload size.
    ///
    /// # Errors
    /// Returns [`StorageError::FileNotFound`] for missing targets.
    pub async fn metadata(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<std::fs::Metadata, StorageError> {
        let resolved = self.resolve_scoped(None, path)?;
        match fs::metadata(&resolved).await {
            Ok(meta) => Ok(meta),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to get metadata: {}", resolved.display()).into()),
            }),
        }
    }

    /// Removes stale temporary files under the root. Failures are logged,
    /// never fatal.
    pub async fn purge_tmp(&self) {
        let root = self.inner.root.clone();
        let swept = tokio::task::spawn_blocking(move || sweep_stale_tmp(&root)).await;
        match swept {
            Ok(removed) if removed > 0 => info!(removed, "Cleaned up temporary files"),
            Ok(_) => {},
            Err(e) => warn!(error = %e, "Temp file cleanup task panicked"),
        }
    }

    fn resolve_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        sandbox::resolve_sharded(&self.inner.root, namespace, path)
    }

    async fn read_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve_scoped(namespace, path)?;

        let data = match fs::read(&resolved).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", resolved.display()).into()),
                });
            },
        };

        self.inner.compression.decode(&data)
    }

    async fn write_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_scoped(namespace, path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create shards for {}", resolved.display()))?;
        }

        let tmp = self.tmp_path(&resolved);
        let payload = self.inner.compression.encode(data);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&tmp)
                .await
                .context(format!("Temp creation failed: {}", tmp.display()))?;
            file.write_all(&payload).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&tmp, &resolved).await {
            // Platforms without atomic replace: remove, then rename.
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(&resolved)
                    .await
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&tmp, &resolved).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    tmp.display(),
                    resolved.display()
                ))?;
            } else {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", tmp.display(), resolved.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), "File saved atomically");
        Ok(())
    }

    async fn delete_scoped(
        &self,
        namespace: Option<&str>,
        path: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let resolved = self.resolve_scoped(namespace, path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(())
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let n = self.inner.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
        target.with_file_name(format!("{file_name}{TMP_MARKER}{n}"))
    }
}

impl NamespacedStorage {
    /// Physical location of a namespaced file.
    ///
    /// # Errors
    /// Returns [`StorageError::PathTraversal`] if the path escapes the root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.storage.resolve_scoped(Some(&self.namespace), path)
    }

    /// Reads a namespaced file.
    ///
    /// # Errors
    /// See [`Storage::read`].
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        self.storage.read_scoped(Some(&self.namespace), path).await
    }

    /// Writes a namespaced file atomically.
    ///
    /// # Errors
    /// See [`Storage::write`].
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        self.storage.write_scoped(Some(&self.namespace), path, data).await
    }

    /// Deletes a namespaced file.
    ///
    /// # Errors
    /// See [`Storage::delete`].
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        self.storage.delete_scoped(Some(&self.namespace), path).await
    }

    /// Checks existence of a namespaced file.
    ///
    /// # Errors
    /// Fails only when path resolution itself fails.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.storage.resolve_scoped(Some(&self.namespace), path)?.exists())
    }
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn sweep_stale_tmp(root: &Path) -> usize {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        let path = entry.path();
        if path == root {
            continue;
        }

        if entry.file_type().is_dir() {
            let _ = std::fs::remove_dir(path); // only succeeds when empty
            continue;
        }

        let is_tmp = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(TMP_MARKER));
        if !is_tmp {
            continue;
        }

        let stale = std::fs::metadata(path)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|modified| now.duration_since(modified).ok())
            .is_none_or(|age| age > TMP_STALE_AFTER);

        if stale {
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Temp removal failed"),
            }
        }
    }

    removed
}
