//! File-backed record store
//!
//! The whole record sequence lives in one JSON file. Every mutation reads
//! the current snapshot, changes it in memory and writes the full sequence
//! back. Three rules keep that safe:
//!
//! - Mutations (`append`, `remove`, `save`) run one at a time behind an
//!   async mutex, so two interleaved load–mutate–save cycles cannot drop
//!   each other's changes.
//! - Each mutation runs on its own spawned task that holds the mutex until
//!   the write has finished. Dropping the caller's future (a client that
//!   disconnects mid-request) cannot release the lock while a write is
//!   still in flight.
//! - Writes go to a sibling `.tmp` file that is fsynced and then renamed
//!   over the snapshot. Readers take no lock and always observe either the
//!   previous or the new complete file.

use super::{IdGenerator, NewRecord, Record, RecordId};
use crate::error::{StoreError, StoreResult};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// What `load()` does when the snapshot exists but can't be read or parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Log a warning and treat the store as empty
    #[default]
    Lenient,
    /// Surface the failure to the caller (and refuse to open at startup)
    Strict,
}

/// Record store backed by a single snapshot file
#[derive(Debug)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    path: PathBuf,
    policy: LoadPolicy,
    ids: IdGenerator,
    write_lock: Mutex<()>,
}

impl StoreInner {
    async fn load(&self) -> StoreResult<Vec<Record>> {
        match read_snapshot(&self.path).await {
            Ok(records) => Ok(records),
            Err(e) => match self.policy {
                LoadPolicy::Strict => Err(e),
                LoadPolicy::Lenient => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Failed to read snapshot, treating store as empty"
                    );
                    Ok(Vec::new())
                }
            },
        }
    }
}

impl RecordStore {
    /// Open the store at `path`
    ///
    /// A missing file is fine (the store starts empty and the file is
    /// created on the first mutation). Existing ids seed the id generator.
    ///
    /// # Errors
    ///
    /// With [`LoadPolicy::Strict`], returns the read/parse failure of an
    /// existing snapshot. Lenient stores always open.
    pub async fn open(path: impl Into<PathBuf>, policy: LoadPolicy) -> StoreResult<Self> {
        let path = path.into();

        let records = match read_snapshot(&path).await {
            Ok(records) => records,
            Err(e) if policy == LoadPolicy::Strict => return Err(e),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Snapshot is unreadable; starting with an empty record store. \
                    The file will be overwritten by the next save."
                );
                Vec::new()
            }
        };

        let ids = IdGenerator::new();
        if let Some(max_id) = records.iter().map(|r| r.id).max() {
            ids.observe(max_id);
        }

        tracing::info!(
            path = %path.display(),
            records = records.len(),
            policy = ?policy,
            "Record store opened"
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                policy,
                ids,
                write_lock: Mutex::new(()),
            }),
        })
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn policy(&self) -> LoadPolicy {
        self.inner.policy
    }

    /// Read the current snapshot
    ///
    /// An absent or blank file yields an empty sequence.
    ///
    /// # Errors
    ///
    /// Only under [`LoadPolicy::Strict`]; lenient stores log the failure and
    /// return an empty sequence instead.
    pub async fn load(&self) -> StoreResult<Vec<Record>> {
        self.inner.load().await
    }

    /// Run `mutation` on a spawned task while holding the write lock
    ///
    /// The task runs to completion even if the returned future is dropped.
    async fn exclusive<T, F, Fut>(&self, mutation: F) -> StoreResult<T>
    where
        F: FnOnce(Arc<StoreInner>) -> Fut + Send + 'static,
        Fut: Future<Output = StoreResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _guard = inner.write_lock.lock().await;
            mutation(Arc::clone(&inner)).await
        });

        task.await.map_err(StoreError::TaskFailed)?
    }

    /// Replace the persisted snapshot with `records`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` or `StoreError::Serialize` if the new
    /// snapshot could not be written. The previous snapshot is left intact.
    pub async fn save(&self, records: &[Record]) -> StoreResult<()> {
        let records = records.to_vec();
        self.exclusive(move |inner| async move { write_snapshot(&inner.path, &records).await })
            .await
    }

    /// Assign an id to `new`, add it at the end of the snapshot and persist
    ///
    /// Returns the stored record and the updated sequence.
    pub async fn append(&self, new: NewRecord) -> StoreResult<(Record, Vec<Record>)> {
        self.exclusive(move |inner| async move {
            let mut records = inner.load().await?;
            if let Some(max_id) = records.iter().map(|r| r.id).max() {
                inner.ids.observe(max_id);
            }

            let record = new.with_id(inner.ids.next_id());
            records.push(record.clone());
            write_snapshot(&inner.path, &records).await?;

            tracing::debug!(
                id = %record.id,
                records = records.len(),
                "Record appended"
            );
            Ok((record, records))
        })
        .await
    }

    /// Drop every record with `id` from the snapshot and persist
    ///
    /// Returns the removed records (empty if none matched) and the updated
    /// sequence. Removing an id that isn't stored leaves the file untouched.
    pub async fn remove(&self, id: RecordId) -> StoreResult<(Vec<Record>, Vec<Record>)> {
        self.exclusive(move |inner| async move {
            let records = inner.load().await?;
            let (removed, kept): (Vec<Record>, Vec<Record>) =
                records.into_iter().partition(|r| r.id == id);

            if removed.is_empty() {
                tracing::debug!(id = %id, "Remove requested for unknown id, nothing to do");
                return Ok((removed, kept));
            }

            write_snapshot(&inner.path, &kept).await?;

            tracing::debug!(
                id = %id,
                removed = removed.len(),
                records = kept.len(),
                "Record removed"
            );
            Ok((removed, kept))
        })
        .await
    }
}

async fn read_snapshot(path: &Path) -> StoreResult<Vec<Record>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_snapshot(path: &Path, records: &[Record]) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
    let io_error = |at: &Path| {
        let at = at.to_path_buf();
        move |source| StoreError::Io { path: at, source }
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(io_error(parent))?;
    }

    let tmp = temp_path(path);
    let written = async {
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(io_error(tmp.as_path()))?;
        file.write_all(&json).await.map_err(io_error(tmp.as_path()))?;
        file.sync_all().await.map_err(io_error(tmp.as_path()))?;
        drop(file);
        tokio::fs::rename(&tmp, path).await.map_err(io_error(path))
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %tmp.display(),
                error = %cleanup,
                "Failed to remove temporary snapshot after write failure"
            );
        }
        return Err(e);
    }

    // Make the rename itself durable. Not every platform lets us open a
    // directory, so this is best effort.
    if let Some(parent) = parent
        && let Ok(dir) = tokio::fs::File::open(parent).await
        && let Err(e) = dir.sync_all().await
    {
        tracing::debug!(
            path = %parent.display(),
            error = %e,
            "Directory fsync after snapshot rename failed"
        );
    }

    Ok(())
}

/// `db.json` -> `db.json.tmp`, in the same directory so rename stays atomic
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    path.with_file_name(name)
}
