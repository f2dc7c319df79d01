use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, info};

use bazaar_application::{AuditReader, AuditSearchQuery, AuditWriter};
use bazaar_core::{AppError, AppResult};
use bazaar_domain::{AuditReadRecord, AuditRecord, AuditRecordId};

const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Process-lifetime audit state: records ordered by `(created_at, id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSnapshot {
    next_id: i64,
    records: Vec<AuditReadRecord>,
}

impl AuditSnapshot {
    /// Creates an empty snapshot whose first record gets id 1.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn append(&mut self, record: AuditRecord) -> AppResult<AuditRecordId> {
        let id = AuditRecordId::new(self.next_id);
        self.next_id = following_id(self.next_id)?;

        let record = record.into_read_record(id);
        let position = self.records.partition_point(|stored| {
            (stored.created_at(), stored.id()) <= (record.created_at(), record.id())
        });
        self.records.insert(position, record);

        Ok(id)
    }

    fn from_document(document: SnapshotDocument) -> AppResult<Self> {
        if document.version != SNAPSHOT_FORMAT_VERSION {
            return Err(AppError::Internal(format!(
                "unsupported audit snapshot version {}",
                document.version
            )));
        }

        let mut records = document.records;
        records.sort_by_key(|record| (record.created_at(), record.id()));
        let highest_id = records
            .iter()
            .map(|record| record.id().as_i64())
            .max()
            .unwrap_or(0);

        Ok(Self {
            next_id: document.next_id.max(following_id(highest_id)?),
            records,
        })
    }

    fn to_document(&self) -> SnapshotDocument {
        SnapshotDocument {
            version: SNAPSHOT_FORMAT_VERSION,
            next_id: self.next_id,
            records: self.records.clone(),
        }
    }
}

fn following_id(id: i64) -> AppResult<i64> {
    id.checked_add(1)
        .ok_or_else(|| AppError::Internal(format!("audit record ids exhausted after {id}")))
}

impl Default for AuditSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    next_id: i64,
    records: Vec<AuditReadRecord>,
}

/// Flat JSON file an `AuditSnapshot` is loaded from and flushed to.
#[derive(Debug, Clone)]
pub struct AuditSnapshotFile {
    path: PathBuf,
}

impl AuditSnapshotFile {
    /// Creates a handle for the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot location.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Reads the snapshot; a missing file yields an empty snapshot.
    pub async fn load(&self) -> AppResult<AuditSnapshot> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(AuditSnapshot::empty());
            }
            Err(error) => {
                return Err(AppError::Unavailable(format!(
                    "failed to read audit snapshot '{}': {error}",
                    self.path.display()
                )));
            }
        };

        let document: SnapshotDocument = serde_json::from_slice(&bytes).map_err(|error| {
            AppError::Internal(format!(
                "audit snapshot '{}' is corrupt: {error}",
                self.path.display()
            ))
        })?;

        AuditSnapshot::from_document(document)
    }

    /// Writes the snapshot through a temporary file renamed into place.
    pub async fn store(&self, snapshot: &AuditSnapshot) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(&snapshot.to_document()).map_err(|error| {
            AppError::Internal(format!("failed to encode audit snapshot: {error}"))
        })?;

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to create audit snapshot directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let temporary_path = self
            .path
            .with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&temporary_path, bytes)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to write audit snapshot '{}': {error}",
                    temporary_path.display()
                ))
            })?;
        tokio::fs::rename(&temporary_path, &self.path)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!(
                    "failed to replace audit snapshot '{}': {error}",
                    self.path.display()
                ))
            })
    }
}

/// Audit gateway over an in-memory snapshot persisted to a flat file.
///
/// Appends are serialized by the write lock; readers clone from a consistent
/// view under the read lock. The file is read by `open` and written by `flush`.
#[derive(Debug)]
pub struct SnapshotAuditRepository {
    file: AuditSnapshotFile,
    snapshot: RwLock<AuditSnapshot>,
}

impl SnapshotAuditRepository {
    /// Creates a repository over an already loaded snapshot.
    #[must_use]
    pub fn new(file: AuditSnapshotFile, snapshot: AuditSnapshot) -> Self {
        Self {
            file,
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Loads the snapshot file and creates a repository over it.
    pub async fn open(file: AuditSnapshotFile) -> AppResult<Self> {
        let snapshot = file.load().await?;
        info!(
            path = %file.path().display(),
            records = snapshot.len(),
            "loaded audit snapshot"
        );

        Ok(Self::new(file, snapshot))
    }

    /// Writes the current snapshot to its file.
    pub async fn flush(&self) -> AppResult<()> {
        let snapshot = self.snapshot.read().await.clone();

        match self.file.store(&snapshot).await {
            Ok(()) => {
                info!(
                    path = %self.file.path().display(),
                    records = snapshot.len(),
                    "flushed audit snapshot"
                );
                Ok(())
            }
            Err(flush_error) => {
                error!(
                    path = %self.file.path().display(),
                    unflushed_records = snapshot.len(),
                    error = %flush_error,
                    "failed to flush audit snapshot"
                );
                Err(flush_error)
            }
        }
    }

    async fn filtered(
        &self,
        filter: impl Fn(&AuditReadRecord) -> bool,
    ) -> Vec<AuditReadRecord> {
        self.snapshot
            .read()
            .await
            .records
            .iter()
            .filter(|record| filter(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditWriter for SnapshotAuditRepository {
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId> {
        self.snapshot.write().await.append(record)
    }
}

#[async_trait]
impl AuditReader for SnapshotAuditRepository {
    async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        Ok(self
            .snapshot
            .read()
            .await
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_all_by_actor(&self, actor: &str) -> AppResult<Vec<AuditReadRecord>> {
        Ok(self.filtered(|record| record.created_by() == actor).await)
    }

    async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        let snapshot = self.snapshot.read().await;

        Ok(snapshot
            .records
            .iter()
            .filter(|record| query.matches(record))
            .skip(query.capped_offset())
            .take(query.capped_limit())
            .cloned()
            .collect())
    }
}
