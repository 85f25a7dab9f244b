//! Storage collaborator used by the split pipeline.
//!
//! Items are addressed by vault-relative paths using `/` separators.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Result of a create-if-absent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
    Failed(String),
}

#[async_trait]
pub trait NoteStorage: Send + Sync {
    /// Creates a new item, never overwriting an existing one.
    async fn create_if_absent(&self, path: &str, content: &str) -> CreateOutcome;

    /// Creates a folder and its parents; an existing folder is success.
    async fn ensure_location_exists(&self, path: &str) -> Result<(), StorageError>;

    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    async fn read_current_content(&self, id: &str) -> Result<String, StorageError>;
}

/// Normalizes a vault path: `\` becomes `/`, empty and `.` segments are
/// dropped, so leading, trailing and doubled slashes disappear.
pub fn normalize_path(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a folder and a file name; an empty folder is the vault root.
pub fn join_path(location: &str, file_name: &str) -> String {
    normalize_path(&format!("{}/{}", location, file_name))
}

/// Notes stored as files below a vault directory.
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = PathBuf::from(normalize_path(path));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn io_error(path: &str, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::Io(format!("{}: {}", path, err))
    }
}

/// Writes `content` to a freshly created file; on failure the partial file
/// is removed so no truncated note is left behind.
async fn write_or_discard<W>(writer: &mut W, full_path: &Path, content: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = match writer.write_all(content.as_bytes()).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
    };

    if written.is_err() {
        if let Err(e) = fs::remove_file(full_path).await {
            warn!("Cannot remove partial note {}: {}", full_path.display(), e);
        }
    }
    written
}

#[async_trait]
impl NoteStorage for FileSystemStorage {
    async fn create_if_absent(&self, path: &str, content: &str) -> CreateOutcome {
        let full_path = match self.resolve(path) {
            Ok(full_path) => full_path,
            Err(e) => return CreateOutcome::Failed(e.to_string()),
        };

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return CreateOutcome::AlreadyExists,
            Err(e) => return CreateOutcome::Failed(format!("{}: {}", path, e)),
        };

        if let Err(e) = write_or_discard(&mut file, &full_path, content).await {
            return CreateOutcome::Failed(format!("{}: {}", path, e));
        }

        debug!("Created note: {}", full_path.display());
        CreateOutcome::Created
    }

    async fn ensure_location_exists(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", path, e)))
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(id)?;
        fs::remove_file(&full_path)
            .await
            .map_err(|e| io_error(id, e))?;

        debug!("Deleted note: {}", full_path.display());
        Ok(())
    }

    async fn read_current_content(&self, id: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(id)?;
        fs::read_to_string(&full_path)
            .await
            .map_err(|e| io_error(id, e))
    }
}

#[derive(Default)]
struct MemoryState {
    items: BTreeMap<String, String>,
    locations: BTreeSet<String>,
    failing: HashMap<String, String>,
    failing_prefixes: Vec<(String, String)>,
    occupied_prefixes: Vec<String>,
    failing_locations: HashMap<String, String>,
    reads: usize,
    deletes: Vec<String>,
}

/// In-memory storage with injectable failures; backs the pipeline tests.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: &str, content: &str) {
        self.lock()
            .items
            .insert(normalize_path(path), content.to_string());
    }

    /// Makes every create at `path` fail with `reason`.
    pub fn fail_writes_to(&self, path: &str, reason: &str) {
        self.lock()
            .failing
            .insert(normalize_path(path), reason.to_string());
    }

    /// Makes every create whose path starts with `prefix` fail with `reason`.
    pub fn fail_writes_under(&self, prefix: &str, reason: &str) {
        self.lock()
            .failing_prefixes
            .push((normalize_path(prefix), reason.to_string()));
    }

    /// Makes every create whose path starts with `prefix` report that the
    /// item already exists.
    pub fn occupy_paths_under(&self, prefix: &str) {
        self.lock().occupied_prefixes.push(normalize_path(prefix));
    }

    /// Makes creating the folder at `path` fail with `reason`.
    pub fn fail_location(&self, path: &str, reason: &str) {
        self.lock()
            .failing_locations
            .insert(normalize_path(path), reason.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.lock().items.get(&normalize_path(path)).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().items.keys().cloned().collect()
    }

    pub fn locations(&self) -> Vec<String> {
        self.lock().locations.iter().cloned().collect()
    }

    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    pub fn deleted(&self) -> Vec<String> {
        self.lock().deletes.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-call.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NoteStorage for MemoryStorage {
    async fn create_if_absent(&self, path: &str, content: &str) -> CreateOutcome {
        let path = normalize_path(path);
        let mut state = self.lock();

        if let Some(reason) = state.failing.get(&path) {
            return CreateOutcome::Failed(reason.clone());
        }
        if let Some((_, reason)) = state
            .failing_prefixes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix.as_str()))
        {
            return CreateOutcome::Failed(reason.clone());
        }
        if state.items.contains_key(&path)
            || state
                .occupied_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return CreateOutcome::AlreadyExists;
        }
        state.items.insert(path, content.to_string());
        CreateOutcome::Created
    }

    async fn ensure_location_exists(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize_path(path);
        let mut state = self.lock();

        if let Some(reason) = state.failing_locations.get(&path) {
            return Err(StorageError::Io(reason.clone()));
        }
        state.locations.insert(path);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let id = normalize_path(id);
        let mut state = self.lock();

        state.deletes.push(id.clone());
        match state.items.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(id)),
        }
    }

    async fn read_current_content(&self, id: &str) -> Result<String, StorageError> {
        let id = normalize_path(id);
        let mut state = self.lock();

        state.reads += 1;
        state
            .items
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }
}
