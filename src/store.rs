use crate::error::AppError;
use crate::events::{CleanupOutcome, EventSink, StoreEvent};
use crate::metadata::{AssetRecord, IndexEntry};
use crate::walker::{self, StorageReport};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

/// How a delete treats trouble removing the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Log the failure and carry on; the catalog decides what exists.
    BestEffort,
    /// A missing file is still fine, any other error aborts the delete
    /// before the catalog is touched.
    Strict,
}

pub const DELETE_CLEANUP_POLICY: CleanupPolicy = CleanupPolicy::BestEffort;

/// Owns the catalog, the storage directory and the index file.
pub struct AssetStore {
    catalog: Vec<AssetRecord>,
    storage_dir: PathBuf,
    index_path: PathBuf,
    sink: Box<dyn EventSink>,
    cleanup_policy: CleanupPolicy,
}

impl AssetStore {
    pub fn with_sink(
        storage_dir: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            catalog: Vec::new(),
            storage_dir: storage_dir.into(),
            index_path: index_path.into(),
            sink,
            cleanup_policy: DELETE_CLEANUP_POLICY,
        }
    }

    /// Builds a store and runs [`AssetStore::initialize`] on it.
    pub fn open(
        storage_dir: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, AppError> {
        let mut store = Self::with_sink(storage_dir, index_path, sink);
        store.initialize()?;
        Ok(store)
    }

    pub fn set_cleanup_policy(&mut self, policy: CleanupPolicy) {
        self.cleanup_policy = policy;
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.catalog
    }

    pub fn initialize(&mut self) -> Result<(), AppError> {
        if !self.storage_dir.is_dir() {
            fs::create_dir_all(&self.storage_dir)?;
            self.emit(StoreEvent::DirectoryCreated {
                path: self.storage_dir.clone(),
            });
        } else {
            log::debug!("Gallery directory {:?} already present", self.storage_dir);
        }
        self.reload()
    }

    pub fn add_asset(
        &mut self,
        source_path: impl AsRef<Path>,
        title: &str,
        description: &str,
    ) -> Result<(), AppError> {
        let source_path = source_path.as_ref();
        if !source_path.exists() {
            return Err(AppError::SourceNotFound(source_path.to_path_buf()));
        }
        let filename = source_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| AppError::InvalidFormat(source_path.to_string_lossy().to_string()))?;

        let dest_path = self.storage_dir.join(&filename);
        if is_same_file(source_path, &dest_path)? {
            log::debug!("{:?} is already in storage, nothing to copy", source_path);
        } else {
            log::debug!("Copying {:?} to {:?}", source_path, dest_path);
            copy_preserving_times(source_path, &dest_path)?;
        }

        let record = match AssetRecord::new(filename.as_str(), title, description) {
            Ok(record) => record,
            Err(e) => {
                self.emit(StoreEvent::OrphanLeft { filename });
                return Err(e);
            }
        };

        self.catalog.push(record);
        self.emit(StoreEvent::AssetAdded { filename });
        self.persist()
    }

    /// Removes the first entry titled `title`. Returns `false` when no entry
    /// matches, leaving catalog and index alone.
    pub fn delete_asset(&mut self, title: &str) -> Result<bool, AppError> {
        let Some(position) = self.catalog.iter().position(|r| r.title() == title) else {
            self.emit(StoreEvent::AssetNotFound {
                title: title.to_string(),
            });
            return Ok(false);
        };

        let file_path = self.storage_dir.join(self.catalog[position].filename());
        let cleanup = match fs::remove_file(&file_path) {
            Ok(()) => CleanupOutcome::Removed,
            Err(e) if e.kind() == io::ErrorKind::NotFound => CleanupOutcome::AlreadyMissing,
            Err(e) => match self.cleanup_policy {
                CleanupPolicy::Strict => return Err(AppError::Io(e)),
                CleanupPolicy::BestEffort => CleanupOutcome::Failed(e.to_string()),
            },
        };

        let record = self.catalog.remove(position);
        self.emit(StoreEvent::AssetDeleted {
            title: record.title().to_string(),
            filename: record.filename().to_string(),
            cleanup,
        });
        self.persist()?;
        Ok(true)
    }

    pub fn list_assets(&self) -> Vec<IndexEntry> {
        self.catalog.iter().map(AssetRecord::to_entry).collect()
    }

    /// Rewrites the index file from the current catalog.
    pub fn persist(&self) -> Result<(), AppError> {
        let entries = self.list_assets();
        let json = serde_json::to_string_pretty(&entries)?;
        write_atomically(&self.index_path, json.as_bytes())
            .map_err(|e| AppError::persistence(&self.index_path, e))?;
        self.emit(StoreEvent::CatalogSaved {
            path: self.index_path.clone(),
            count: entries.len(),
        });
        Ok(())
    }

    /// Replaces the catalog with the index file's content. A missing,
    /// unreadable or unparseable file yields an empty catalog; an entry
    /// with a bad filename fails the whole reload and keeps the current
    /// catalog.
    pub fn reload(&mut self) -> Result<(), AppError> {
        let content = match fs::read(&self.index_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.catalog.clear();
                self.emit(StoreEvent::IndexMissing {
                    path: self.index_path.clone(),
                });
                return Ok(());
            }
            Err(e) => {
                self.catalog.clear();
                self.emit(StoreEvent::IndexCorrupt {
                    path: self.index_path.clone(),
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let entries: Vec<IndexEntry> = match serde_json::from_slice(&content) {
            Ok(entries) => entries,
            Err(e) => {
                self.catalog.clear();
                self.emit(StoreEvent::IndexCorrupt {
                    path: self.index_path.clone(),
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let records = entries
            .into_iter()
            .map(AssetRecord::from_entry)
            .collect::<Result<Vec<_>, _>>()?;

        self.catalog = records;
        self.emit(StoreEvent::CatalogLoaded {
            path: self.index_path.clone(),
            count: self.catalog.len(),
        });
        Ok(())
    }

    /// Size in bytes of the file backing `record`, if it is still there.
    pub fn file_size(&self, record: &AssetRecord) -> Option<u64> {
        fs::metadata(self.storage_dir.join(record.filename()))
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }

    pub fn audit(&self) -> Result<StorageReport, AppError> {
        let filenames: Vec<&str> = self.catalog.iter().map(AssetRecord::filename).collect();
        walker::scan_storage(&self.storage_dir, &filenames)
    }

    /// Ends the store's lifecycle and flushes pending events.
    pub fn close(self) {
        log::debug!("Closing gallery store at {:?}", self.storage_dir);
        self.sink.flush();
    }

    fn emit(&self, event: StoreEvent) {
        self.sink.record(&event);
    }
}

/// `fs::copy` truncates the destination first, so copying a file onto
/// itself would empty it.
fn is_same_file(source: &Path, dest: &Path) -> io::Result<bool> {
    if !dest.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(source)? == fs::canonicalize(dest)?)
}

/// Copies content and permissions, then carries over access and
/// modification times.
fn copy_preserving_times(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;
    let meta = fs::metadata(source)?;
    let accessed = filetime::FileTime::from_last_access_time(&meta);
    let modified = filetime::FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dest, accessed, modified)
}

/// Temp file + fsync + rename, so readers never see a half-written index.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "index path has no file name"))?;
    let temp_path = path.with_file_name(format!(
        "{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
