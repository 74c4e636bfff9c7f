use log::Level;
use std::path::PathBuf;

/// What happened to the backing file during a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Removed,
    AlreadyMissing,
    Failed(String),
}

/// Everything the store reports about its own activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    DirectoryCreated { path: PathBuf },
    AssetAdded { filename: String },
    AssetDeleted {
        title: String,
        filename: String,
        cleanup: CleanupOutcome,
    },
    CatalogLoaded { path: PathBuf, count: usize },
    CatalogSaved { path: PathBuf, count: usize },
    AssetNotFound { title: String },
    IndexMissing { path: PathBuf },
    IndexCorrupt { path: PathBuf, reason: String },
    OrphanLeft { filename: String },
}

impl StoreEvent {
    pub fn level(&self) -> Level {
        match self {
            StoreEvent::DirectoryCreated { .. }
            | StoreEvent::AssetAdded { .. }
            | StoreEvent::CatalogLoaded { .. }
            | StoreEvent::CatalogSaved { .. } => Level::Info,
            StoreEvent::AssetDeleted { cleanup, .. } => match cleanup {
                CleanupOutcome::Failed(_) => Level::Warn,
                _ => Level::Info,
            },
            StoreEvent::AssetNotFound { .. }
            | StoreEvent::IndexMissing { .. }
            | StoreEvent::IndexCorrupt { .. }
            | StoreEvent::OrphanLeft { .. } => Level::Warn,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StoreEvent::DirectoryCreated { path } => {
                format!("Created gallery directory {:?}", path)
            }
            StoreEvent::AssetAdded { filename } => format!("Added image: {}", filename),
            StoreEvent::AssetDeleted {
                title,
                filename,
                cleanup,
            } => match cleanup {
                CleanupOutcome::Removed => format!("Deleted image: {} ({})", title, filename),
                CleanupOutcome::AlreadyMissing => format!(
                    "Deleted image: {} ({} was already gone from storage)",
                    title, filename
                ),
                CleanupOutcome::Failed(reason) => format!(
                    "Deleted image: {} but could not remove {}: {}",
                    title, filename, reason
                ),
            },
            StoreEvent::CatalogLoaded { path, count } => {
                format!("Loaded {} images from {:?}", count, path)
            }
            StoreEvent::CatalogSaved { path, count } => {
                format!("Saved {} images to {:?}", count, path)
            }
            StoreEvent::AssetNotFound { title } => format!("Image not found: {}", title),
            StoreEvent::IndexMissing { path } => {
                format!("No existing metadata file found at {:?}", path)
            }
            StoreEvent::IndexCorrupt { path, reason } => {
                format!("Ignoring unreadable metadata file {:?}: {}", path, reason)
            }
            StoreEvent::OrphanLeft { filename } => format!(
                "Copied {} into storage but rejected it; the file has no catalog entry",
                filename
            ),
        }
    }
}

/// Destination for store events. The host decides where they end up.
pub trait EventSink {
    fn record(&self, event: &StoreEvent);

    fn flush(&self) {}
}

/// Routes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: &StoreEvent) {
        log::log!(target: "gallery::store", event.level(), "{}", event.message());
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Keeps every event in memory, shared between clones.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: std::rc::Rc<std::cell::RefCell<Vec<StoreEvent>>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
impl EventSink for MemorySink {
    fn record(&self, event: &StoreEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_and_infos_are_split_by_kind() {
        let info = StoreEvent::AssetAdded {
            filename: "a.png".to_string(),
        };
        let warn = StoreEvent::AssetNotFound {
            title: "Nope".to_string(),
        };
        assert_eq!(info.level(), Level::Info);
        assert_eq!(warn.level(), Level::Warn);
    }

    #[test]
    fn failed_cleanup_is_logged_as_warning() {
        let event = StoreEvent::AssetDeleted {
            title: "Sunset".to_string(),
            filename: "photo1.png".to_string(),
            cleanup: CleanupOutcome::Failed("permission denied".to_string()),
        };
        assert_eq!(event.level(), Level::Warn);
        assert!(event.message().contains("permission denied"));
    }

    #[test]
    fn memory_sink_clones_share_events() {
        let sink = MemorySink::default();
        let handle = sink.clone();
        sink.record(&StoreEvent::AssetAdded {
            filename: "a.png".to_string(),
        });
        assert_eq!(handle.events().len(), 1);
    }
}
