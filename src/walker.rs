use crate::error::AppError;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Disagreements between the storage directory and the catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StorageReport {
    /// Files on disk that no catalog entry refers to.
    pub orphans: Vec<String>,
    /// Catalog filenames with nothing on disk.
    pub missing: Vec<String>,
}

impl StorageReport {
    pub fn is_consistent(&self) -> bool {
        self.orphans.is_empty() && self.missing.is_empty()
    }
}

pub fn scan_storage(storage_dir: &Path, catalog_filenames: &[&str]) -> Result<StorageReport, AppError> {
    log::debug!("Auditing storage directory {:?}", storage_dir);

    let expected: HashSet<&str> = catalog_filenames.iter().copied().collect();
    let mut present = HashSet::new();
    let mut report = StorageReport::default();

    for entry in WalkDir::new(storage_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !expected.contains(name.as_str()) {
            log::debug!("Orphan file in storage: {}", name);
            report.orphans.push(name.clone());
        }
        present.insert(name);
    }

    for filename in catalog_filenames {
        if !present.contains(*filename) && !report.missing.iter().any(|m| m == *filename) {
            log::debug!("Catalog entry without a file: {}", filename);
            report.missing.push(filename.to_string());
        }
    }

    log::info!(
        "Storage audit found {} orphan(s) and {} missing file(s)",
        report.orphans.len(),
        report.missing.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn matching_directory_is_consistent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.png"), b"a").unwrap();

        let report = scan_storage(dir.path(), &["a.png"]).unwrap();

        assert!(report.is_consistent());
    }

    #[test]
    fn ignores_subdirectories_and_reports_each_missing_name_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.png"), b"d").unwrap();
        fs::write(dir.path().join("z.gif"), b"z").unwrap();
        fs::write(dir.path().join("b.jpg"), b"b").unwrap();

        let report = scan_storage(dir.path(), &["gone.png", "gone.png"]).unwrap();

        assert_eq!(report.orphans, vec!["b.jpg".to_string(), "z.gif".to_string()]);
        assert_eq!(report.missing, vec!["gone.png".to_string()]);
    }
}
