// File: src/core/scan.rs
use crate::config::DatasetConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of walking a corpus directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Images whose sibling caption file exists.
    pub paired: Vec<PathBuf>,
    /// Images with no caption file yet, in walk order.
    pub missing: Vec<PathBuf>,
}

/// Recursively collects image files under `root` and pairs each with its
/// caption file. Entries are visited in file-name order so repeated scans
/// of the same tree agree.
pub fn scan_corpus(root: &Path, config: &DatasetConfig) -> Result<ScanResult> {
    let mut result = ScanResult::default();
    let walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !config.is_image(entry.path()) {
            continue;
        }
        let image = entry.into_path();
        if config.caption_path(&image).is_file() {
            result.paired.push(image);
        } else {
            result.missing.push(image);
        }
    }
    Ok(result)
}
