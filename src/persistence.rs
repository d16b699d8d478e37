// File: src/persistence.rs
use crate::core::caption::Caption;
use crate::error::{DatasetError, Result};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads and parses a caption file.
pub fn load_caption(path: &Path) -> Result<Caption> {
    let text = fs::read_to_string(path)?;
    Ok(Caption::parse(&text))
}

/// Overwrites `path` with the canonical caption text.
///
/// The caption is written to a temporary file next to the target and then
/// renamed over it, so a failed write never leaves a truncated caption behind.
pub fn save_caption(path: &Path, caption: &Caption) -> Result<()> {
    if !path.is_file() {
        return Err(DatasetError::CaptionMissing(path.to_path_buf()));
    }
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write!(writer, "{caption}")?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

/// Materializes an empty caption file for a newly onboarded image.
/// A file that already exists is left untouched; anything else occupying the
/// path is reported as [`DatasetError::CaptionMissing`].
pub fn create_empty_caption(path: &Path) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            if path.is_file() {
                Ok(())
            } else {
                Err(DatasetError::CaptionMissing(path.to_path_buf()))
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "old, stuff").unwrap();

        save_caption(&path, &Caption::parse("trigger, new")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "trigger, new, ");
        assert_eq!(load_caption(&path).unwrap().tags(), ["trigger", "new"]);
    }

    #[test]
    fn save_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");
        let err = save_caption(&path, &Caption::new()).unwrap_err();
        assert!(matches!(err, DatasetError::CaptionMissing(p) if p == path));

        let err = save_caption(dir.path(), &Caption::new()).unwrap_err();
        assert!(matches!(err, DatasetError::CaptionMissing(_)));
    }

    #[test]
    fn create_empty_keeps_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.txt");
        create_empty_caption(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");

        fs::write(&path, "kept").unwrap();
        create_empty_caption(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn create_empty_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.txt");
        fs::create_dir(&path).unwrap();
        let err = create_empty_caption(&path).unwrap_err();
        assert!(matches!(err, DatasetError::CaptionMissing(p) if p == path));
    }
}
