// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Could not replace caption file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("No images were found in the dataset cache")]
    EmptyDataset,

    #[error("Caption file is missing or not a regular file: {}", .0.display())]
    CaptionMissing(PathBuf),

    #[error("A target image is required unless the mutation applies to all records")]
    MissingTarget,

    #[error("Image is not part of the dataset: {}", .0.display())]
    UnknownRecord(PathBuf),

    #[error("Unknown tag mode '{0}' (expected apply, apply_all, delete or delete_all)")]
    UnknownMode(String),
}
