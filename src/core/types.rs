// src/core/types.rs
use crate::core::caption::Caption;
use crate::error::{DatasetError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// One image/caption training pair held by the dataset.
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    pub image: PathBuf,
    pub caption_path: PathBuf,
    /// `None` until the caption has been read; stays `None` if reading failed.
    pub(crate) caption: Option<Caption>,
}

impl DatasetRecord {
    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.caption.is_some()
    }
}

/// Which records a tag mutation applies to.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Record(&'a Path),
    All,
}

impl<'a> Target<'a> {
    /// Builds a target from an optional record and an "all" flag.
    /// The flag wins; neither is an error.
    pub fn resolve(record: Option<&'a Path>, all: bool) -> Result<Self> {
        match (record, all) {
            (_, true) => Ok(Target::All),
            (Some(image), false) => Ok(Target::Record(image)),
            (None, false) => Err(DatasetError::MissingTarget),
        }
    }
}

/// How a tag entered by the curator is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Apply,
    ApplyAll,
    Delete,
    DeleteAll,
}

impl TagAction {
    pub fn is_all(self) -> bool {
        matches!(self, TagAction::ApplyAll | TagAction::DeleteAll)
    }

    /// The same scope with the opposite direction.
    pub fn negated(self) -> Self {
        match self {
            TagAction::Apply => TagAction::Delete,
            TagAction::ApplyAll => TagAction::DeleteAll,
            TagAction::Delete => TagAction::Apply,
            TagAction::DeleteAll => TagAction::ApplyAll,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TagAction::Apply => "apply",
            TagAction::ApplyAll => "apply_all",
            TagAction::Delete => "delete",
            TagAction::DeleteAll => "delete_all",
        }
    }
}

impl FromStr for TagAction {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "apply" => Ok(TagAction::Apply),
            "apply_all" => Ok(TagAction::ApplyAll),
            "delete" => Ok(TagAction::Delete),
            "delete_all" => Ok(TagAction::DeleteAll),
            _ => Err(DatasetError::UnknownMode(s.to_string())),
        }
    }
}

/// A tag and the number of captions that carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes_case_insensitively() {
        assert_eq!("Apply_All".parse::<TagAction>().unwrap(), TagAction::ApplyAll);
        assert_eq!("delete".parse::<TagAction>().unwrap(), TagAction::Delete);
        assert_eq!("DELETE-ALL".parse::<TagAction>().unwrap(), TagAction::DeleteAll);
        assert!(matches!(
            "toggle".parse::<TagAction>(),
            Err(DatasetError::UnknownMode(m)) if m == "toggle"
        ));
    }

    #[test]
    fn target_requires_record_or_all() {
        assert!(matches!(Target::resolve(None, false), Err(DatasetError::MissingTarget)));
        assert!(matches!(Target::resolve(None, true), Ok(Target::All)));
        assert!(matches!(
            Target::resolve(Some(Path::new("a.png")), false),
            Ok(Target::Record(_))
        ));
    }

    #[test]
    fn negation_keeps_scope() {
        assert_eq!(TagAction::ApplyAll.negated(), TagAction::DeleteAll);
        assert_eq!(TagAction::Delete.negated(), TagAction::Apply);
        assert!(!TagAction::Apply.negated().is_all());
    }
}
