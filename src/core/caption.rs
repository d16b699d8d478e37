// File: src/core/caption.rs
use std::fmt;

pub const TAG_DELIMITER: char = ',';
const TAG_SEPARATOR: &str = ", ";

/// True for tokens that may be stored as a tag: non-empty and not whitespace-only.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.trim().is_empty()
}

/// An ordered list of tags. Position 0 holds the corpus trigger word once
/// the dataset has been normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
    tags: Vec<String>,
}

impl Caption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses delimited caption text. Tokens are trimmed and empty ones dropped.
    pub fn parse(text: &str) -> Self {
        let tags = text
            .trim()
            .split(TAG_DELIMITER)
            .map(str::trim)
            .filter(|tag| is_valid_tag(tag))
            .map(str::to_string)
            .collect();
        Self { tags }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn first(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Exact token match; "blue" never matches "blue hair".
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Appends `tag` unless it is already present. Returns whether it was added.
    pub fn push(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Removes every occurrence of `tag`. Returns whether anything was removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Moves `trigger` to the front, dropping any other occurrence of it.
    /// Returns whether the caption changed.
    pub fn lead_with(&mut self, trigger: &str) -> bool {
        if self.first() == Some(trigger) && self.tags.iter().skip(1).all(|t| t != trigger) {
            return false;
        }
        self.tags.retain(|t| t != trigger);
        self.tags.insert(0, trigger.to_string());
        true
    }

    /// Distinct tags in first-seen order.
    pub fn unique_tags(&self) -> Vec<&str> {
        let mut seen = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !seen.contains(&tag.as_str()) {
                seen.push(tag.as_str());
            }
        }
        seen
    }
}

/// Canonical on-disk form: `a, b, c, ` (empty caption serializes to "").
impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.tags {
            write!(f, "{tag}{TAG_SEPARATOR}")?;
        }
        Ok(())
    }
}
