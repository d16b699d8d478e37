// File: src/config.rs
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Name of the config file picked up from the corpus root when no explicit
/// path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tagman.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub onboarding: OnboardingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Extensions (without the dot) that mark a file as a training image.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    #[serde(default = "default_caption_extension")]
    pub caption_extension: String,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            caption_extension: default_caption_extension(),
            follow_symlinks: false,
        }
    }
}

impl DatasetConfig {
    pub fn is_image(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.image_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// The sibling caption path for an image: same directory, same stem.
    pub fn caption_path(&self, image: &Path) -> std::path::PathBuf {
        image.with_extension(&self.caption_extension)
    }
}

fn default_image_extensions() -> Vec<String> {
    vec!["png".to_string()]
}
fn default_caption_extension() -> String {
    "txt".to_string()
}

/// How image files without a caption are resolved when nobody is asked.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPolicy {
    #[default]
    Ask,
    ConfirmAll,
    DeclineAll,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OnboardingConfig {
    #[serde(default)]
    pub policy: OnboardingPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
            clear_screen: default_clear_screen(),
        }
    }
}

fn default_suggestion_limit() -> usize {
    3
}
fn default_clear_screen() -> bool {
    true
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}
