// ABOUTME: Metadata loading for the course and for individual slide decks
// ABOUTME: Reads metadata.json files fresh on every call so live edits are visible

use crate::config::{COURSE_METADATA_DIR, METADATA_FILE};
use crate::errors::{Result, SiteError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_FAVICON: &str = "ap_favicon.ico";
pub const DEFAULT_LOGO: &str = "ap_logo.png";

/// Course-wide metadata from `course_metadata/metadata.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Words and phrases that must not be broken across lines, applied in order
    #[serde(default)]
    pub no_break_words: Vec<String>,
    #[serde(default)]
    pub fav_icon: Option<String>,
    #[serde(default)]
    pub bg_logo: Option<String>,
}

impl CourseMetadata {
    pub fn fav_icon(&self) -> &str {
        self.fav_icon.as_deref().unwrap_or(DEFAULT_FAVICON)
    }

    pub fn bg_logo(&self) -> &str {
        self.bg_logo.as_deref().unwrap_or(DEFAULT_LOGO)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Per-deck metadata from `<deck>/metadata.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Hidden decks are left off the home page but still built and served
    #[serde(default)]
    pub hidden: bool,
}

impl DeckMetadata {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// Reads course and deck metadata below a slides root.
///
/// Nothing is cached: every call goes back to storage, and callers decide how
/// often to refresh (once per build, once per request).
#[derive(Debug, Clone)]
pub struct MetadataStore {
    slides_root: PathBuf,
}

impl MetadataStore {
    pub fn new(slides_root: impl Into<PathBuf>) -> Self {
        Self {
            slides_root: slides_root.into(),
        }
    }

    pub fn slides_root(&self) -> &Path {
        &self.slides_root
    }

    pub fn course_metadata_path(&self) -> PathBuf {
        self.slides_root.join(COURSE_METADATA_DIR).join(METADATA_FILE)
    }

    pub fn deck_metadata_path(&self, deck_id: &str) -> PathBuf {
        self.slides_root.join(deck_id).join(METADATA_FILE)
    }

    pub fn load_course_metadata(&self) -> Result<CourseMetadata> {
        read_json(&self.course_metadata_path())
    }

    pub fn load_deck_metadata(&self, deck_id: &str) -> Result<DeckMetadata> {
        read_json(&self.deck_metadata_path(deck_id))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading metadata: {:?}", path);
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            SiteError::ConfigError(format!("Metadata file not found: {:?}", path))
        }
        _ => SiteError::ConfigError(format!("Failed to read metadata {:?}: {}", path, e)),
    })?;

    serde_json::from_str(&content)
        .map_err(|e| SiteError::ConfigError(format!("Invalid metadata JSON in {:?}: {}", path, e)))
}
