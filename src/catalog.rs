// ABOUTME: Slide deck discovery below the slides root
// ABOUTME: Enumerates deck directories, attaches their metadata and filters hidden decks

use crate::config::{COURSE_METADATA_DIR, DECK_ASSETS_DIR, DECK_MARKDOWN_FILE};
use crate::errors::Result;
use crate::metadata::{DeckMetadata, MetadataStore};
use log::debug;
use std::fs;
use std::path::PathBuf;

/// One slide presentation backed by a directory under the slides root
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    /// Directory name, also the URL segment under `/slides/`
    pub id: String,
    pub metadata: DeckMetadata,
    pub markdown_path: PathBuf,
    pub asset_dir: PathBuf,
}

impl Deck {
    /// Site path of the deck page
    pub fn location(&self) -> String {
        format!("/slides/{}", self.id)
    }
}

/// Deck registry backed by the filesystem listing.
///
/// Every query enumerates the slides root again; there is no cache.
pub struct DeckCatalog<'a> {
    store: &'a MetadataStore,
}

impl<'a> DeckCatalog<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self { store }
    }

    /// All deck directories, hidden or not, sorted by directory name
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let root = self.store.slides_root();
        let mut ids = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == COURSE_METADATA_DIR {
                continue;
            }
            ids.push(name);
        }
        ids.sort();

        debug!("Found {} deck directories in {:?}", ids.len(), root);
        ids.into_iter().map(|id| self.load_deck(id)).collect()
    }

    /// Decks that appear on the home page
    pub fn list_visible_decks(&self) -> Result<Vec<Deck>> {
        Ok(self
            .list_decks()?
            .into_iter()
            .filter(|deck| !deck.metadata.hidden)
            .collect())
    }

    /// Look up a single deck; `None` when no such deck directory exists
    pub fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        if !is_deck_id(deck_id) {
            return Ok(None);
        }
        if !self.store.slides_root().join(deck_id).is_dir() {
            return Ok(None);
        }
        self.load_deck(deck_id.to_string()).map(Some)
    }

    fn load_deck(&self, id: String) -> Result<Deck> {
        let metadata = self.store.load_deck_metadata(&id)?;
        let dir = self.store.slides_root().join(&id);
        Ok(Deck {
            markdown_path: dir.join(DECK_MARKDOWN_FILE),
            asset_dir: dir.join(DECK_ASSETS_DIR),
            metadata,
            id,
        })
    }
}

/// A deck id is a single plain path segment naming something other than the course directory
fn is_deck_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate != "."
        && candidate != ".."
        && candidate != COURSE_METADATA_DIR
        && !candidate.contains(|c| c == '/' || c == '\\')
}
