// ABOUTME: Library module for the course-slides program.
// ABOUTME: Renders Markdown slide decks into a course website, as static files or live.

// Reexport modules
pub mod assemble;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod metadata;
pub mod pages;
pub mod router;
pub mod serve;
pub mod templates;
pub mod transform;
pub mod utils;

// Reexport common types and functions
pub use assemble::{BuildSummary, SiteAssembler};
pub use catalog::{Deck, DeckCatalog};
pub use config::Config;
pub use errors::{Result, SiteError};
pub use metadata::{CourseMetadata, DeckMetadata, MetadataStore};
pub use pages::{Chrome, ErrorPage, PageRenderer};
pub use router::{Reply, RequestRouter, Route};
pub use serve::serve_site;
pub use templates::Templates;
pub use transform::{rewrite_asset_refs, wrap_no_break};
