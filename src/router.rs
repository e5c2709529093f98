// ABOUTME: Live request routing over the same catalog and renderer as the batch build
// ABOUTME: Maps request paths to pages and files, guarding every file path against traversal

use crate::catalog::DeckCatalog;
use crate::config::{Config, DECK_ASSETS_DIR};
use crate::errors::{Result, SiteError};
use crate::metadata::{CourseMetadata, MetadataStore, DEFAULT_FAVICON, DEFAULT_LOGO};
use crate::pages::{fallback_error_page, Chrome, ErrorPage, PageRenderer};
use crate::templates::Templates;
use crate::utils;
use log::{debug, error, warn};
use std::fs;
use std::path::Path;

const HTML: &str = "text/html; charset=utf-8";

/// A finished response, independent of the HTTP library serving it
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: HTML.to_string(),
            body: body.into_bytes(),
        }
    }

    fn file(path: &Path) -> Result<Self> {
        Ok(Self {
            status: 200,
            content_type: utils::content_type_for(path).to_string(),
            body: fs::read(path)?,
        })
    }

    /// Body as text, for HTML responses
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Routes understood by the live server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Home,
    Deck(&'a str),
    DeckAsset { deck: &'a str, asset: &'a str },
    Favicon,
    CourseLogo,
    Public(&'a str),
    Vendor { package: &'a str, path: &'a str },
}

impl<'a> Route<'a> {
    /// Match a decoded request path (no query string) against the route table
    pub fn parse<S: AsRef<str>>(path: &'a str, vendor_packages: &[S]) -> Option<Self> {
        match path {
            "" | "/" => return Some(Route::Home),
            "/favicon.ico" => return Some(Route::Favicon),
            "/course-logo" => return Some(Route::CourseLogo),
            _ => {}
        }

        if let Some(rest) = path.strip_prefix("/slides/") {
            let rest = rest.trim_end_matches('/');
            return match rest.split_once('/') {
                None if !rest.is_empty() => Some(Route::Deck(rest)),
                Some((deck, tail)) if !deck.is_empty() => {
                    let asset = tail.strip_prefix(DECK_ASSETS_DIR)?.strip_prefix('/')?;
                    if asset.is_empty() {
                        None
                    } else {
                        Some(Route::DeckAsset { deck, asset })
                    }
                }
                _ => None,
            };
        }

        if let Some(rest) = path.strip_prefix("/public/") {
            return Some(Route::Public(rest));
        }

        let rest = path.strip_prefix('/')?;
        let (package, tail) = rest.split_once('/')?;
        vendor_packages
            .iter()
            .any(|p| p.as_ref() == package)
            .then_some(Route::Vendor { package, path: tail })
    }
}

/// Answers live requests by re-reading metadata, decks and templates every time
pub struct RequestRouter {
    config: Config,
}

impl RequestRouter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Produce the response for one request. Never fails: errors become error pages.
    pub fn handle(&self, method: &str, raw_url: &str) -> Reply {
        debug!("{} {}", method, raw_url);

        let outcome = if method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD") {
            decode_path(raw_url).and_then(|path| {
                match Route::parse(&path, &self.config.vendor_packages) {
                    Some(route) => self.dispatch(&route),
                    None => Err(SiteError::NotFound(path.clone())),
                }
            })
        } else {
            Err(SiteError::NotFound(format!("{} {}", method, raw_url)))
        };

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                match e.status() {
                    404 => debug!("Not found: {}", raw_url),
                    403 => warn!("Forbidden request {}: {}", raw_url, e),
                    _ => error!("Request {} failed: {}", raw_url, e),
                }
                self.error_reply(&ErrorPage::for_error(&e, raw_url))
            }
        }
    }

    fn dispatch(&self, route: &Route<'_>) -> Result<Reply> {
        let store = MetadataStore::new(&self.config.slides_dir);
        match route {
            Route::Home => {
                let course = store.load_course_metadata()?;
                let decks = DeckCatalog::new(&store).list_visible_decks()?;
                let html = self.renderer()?.render_home_page(&course, &decks, &Chrome::live())?;
                Ok(Reply::html(200, html))
            }
            Route::Deck(id) => {
                let deck = DeckCatalog::new(&store)
                    .get_deck(id)?
                    .ok_or_else(|| SiteError::NotFound(format!("Unknown deck: {}", id)))?;
                let course = store.load_course_metadata()?;
                let html = self.renderer()?.render_deck_page(
                    &deck,
                    &course.no_break_words,
                    &Chrome::live().favicon,
                )?;
                Ok(Reply::html(200, html))
            }
            Route::DeckAsset { deck, asset } => {
                let relative = format!("{}/{}/{}", deck, DECK_ASSETS_DIR, asset);
                let path = utils::resolve_within(&self.config.slides_dir, &relative)?;
                Reply::file(&path)
            }
            Route::Favicon => self.brand_file(|c| c.fav_icon.clone(), DEFAULT_FAVICON),
            Route::CourseLogo => self.brand_file(|c| c.bg_logo.clone(), DEFAULT_LOGO),
            Route::Public(rest) => {
                let path = utils::resolve_within(&self.config.public_dir, rest)?;
                Reply::file(&path)
            }
            Route::Vendor { package, path } => {
                let root = self.config.vendor_dir.join(package);
                let path = utils::resolve_within(&root, path)?;
                Reply::file(&path)
            }
        }
    }

    /// Serve a branding file; unreadable course metadata means the default is used
    fn brand_file<F>(&self, configured: F, default: &str) -> Result<Reply>
    where
        F: FnOnce(&CourseMetadata) -> Option<String>,
    {
        let store = MetadataStore::new(&self.config.slides_dir);
        let configured = match store.load_course_metadata() {
            Ok(course) => configured(&course),
            Err(e) => {
                warn!("Using default {}: {}", default, e);
                None
            }
        };

        let brand = self.config.resolve_brand_file(configured.as_deref(), default);
        match brand.source {
            Some(path) => Reply::file(&path),
            None => Err(SiteError::NotFound(brand.file_name)),
        }
    }

    fn renderer(&self) -> Result<PageRenderer> {
        Ok(PageRenderer::new(Templates::load(
            self.config.templates_dir.as_deref(),
        )?))
    }

    /// Error page with live chrome, which never depends on course metadata
    fn error_reply(&self, page: &ErrorPage) -> Reply {
        let chrome = Chrome::live();
        let html = match self.renderer() {
            Ok(renderer) => renderer.render_error_page_or_fallback(page, &chrome),
            Err(e) => {
                error!("Templates failed to load, using built-in error page: {}", e);
                fallback_error_page(page, &chrome)
            }
        };
        Reply::html(page.status, html)
    }
}

/// Strip the query string and percent-decode the path
fn decode_path(raw_url: &str) -> Result<String> {
    let path = raw_url.split(|c| c == '?' || c == '#').next().unwrap_or_default();
    urlencoding::decode(path)
        .map(|p| p.into_owned())
        .map_err(|_| SiteError::NotFound(format!("Undecodable path: {}", raw_url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENDOR: [&str; 1] = ["reveal.js"];

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/", &VENDOR), Some(Route::Home));
        assert_eq!(Route::parse("/favicon.ico", &VENDOR), Some(Route::Favicon));
        assert_eq!(Route::parse("/course-logo", &VENDOR), Some(Route::CourseLogo));
        assert_eq!(Route::parse("/slides/s1", &VENDOR), Some(Route::Deck("s1")));
        assert_eq!(Route::parse("/slides/s1/", &VENDOR), Some(Route::Deck("s1")));
        assert_eq!(
            Route::parse("/slides/s1/assets/img/a.png", &VENDOR),
            Some(Route::DeckAsset {
                deck: "s1",
                asset: "img/a.png"
            })
        );
        assert_eq!(Route::parse("/public/style.css", &VENDOR), Some(Route::Public("style.css")));
        assert_eq!(
            Route::parse("/reveal.js/dist/reveal.js", &VENDOR),
            Some(Route::Vendor {
                package: "reveal.js",
                path: "dist/reveal.js"
            })
        );
    }

    #[test]
    fn test_parse_unmatched_routes() {
        assert_eq!(Route::parse("/slides/", &VENDOR), None);
        assert_eq!(Route::parse("/slides/s1/other/a.png", &VENDOR), None);
        assert_eq!(Route::parse("/slides/s1/assets/", &VENDOR), None);
        assert_eq!(Route::parse("/unknown/file.js", &VENDOR), None);
        assert_eq!(Route::parse("/about", &VENDOR), None);
    }

    #[test]
    fn test_traversal_keeps_asset_route() {
        assert_eq!(
            Route::parse("/slides/deckA/assets/../../../etc/passwd", &VENDOR),
            Some(Route::DeckAsset {
                deck: "deckA",
                asset: "../../../etc/passwd"
            })
        );
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/slides/my%20deck?x=1").unwrap(), "/slides/my deck");
        assert_eq!(
            decode_path("/slides/a/assets/..%2F..%2Fsecret").unwrap(),
            "/slides/a/assets/../../secret"
        );
    }
}
