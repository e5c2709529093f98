// ABOUTME: Page rendering for the home page, deck pages and error pages
// ABOUTME: Prepares page data (no-break wrapping, asset rewriting) and hands it to the templates

use crate::catalog::Deck;
use crate::errors::{Result, SiteError};
use crate::metadata::CourseMetadata;
use crate::templates::{Templates, ERROR_TEMPLATE, INDEX_TEMPLATE, SLIDE_DECK_TEMPLATE};
use crate::transform::{rewrite_asset_refs, wrap_no_break};
use log::{error, info};
use serde::Serialize;
use std::fs;

/// Favicon and logo URLs shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct Chrome {
    pub favicon: String,
    pub course_logo: String,
}

impl Chrome {
    /// Chrome for pages written by the batch build, served from `/public`
    pub fn published(fav_icon: &str, bg_logo: &str) -> Self {
        Self {
            favicon: format!("/public/{}", fav_icon),
            course_logo: format!("/public/{}", bg_logo),
        }
    }

    /// Chrome for pages served live; the routes resolve the files themselves
    pub fn live() -> Self {
        Self {
            favicon: "/favicon.ico".to_string(),
            course_logo: "/course-logo".to_string(),
        }
    }
}

/// Content of an error page
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: u16,
    pub short_message: String,
    pub full_message: String,
    /// Original request URL; `None` for pages built ahead of time
    pub url: Option<String>,
}

impl ErrorPage {
    pub fn not_found(url: Option<String>) -> Self {
        Self {
            status: 404,
            short_message: "Page Not Found".to_string(),
            full_message: "Oops! The page you're looking for does not exist.".to_string(),
            url,
        }
    }

    pub fn server_error(url: Option<String>) -> Self {
        Self {
            status: 500,
            short_message: "Internal Server Error".to_string(),
            full_message: "Something went wrong on our side.".to_string(),
            url,
        }
    }

    /// Error page describing a failed live request
    pub fn for_error(err: &SiteError, url: &str) -> Self {
        let url = Some(url.to_string());
        match err.status() {
            403 => Self {
                status: 403,
                short_message: "Forbidden".to_string(),
                full_message: "You don't have access to this resource.".to_string(),
                url,
            },
            404 => Self::not_found(url),
            status => Self {
                status,
                short_message: "Internal Server Error".to_string(),
                full_message: err.to_string(),
                url,
            },
        }
    }
}

#[derive(Serialize)]
struct DeckPageData<'a> {
    title: String,
    title_raw: &'a str,
    content: String,
    favicon: &'a str,
}

#[derive(Serialize)]
struct CourseData<'a> {
    title_raw: &'a str,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct DeckLink {
    location: String,
    title: String,
    description: String,
}

#[derive(Serialize)]
struct HomePageData<'a> {
    course: CourseData<'a>,
    slide_decks: Vec<DeckLink>,
    #[serde(flatten)]
    chrome: &'a Chrome,
}

#[derive(Serialize)]
struct ErrorPageData<'a> {
    status: u16,
    short_message: &'a str,
    full_message: &'a str,
    url: Option<&'a str>,
    #[serde(flatten)]
    chrome: &'a Chrome,
}

/// Produces the HTML of every page type
pub struct PageRenderer {
    templates: Templates,
}

impl PageRenderer {
    pub fn new(templates: Templates) -> Self {
        Self { templates }
    }

    /// Render a deck's page from its Markdown source.
    ///
    /// Asset references are rewritten before the Markdown reaches the template;
    /// only the title gets no-break wrapping.
    pub fn render_deck_page(
        &self,
        deck: &Deck,
        no_break_words: &[String],
        favicon: &str,
    ) -> Result<String> {
        info!("Rendering deck page: {}", deck.id);

        let markdown = fs::read_to_string(&deck.markdown_path).map_err(|e| {
            SiteError::RenderError(format!(
                "Failed to read deck markdown {:?}: {}",
                deck.markdown_path, e
            ))
        })?;

        let data = DeckPageData {
            title: wrap_no_break(&deck.metadata.title, no_break_words),
            title_raw: &deck.metadata.title,
            content: rewrite_asset_refs(&markdown, &deck.id),
            favicon,
        };
        self.templates.render(SLIDE_DECK_TEMPLATE, &data)
    }

    /// Render the home page listing the given decks
    pub fn render_home_page(
        &self,
        course: &CourseMetadata,
        decks: &[Deck],
        chrome: &Chrome,
    ) -> Result<String> {
        info!("Rendering home page with {} decks", decks.len());
        let words = &course.no_break_words;

        let data = HomePageData {
            course: CourseData {
                title_raw: &course.title,
                title: wrap_no_break(&course.title, words),
                description: wrap_no_break(course.description(), words),
            },
            slide_decks: decks
                .iter()
                .map(|deck| DeckLink {
                    location: deck.location(),
                    title: wrap_no_break(&deck.metadata.title, words),
                    description: wrap_no_break(deck.metadata.description(), words),
                })
                .collect(),
            chrome,
        };
        self.templates.render(INDEX_TEMPLATE, &data)
    }

    pub fn render_error_page(&self, page: &ErrorPage, chrome: &Chrome) -> Result<String> {
        render_error_with(&self.templates, page, chrome)
    }

    /// Render an error page that cannot fail.
    ///
    /// Falls back to the built-in template when the configured one fails, and to
    /// plain text when that fails too.
    pub fn render_error_page_or_fallback(&self, page: &ErrorPage, chrome: &Chrome) -> String {
        match self.render_error_page(page, chrome) {
            Ok(html) => html,
            Err(e) => {
                error!("Error template failed, using built-in template: {}", e);
                fallback_error_page(page, chrome)
            }
        }
    }
}

fn render_error_with(templates: &Templates, page: &ErrorPage, chrome: &Chrome) -> Result<String> {
    let data = ErrorPageData {
        status: page.status,
        short_message: &page.short_message,
        full_message: &page.full_message,
        url: page.url.as_deref(),
        chrome,
    };
    templates.render(ERROR_TEMPLATE, &data)
}

/// Error page rendered without a `PageRenderer`, e.g. when templates failed to load
pub fn fallback_error_page(page: &ErrorPage, chrome: &Chrome) -> String {
    Templates::builtin()
        .and_then(|templates| render_error_with(&templates, page, chrome))
        .unwrap_or_else(|e| {
            error!("Built-in error template failed: {}", e);
            format!("{} {}\n\n{}", page.status, page.short_message, page.full_message)
        })
}
