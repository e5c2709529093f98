// ABOUTME: Batch site assembly writing the complete static output tree
// ABOUTME: Copies static trees, renders every deck, the home page and the error pages

use crate::catalog::DeckCatalog;
use crate::config::{BrandFile, Config};
use crate::errors::{Result, SiteError};
use crate::metadata::{MetadataStore, DEFAULT_FAVICON, DEFAULT_LOGO};
use crate::pages::{Chrome, ErrorPage, PageRenderer};
use crate::templates::Templates;
use crate::utils;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What a build produced
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildSummary {
    /// Every deck page written, hidden ones included
    pub decks_built: Vec<String>,
    /// Decks linked from the home page
    pub decks_listed: Vec<String>,
    pub files_copied: usize,
}

/// One-shot pipeline turning the slides directory into a static site
pub struct SiteAssembler {
    config: Config,
}

impl SiteAssembler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the whole site into the configured output directory.
    ///
    /// Stops at the first failure; whatever was written before it stays on disk.
    pub fn build(&self) -> Result<BuildSummary> {
        let start_time = Instant::now();
        let config = &self.config;
        let out = &config.output_dir;
        let mut summary = BuildSummary::default();

        utils::validate_directory_exists(&config.slides_dir)?;
        self.check_output_location()?;

        info!("Clearing output directory {:?}", out);
        utils::empty_directory(out)?;
        utils::validate_directory_writable(out)?;

        summary.files_copied += self.copy_static_trees()?;

        let store = MetadataStore::new(&config.slides_dir);
        let course = store.load_course_metadata()?;
        let favicon = config.resolve_brand_file(course.fav_icon.as_deref(), DEFAULT_FAVICON);
        let logo = config.resolve_brand_file(course.bg_logo.as_deref(), DEFAULT_LOGO);
        summary.files_copied += self.publish_brand_file(&favicon)?;
        summary.files_copied += self.publish_brand_file(&logo)?;
        let chrome = Chrome::published(&favicon.file_name, &logo.file_name);

        let renderer = PageRenderer::new(Templates::load(config.templates_dir.as_deref())?);
        let catalog = DeckCatalog::new(&store);
        let decks = catalog.list_decks()?;

        for deck in &decks {
            let html = renderer.render_deck_page(deck, &course.no_break_words, &chrome.favicon)?;
            let deck_out = out.join("slides").join(&deck.id);
            write_page(&deck_out.join("index.html"), &html)?;

            if deck.asset_dir.is_dir() {
                summary.files_copied += utils::copy_dir_all(&deck.asset_dir, &deck_out.join("assets"))?;
            }
            if deck.metadata.hidden {
                info!("Built hidden deck {} (not listed)", deck.id);
            }
            summary.decks_built.push(deck.id.clone());
        }

        let visible: Vec<_> = decks.into_iter().filter(|d| !d.metadata.hidden).collect();
        let home = renderer.render_home_page(&course, &visible, &chrome)?;
        write_page(&out.join("index.html"), &home)?;
        summary.decks_listed = visible.into_iter().map(|d| d.id).collect();

        let not_found = renderer.render_error_page(&ErrorPage::not_found(None), &chrome)?;
        write_page(&out.join("404.html"), &not_found)?;
        let server_error = renderer.render_error_page(&ErrorPage::server_error(None), &chrome)?;
        write_page(&out.join("500.html"), &server_error)?;

        info!(
            "Built {} decks ({} listed) into {:?} in {:.2} seconds",
            summary.decks_built.len(),
            summary.decks_listed.len(),
            out,
            start_time.elapsed().as_secs_f64()
        );
        Ok(summary)
    }

    /// Refuse an output directory that holds, or lies inside, any of the sources.
    /// Runs before anything is cleared.
    fn check_output_location(&self) -> Result<()> {
        let config = &self.config;
        let out = &config.output_dir;
        let sources = [
            Some(&config.slides_dir),
            Some(&config.public_dir),
            Some(&config.vendor_dir),
            config.templates_dir.as_ref(),
        ];
        for source in sources.into_iter().flatten() {
            if !source.exists() {
                continue;
            }
            if utils::is_within(source, out) {
                return Err(SiteError::ValidationError(format!(
                    "Output directory {:?} contains source directory {:?}",
                    out, source
                )));
            }
            if utils::is_within(out, source) {
                return Err(SiteError::ValidationError(format!(
                    "Output directory {:?} lies inside source directory {:?}",
                    out, source
                )));
            }
        }
        Ok(())
    }

    /// Copy `public/` and vendor packages verbatim into the output root
    fn copy_static_trees(&self) -> Result<usize> {
        let config = &self.config;
        let mut copied = 0;

        let mut trees: Vec<(PathBuf, PathBuf)> =
            vec![(config.public_dir.clone(), config.output_dir.join("public"))];
        for (name, src) in config.vendor_sources() {
            trees.push((src, config.output_dir.join(name)));
        }

        for (src, dst) in trees {
            if !src.is_dir() {
                warn!("Skipping missing static directory {:?}", src);
                continue;
            }
            info!("Copying {:?} -> {:?}", src, dst);
            copied += utils::copy_dir_all(&src, &dst)?;
        }
        Ok(copied)
    }

    fn publish_brand_file(&self, brand: &BrandFile) -> Result<usize> {
        let target = self.config.output_dir.join("public").join(&brand.file_name);
        match &brand.source {
            Some(source) => {
                utils::ensure_parent_directory_exists(&target)?;
                fs::copy(source, &target)?;
                Ok(1)
            }
            None => {
                warn!(
                    "No {} found in course metadata or public directory",
                    brand.file_name
                );
                Ok(0)
            }
        }
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    utils::ensure_parent_directory_exists(path)?;
    fs::write(path, html)?;
    info!("Wrote {:?}", path);
    Ok(())
}
