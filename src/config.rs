// ABOUTME: Configuration module for the course-slides application
// ABOUTME: Provides source/output locations and server settings with environment overrides

use crate::errors::SiteError;
use crate::utils;
use log::warn;
use std::env;
use std::path::{Path, PathBuf};

/// Reserved directory under the slides root holding course-wide metadata and branding
pub const COURSE_METADATA_DIR: &str = "course_metadata";

/// Metadata file name, both for the course and for each deck
pub const METADATA_FILE: &str = "metadata.json";

/// Markdown source of a deck
pub const DECK_MARKDOWN_FILE: &str = "index.md";

/// Per-deck asset directory
pub const DECK_ASSETS_DIR: &str = "assets";

pub const DEFAULT_VENDOR_PACKAGES: [&str; 3] = [
    "reveal.js",
    "reveal.js-mermaid-plugin",
    "reveal.js-countdown",
];

/// A resolved branding file: the name it is published under and where it lives
#[derive(Debug, Clone, PartialEq)]
pub struct BrandFile {
    pub file_name: String,
    /// `None` when neither the configured nor the default file exists
    pub source: Option<PathBuf>,
}

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding one directory per deck plus `course_metadata/`
    pub slides_dir: PathBuf,
    /// Batch output root; cleared on every build
    pub output_dir: PathBuf,
    /// Static assets copied to `out/public` and mounted at `/public`
    pub public_dir: PathBuf,
    /// Directory containing third-party packages such as reveal.js
    pub vendor_dir: PathBuf,
    /// Package names under `vendor_dir` copied (batch) or mounted (live) at `/<name>`
    pub vendor_packages: Vec<String>,
    /// Optional directory whose `<name>.html` files override the built-in templates
    pub templates_dir: Option<PathBuf>,
    pub interface: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slides_dir: PathBuf::from("slides"),
            output_dir: PathBuf::from("out"),
            public_dir: PathBuf::from("public"),
            vendor_dir: PathBuf::from("node_modules"),
            vendor_packages: DEFAULT_VENDOR_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            templates_dir: None,
            interface: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Configuration rooted at a project directory using the default layout
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            slides_dir: root.join(&defaults.slides_dir),
            output_dir: root.join(&defaults.output_dir),
            public_dir: root.join(&defaults.public_dir),
            vendor_dir: root.join(&defaults.vendor_dir),
            ..defaults
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let slides_dir = env::var("SLIDES_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.slides_dir);
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);
        let public_dir = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.public_dir);
        let vendor_dir = env::var("VENDOR_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.vendor_dir);
        let vendor_packages = env::var("VENDOR_PACKAGES")
            .ok()
            .map(|s| parse_list(&s))
            .unwrap_or(defaults.vendor_packages);
        let templates_dir = env::var("TEMPLATES_DIR").ok().map(PathBuf::from);
        let interface = env::var("INTERFACE").unwrap_or(defaults.interface);
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        Self {
            slides_dir,
            output_dir,
            public_dir,
            vendor_dir,
            vendor_packages,
            templates_dir,
            interface,
            port,
        }
    }

    /// Directory holding course metadata and branding files
    pub fn course_metadata_dir(&self) -> PathBuf {
        self.slides_dir.join(COURSE_METADATA_DIR)
    }

    /// Locate a branding file (favicon, logo).
    ///
    /// A configured name is looked up in the course directory first; when it is
    /// unset, missing on disk or resolves outside that directory, the default
    /// name is tried in the course directory and then in the public directory.
    pub fn resolve_brand_file(&self, configured: Option<&str>, default: &str) -> BrandFile {
        let course_dir = self.course_metadata_dir();
        if let Some(name) = configured {
            // Published as out/public/<name>, so the name itself must stay relative
            let resolved = if Path::new(name).has_root() {
                Err(SiteError::Forbidden(format!("{} is not a relative name", name)))
            } else {
                utils::resolve_within(&course_dir, name)
            };
            match resolved {
                Ok(path) => {
                    return BrandFile {
                        file_name: name.to_string(),
                        source: Some(path),
                    }
                }
                Err(e) => warn!("Branding file {}: {}, falling back to {}", name, e, default),
            }
        }

        let source = [course_dir.join(default), self.public_dir.join(default)]
            .into_iter()
            .find(|p| p.is_file());
        BrandFile {
            file_name: default.to_string(),
            source,
        }
    }

    /// Source directories of the configured vendor packages, paired with their names
    pub fn vendor_sources(&self) -> Vec<(String, PathBuf)> {
        self.vendor_packages
            .iter()
            .map(|name| (name.clone(), self.vendor_dir.join(name)))
            .collect()
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
