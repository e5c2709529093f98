// ABOUTME: Main entry point for the course-slides program.
// ABOUTME: Provides CLI interface for building the static site or serving it live.

use clap::{Args, Parser, Subcommand};
use course_slides::{Config, SiteAssembler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site into the output directory
    Build {
        /// Output directory (cleared before building)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the course live, re-reading sources on every request
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to bind
        #[arg(long)]
        interface: Option<String>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Directory containing one directory per slide deck
    #[arg(long, global = true)]
    slides: Option<PathBuf>,

    /// Directory of static assets published under /public
    #[arg(long, global = true)]
    public: Option<PathBuf>,

    /// Directory holding vendor packages such as reveal.js
    #[arg(long, global = true)]
    vendor: Option<PathBuf>,

    /// Directory with template overrides (index.html, slide_deck.html, error.html)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,
}

impl SourceArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(slides) = &self.slides {
            config.slides_dir = slides.clone();
        }
        if let Some(public) = &self.public {
            config.public_dir = public.clone();
        }
        if let Some(vendor) = &self.vendor {
            config.vendor_dir = vendor.clone();
        }
        if let Some(templates) = &self.templates {
            config.templates_dir = Some(templates.clone());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.sources.apply(&mut config);

    let result = match cli.command {
        Some(Commands::Build { output }) => {
            if let Some(output) = output {
                config.output_dir = output;
            }
            println!("Building site into {:?}...", config.output_dir);
            SiteAssembler::new(config).build().map(|summary| {
                println!(
                    "Site built: {} decks ({} listed), {} files copied",
                    summary.decks_built.len(),
                    summary.decks_listed.len(),
                    summary.files_copied
                );
            })
        }
        Some(Commands::Serve { port, interface }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(interface) = interface {
                config.interface = interface;
            }
            course_slides::serve_site(config)
        }
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
