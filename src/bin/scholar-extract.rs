//! Scholar Extract CLI
//!
//! Runs the extraction pipelines against a Supabase project, or the TEI
//! extractors against local files.
//!
//! Usage:
//!   scholar-extract structure <paper-id>
//!   scholar-extract figures <paper-id> --layout-url http://localhost:5000/detect
//!   scholar-extract divisions paper.tei.xml
//!   scholar-extract metadata paper.tei.xml
//!   scholar-extract tei-figures paper.tei.xml --pdf paper.pdf
//!
//! `SUPABASE_URL`, `SUPABASE_KEY`, `GROBID_URL` and `LAYOUT_URL` are read from
//! the environment; flags take precedence. Set `RUST_LOG=info` for progress.

use clap::{Parser, Subcommand, ValueEnum};
use scholar_extract::layout::{
    associate_figures, ImageSelectionPolicy, LayoutClassifier, MatchConfig, Page, RemoteLayoutClassifier,
};
use scholar_extract::services::{
    GrobidClient, PageRenderer, PdftoppmRenderer, SupabaseStore, TesseractRecognizer,
};
use scholar_extract::tei::{FigureKindFallback, TeiDocument};
use scholar_extract::{Error, FigureExtractor, PipelineConfig, Result, StructureProcessor};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "scholar-extract")]
#[command(version, about = "Extract structure, metadata and figures from scholarly PDFs", long_about = None)]
struct Cli {
    /// Page rendering resolution
    #[arg(long, global = true)]
    dpi: Option<u32>,

    /// Maximum gap between a figure and its heading or caption, in pixels
    #[arg(long, global = true)]
    max_distance: Option<f32>,

    /// Maximum height of a heading or caption block, in pixels
    #[arg(long, global = true)]
    max_height: Option<f32>,

    /// Directory downloaded PDFs are stored under
    #[arg(long, global = true)]
    documents_dir: Option<PathBuf>,

    /// Directory figure crops are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// GROBID base URL
    #[arg(long, global = true)]
    grobid_url: Option<String>,

    /// Layout detection endpoint
    #[arg(long, global = true)]
    layout_url: Option<String>,

    /// Storage bucket for figure crops
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// Figure kind assumed for TEI figures without a graphic
    #[arg(long, global = true, value_enum)]
    figure_fallback: Option<FallbackArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a paper with GROBID and store its divisions and metadata
    Structure {
        /// Paper id (UUID)
        id: String,

        /// Ask GROBID not to consolidate citations against external services
        #[arg(long)]
        no_consolidate_citations: bool,
    },
    /// Detect figures and tables, read their headings and captions, and store them
    Figures {
        /// Paper id (UUID)
        id: String,

        /// Tesseract language code, e.g. eng+deu
        #[arg(long)]
        ocr_language: Option<String>,

        /// Tesseract page segmentation mode (--psm)
        #[arg(long)]
        psm: Option<u8>,
    },
    /// Print the body divisions of a TEI file as JSON
    Divisions {
        /// TEI file produced by GROBID
        tei: PathBuf,
    },
    /// Print the header metadata of a TEI file as JSON
    Metadata {
        /// TEI file produced by GROBID
        tei: PathBuf,
    },
    /// List TEI figures, optionally paired with detected images from the PDF
    TeiFigures {
        /// TEI file produced by GROBID
        tei: PathBuf,

        /// Source PDF; requires a layout endpoint
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Pick images by position on the page instead of coordinate overlap
        #[arg(long)]
        first_on_page: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FallbackArg {
    Bitmap,
    Vector,
}

impl From<FallbackArg> for FigureKindFallback {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Bitmap => FigureKindFallback::Bitmap,
            FallbackArg::Vector => FigureKindFallback::Vector,
        }
    }
}

impl Cli {
    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::from_env();
        if let Some(dpi) = self.dpi {
            config = config.with_dpi(dpi);
        }
        if self.max_distance.is_some() || self.max_height.is_some() {
            let defaults = MatchConfig::default();
            config = config.with_matching(MatchConfig::uniform(
                self.max_distance.unwrap_or(defaults.heading.max_distance),
                self.max_height.unwrap_or(defaults.heading.max_height),
            ));
        }
        if let Some(dir) = &self.documents_dir {
            config = config.with_documents_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(url) = &self.grobid_url {
            config = config.with_grobid_url(url);
        }
        if let Some(url) = &self.layout_url {
            config = config.with_layout_url(url);
        }
        if let Some(bucket) = &self.bucket {
            config = config.with_bucket(bucket);
        }
        if let Some(fallback) = self.figure_fallback {
            config = config.with_figure_fallback(fallback.into());
        }
        config
    }
}

fn parse_paper_id(id: &str) -> Result<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| Error::InvalidInput(format!("invalid UUID format: {}", id)))
}

fn store_for(config: &PipelineConfig) -> Result<SupabaseStore> {
    let (url, key) = config.supabase_credentials()?;
    Ok(SupabaseStore::new(url, key)?.with_tables(config.tables.clone()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config();

    match cli.command {
        Commands::Structure {
            id,
            no_consolidate_citations,
        } => {
            let id = parse_paper_id(&id)?;
            let store = store_for(&config)?;
            let converter = GrobidClient::new(config.grobid_url.clone())?
                .with_consolidate_citations(!no_consolidate_citations);
            if !converter.is_alive() {
                log::warn!("GROBID at {} did not answer the liveness check", config.grobid_url);
            }
            let outcome = StructureProcessor::new(&store, &converter, config).process(&id);
            print_json(&outcome)?;
            if !outcome.success {
                return Err(Error::Processing(outcome.message));
            }
        },
        Commands::Figures { id, ocr_language, psm } => {
            let id = parse_paper_id(&id)?;
            let store = store_for(&config)?;
            let classifier = RemoteLayoutClassifier::new(config.layout_endpoint()?)?
                .with_score_threshold(config.score_threshold);
            let mut recognizer = TesseractRecognizer::new();
            if let Some(language) = ocr_language {
                recognizer = recognizer.with_language(language);
            }
            if let Some(psm) = psm {
                recognizer = recognizer.with_page_segmentation_mode(psm);
            }
            if !recognizer.is_available() {
                return Err(Error::MissingConfig("tesseract binary"));
            }
            let renderer = PdftoppmRenderer::new();
            let records = FigureExtractor::new(&store, &renderer, &classifier, &recognizer, config).run(&id);
            print_json(&records)?;
        },
        Commands::Divisions { tei } => {
            let document = TeiDocument::open(&tei)?;
            print_json(&document.divisions())?;
        },
        Commands::Metadata { tei } => {
            let document = TeiDocument::open(&tei)?;
            print_json(&document.metadata())?;
        },
        Commands::TeiFigures {
            tei,
            pdf,
            first_on_page,
        } => {
            let config = if first_on_page {
                config.with_image_policy(ImageSelectionPolicy::FirstOnPage)
            } else {
                config
            };
            let document = TeiDocument::open(&tei)?;
            let figures = document.figures(config.figure_fallback);

            let pages = match &pdf {
                Some(pdf) => {
                    let classifier = RemoteLayoutClassifier::new(config.layout_endpoint()?)?
                        .with_score_threshold(config.score_threshold);
                    let images = PdftoppmRenderer::new().render(pdf, config.dpi)?;
                    let mut pages = Vec::with_capacity(images.len());
                    for (index, image) in images.iter().enumerate() {
                        match classifier.detect(image) {
                            Ok(regions) => pages.push(Page::new(index, regions)),
                            Err(e) => log::warn!("Layout detection failed on page {}: {}", index + 1, e),
                        }
                    }
                    pages
                },
                None => Vec::new(),
            };

            let rows: Vec<serde_json::Value> = associate_figures(&figures, &pages, config.dpi, config.image_policy)
                .iter()
                .map(|found| {
                    let selected = found
                        .images
                        .selected
                        .map(|r| [r.bbox.left, r.bbox.top, r.bbox.right, r.bbox.bottom]);
                    json!({
                        "id": found.figure.xml_id,
                        "figure_type": found.figure.kind.figure_type(),
                        "kind": found.figure.kind.to_string(),
                        "head": found.figure.head,
                        "label": found.figure.label,
                        "description": found.figure.description,
                        "page_number": found.figure.page(),
                        "candidate_images": found.images.candidates.len(),
                        "selected_image": selected,
                    })
                })
                .collect();
            print_json(&rows)?;
        },
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
