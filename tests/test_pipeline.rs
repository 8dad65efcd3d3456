//! End-to-end pipeline tests with in-process collaborators.
//!
//! Rendering, layout detection, OCR and conversion are replaced by fakes;
//! records land in a `MemoryStore`. PDFs are placed in the documents
//! directory up front so no download happens.

use image::{DynamicImage, GenericImageView};
use scholar_extract::layout::{LayoutClassifier, MatchConfig, Region, RegionCategory};
use scholar_extract::services::{
    DocumentConverter, MemoryStore, PageRenderer, PaperRecord, TextRecognizer,
};
use scholar_extract::{Error, FigureExtractor, PipelineConfig, Result, StructureProcessor};
use std::cell::Cell;
use std::path::{Path, PathBuf};

const PAPER_ID: &str = "6f1c2a7e-3b5d-4c1e-9a8f-0d2b4e6f8a10";

// ============================================================================
// Fakes
// ============================================================================

struct Pages(usize);

impl PageRenderer for Pages {
    fn render(&self, _pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        assert_eq!(dpi, 300);
        Ok((0..self.0).map(|_| DynamicImage::new_rgb8(1000, 1400)).collect())
    }
}

struct BrokenRenderer;

impl PageRenderer for BrokenRenderer {
    fn render(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<DynamicImage>> {
        Err(Error::Command {
            program: "pdftoppm",
            message: "syntax error".to_string(),
        })
    }
}

/// Same layout on every page; fails on the page numbers listed.
struct Layout {
    regions: Vec<Region>,
    failing_pages: Vec<usize>,
    calls: Cell<usize>,
}

impl Layout {
    fn new(regions: Vec<Region>) -> Self {
        Self {
            regions,
            failing_pages: Vec::new(),
            calls: Cell::new(0),
        }
    }

    fn failing_on(mut self, page: usize) -> Self {
        self.failing_pages.push(page);
        self
    }
}

impl LayoutClassifier for Layout {
    fn detect(&self, _page: &DynamicImage) -> Result<Vec<Region>> {
        let page = self.calls.get();
        self.calls.set(page + 1);
        if self.failing_pages.contains(&page) {
            return Err(Error::ServiceStatus {
                service: "layout detector",
                status: 500,
                body: String::new(),
            });
        }
        Ok(self.regions.clone())
    }
}

/// Labels crops by height; crops taller than `fail_above` fail.
struct HeightReader {
    fail_above: u32,
}

impl TextRecognizer for HeightReader {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let height = image.height();
        if height > self.fail_above {
            return Err(Error::Command {
                program: "tesseract",
                message: "crop too large".to_string(),
            });
        }
        Ok(format!("\n block {} \n", height))
    }
}

struct StaticTei;

impl DocumentConverter for StaticTei {
    fn convert(&self, _pdf: &Path) -> Result<String> {
        Ok(include_str!("fixtures/sample.tei.xml").to_string())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn workspace() -> (tempfile::TempDir, PipelineConfig) {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("documents").join(PAPER_ID).join("paper.pdf");
    std::fs::create_dir_all(pdf.parent().unwrap()).unwrap();
    std::fs::write(&pdf, b"%PDF-1.7").unwrap();

    let config = PipelineConfig::new()
        .with_documents_dir(dir.path().join("documents"))
        .with_output_dir(dir.path().join("output"));
    (dir, config)
}

fn store() -> MemoryStore {
    MemoryStore::new().with_paper(PaperRecord::new(
        PAPER_ID,
        Some("http://127.0.0.1:9/storage/paper.pdf".to_string()),
    ))
}

fn page_layout() -> Vec<Region> {
    vec![
        Region::new(RegionCategory::Title, 100.0, 50.0, 900.0, 90.0),
        Region::new(RegionCategory::Text, 100.0, 120.0, 900.0, 160.0),
        Region::new(RegionCategory::Figure, 100.0, 200.0, 900.0, 600.0),
        Region::new(RegionCategory::Text, 100.0, 620.0, 900.0, 670.0),
        Region::new(RegionCategory::Text, 100.0, 700.0, 900.0, 1000.0),
        Region::new(RegionCategory::Table, 100.0, 1050.0, 900.0, 1300.0),
    ]
}

// ============================================================================
// Figure pipeline
// ============================================================================

#[test]
fn test_figures_pipeline_stores_every_region() {
    let (dir, config) = workspace();
    let store = store();
    let layout = Layout::new(page_layout());
    let reader = HeightReader { fail_above: 1000 };

    let records = FigureExtractor::new(&store, &Pages(2), &layout, &reader, config).run(PAPER_ID);
    assert_eq!(records.len(), 4);

    let ids: Vec<&str> = records.iter().map(|r| r.figure_id.as_str()).collect();
    assert_eq!(ids, vec!["fig-0-0", "table-0-0", "fig-1-0", "table-1-0"]);

    let figure = &records[0];
    assert_eq!(figure.head, "block 40");
    assert_eq!(figure.description, "block 50");
    assert_eq!(figure.page_number, 1);
    assert!(figure.source_file.ends_with("paper.pdf"));

    // The 300px paragraph above the table is too tall to be its heading
    let table = &records[1];
    assert_eq!(table.figure_type, "table");
    assert_eq!(table.head, "");
    assert_eq!(table.description, "");

    let crop = image::open(dir.path().join("output").join("page0_figure0.png")).unwrap();
    assert_eq!(crop.dimensions(), (800, 400));

    assert_eq!(store.figures().len(), 4);
    let keys = store.object_keys();
    assert_eq!(keys.len(), 4);
    assert!(keys.iter().all(|k| k.starts_with(&format!("figure-images/{}/", PAPER_ID))));
}

#[test]
fn test_figures_pipeline_skips_failures() {
    let (_dir, config) = workspace();
    let store = store();
    let layout = Layout::new(page_layout()).failing_on(1);
    // Caption crops are 50px tall and fail; headings are 40px
    let reader = HeightReader { fail_above: 45 };

    let records = FigureExtractor::new(&store, &Pages(3), &layout, &reader, config).run(PAPER_ID);

    // Figures fail on their caption, page 2 fails detection: only tables survive
    let ids: Vec<&str> = records.iter().map(|r| r.figure_id.as_str()).collect();
    assert_eq!(ids, vec!["table-0-0", "table-2-0"]);
    assert_eq!(store.figures().len(), 2);
}

#[test]
fn test_figures_pipeline_with_tighter_thresholds() {
    let (_dir, config) = workspace();
    let store = store();
    let layout = Layout::new(page_layout());
    let reader = HeightReader { fail_above: 1000 };
    let config = config.with_matching(MatchConfig::uniform(30.0, 200.0));

    let records = FigureExtractor::new(&store, &Pages(1), &layout, &reader, config).run(PAPER_ID);
    // Heading gap is 40px and caption gap 20px
    assert_eq!(records[0].head, "");
    assert_eq!(records[0].description, "block 50");
}

#[test]
fn test_figures_pipeline_render_failure() {
    let (_dir, config) = workspace();
    let store = store();
    let layout = Layout::new(page_layout());
    let reader = HeightReader { fail_above: 1000 };

    let records = FigureExtractor::new(&store, &BrokenRenderer, &layout, &reader, config).run(PAPER_ID);
    assert!(records.is_empty());
    assert!(store.object_keys().is_empty());
}

// ============================================================================
// Structure pipeline
// ============================================================================

#[test]
fn test_structure_pipeline() {
    let (dir, config) = workspace();
    let store = store();

    let outcome = StructureProcessor::new(&store, &StaticTei, config).process(PAPER_ID);
    assert!(outcome.success);
    assert_eq!(outcome.inserted, 3);

    let divisions = store.divisions();
    assert_eq!(divisions.len(), 3);
    assert!(divisions.iter().all(|d| d.paper_summary_id == PAPER_ID));

    let metadata = store.metadata();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].metadata.authors.len(), 2);

    let tei: PathBuf = dir.path().join("documents").join(PAPER_ID).join("paper.tei.xml");
    assert!(tei.is_file());
}

#[test]
fn test_structure_pipeline_unknown_paper() {
    let (_dir, config) = workspace();
    let store = MemoryStore::new();

    let outcome = StructureProcessor::new(&store, &StaticTei, config).process(PAPER_ID);
    assert!(!outcome.success);
    assert!(outcome.message.contains(PAPER_ID));
    assert!(store.divisions().is_empty());
}
