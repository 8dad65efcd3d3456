//! Figure pipeline: rendered pages to stored figure and table crops.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::imaging::{crop_region, save_png};
use crate::layout::caption_matcher::{match_page, RegionMatch};
use crate::layout::classifier::LayoutClassifier;
use crate::layout::region::{Page, Region, RegionCategory};
use crate::pipeline::fetch_source_pdf;
use crate::services::ocr::TextRecognizer;
use crate::services::render::PageRenderer;
use crate::services::store::{FigureRecord, PaperStore};
use crate::text::clean_text;
use image::DynamicImage;
use std::path::Path;
use uuid::Uuid;

/// Detects figures and tables on every page of a paper, reads their headings
/// and captions, and stores crops and rows.
pub struct FigureExtractor<'a> {
    store: &'a dyn PaperStore,
    renderer: &'a dyn PageRenderer,
    classifier: &'a dyn LayoutClassifier,
    recognizer: &'a dyn TextRecognizer,
    config: PipelineConfig,
}

impl<'a> FigureExtractor<'a> {
    /// Create an extractor over the given collaborators.
    pub fn new(
        store: &'a dyn PaperStore,
        renderer: &'a dyn PageRenderer,
        classifier: &'a dyn LayoutClassifier,
        recognizer: &'a dyn TextRecognizer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            renderer,
            classifier,
            recognizer,
            config,
        }
    }

    /// Extract figures and tables for the paper with id `paper_id`.
    ///
    /// Returns the inserted rows. A missing record, failed download or
    /// failed render yields an empty list.
    pub fn run(&self, paper_id: &str) -> Vec<FigureRecord> {
        let pdf = match fetch_source_pdf(self.store, paper_id, &self.config.documents_dir) {
            Ok(pdf) => pdf,
            Err(e) => {
                log::error!("Cannot prepare PDF for paper {}: {}", paper_id, e);
                return Vec::new();
            },
        };
        self.extract_from_pdf(paper_id, &pdf)
    }

    /// Extract figures and tables from a local PDF on behalf of `paper_id`.
    pub fn extract_from_pdf(&self, paper_id: &str, pdf: &Path) -> Vec<FigureRecord> {
        let images = match self.renderer.render(pdf, self.config.dpi) {
            Ok(images) => images,
            Err(e) => {
                log::error!("Failed to render {}: {}", pdf.display(), e);
                return Vec::new();
            },
        };

        let mut records = Vec::new();
        for (index, image) in images.iter().enumerate() {
            let regions = match self.classifier.detect(image) {
                Ok(regions) => regions,
                Err(e) => {
                    log::warn!("Layout detection failed on page {}: {}", index + 1, e);
                    continue;
                },
            };
            let page = Page::new(index, regions);

            for found in match_page(&page, &self.config.matching) {
                match self.store_match(paper_id, pdf, image, &page, &found) {
                    Ok(record) => records.push(record),
                    Err(e) => log::error!(
                        "Skipping {} {} on page {}: {}",
                        found.target.category,
                        found.ordinal,
                        index + 1,
                        e
                    ),
                }
            }
        }

        log::info!("Stored {} figures and tables for paper {}", records.len(), paper_id);
        records
    }

    fn store_match(
        &self,
        paper_id: &str,
        pdf: &Path,
        image: &DynamicImage,
        page: &Page,
        found: &RegionMatch<'_>,
    ) -> Result<FigureRecord> {
        let (kind, id_prefix) = match found.target.category {
            RegionCategory::Table => ("table", "table"),
            _ => ("figure", "fig"),
        };

        let crop = crop_region(image, &found.target.bbox)
            .ok_or_else(|| Error::InvalidInput(format!("{} region lies outside the page", kind)))?;
        let head = self.read_text(image, found.matched.heading)?;
        let description = self.read_text(image, found.matched.caption)?;

        let local_path = self
            .config
            .output_dir
            .join(format!("page{}_{}{}.png", page.index, kind, found.ordinal));
        let png = save_png(&crop, &local_path)?;

        let object_path = format!("{}/{}.png", paper_id, Uuid::new_v4());
        let image_url = self.store.upload_image(&self.config.bucket, &object_path, &png)?;

        let mut record = FigureRecord {
            id: None,
            paper_summary_id: paper_id.to_string(),
            figure_type: kind.to_string(),
            figure_id: format!("{}-{}-{}", id_prefix, page.index, found.ordinal),
            head,
            description,
            extracted_image_path: local_path.to_string_lossy().into_owned(),
            page_number: page.index as u32 + 1,
            source_file: pdf.to_string_lossy().into_owned(),
            image_url: Some(image_url),
        };
        record.id = self.store.insert_figure(&record)?;
        log::info!("Stored {} {} from page {}", kind, record.figure_id, record.page_number);
        Ok(record)
    }

    /// OCR and clean the crop of `region`; no region or an off-page region
    /// reads as empty.
    fn read_text(&self, image: &DynamicImage, region: Option<&Region>) -> Result<String> {
        let Some(crop) = region.and_then(|r| crop_region(image, &r.bbox)) else {
            return Ok(String::new());
        };
        Ok(clean_text(&self.recognizer.recognize(&crop)?))
    }
}
