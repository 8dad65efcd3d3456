//! Structure pipeline: PDF to stored divisions and metadata.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::fetch_source_pdf;
use crate::services::grobid::DocumentConverter;
use crate::services::store::PaperStore;
use crate::tei::divisions::into_records;
use crate::tei::metadata::MetadataRecord;
use crate::tei::TeiDocument;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of processing one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    /// Whether the divisions were stored
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Number of division rows inserted
    pub inserted: usize,
}

impl ProcessOutcome {
    fn succeeded(inserted: usize) -> Self {
        Self {
            success: true,
            message: format!("Successfully inserted {} divisions", inserted),
            inserted,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            inserted: 0,
        }
    }
}

/// Converts a paper's PDF to TEI and stores its divisions and metadata.
pub struct StructureProcessor<'a> {
    store: &'a dyn PaperStore,
    converter: &'a dyn DocumentConverter,
    config: PipelineConfig,
}

impl<'a> StructureProcessor<'a> {
    /// Create a processor over the given store and converter.
    pub fn new(store: &'a dyn PaperStore, converter: &'a dyn DocumentConverter, config: PipelineConfig) -> Self {
        Self {
            store,
            converter,
            config,
        }
    }

    /// Process the paper with id `paper_id`.
    pub fn process(&self, paper_id: &str) -> ProcessOutcome {
        let result = fetch_source_pdf(self.store, paper_id, &self.config.documents_dir)
            .and_then(|pdf| self.process_pdf(paper_id, &pdf));
        match result {
            Ok(inserted) => ProcessOutcome::succeeded(inserted),
            Err(e) => {
                log::error!("Failed to process paper {}: {}", paper_id, e);
                ProcessOutcome::failed(format!("Failed to process paper {}: {}", paper_id, e))
            },
        }
    }

    /// Process a local PDF on behalf of `paper_id`, returning the number of
    /// division rows inserted.
    pub fn process_pdf(&self, paper_id: &str, pdf: &Path) -> Result<usize> {
        let tei_xml = self.converter.convert(pdf)?;
        let tei_path = tei_path_for(pdf);
        std::fs::write(&tei_path, &tei_xml)?;
        log::info!("Saved TEI to {}", tei_path.display());

        let document = TeiDocument::parse(&tei_xml)?;
        let records = into_records(document.divisions(), paper_id);
        log::info!("Extracted {} divisions from {}", records.len(), pdf.display());
        self.store.insert_divisions(&records)?;

        let metadata = document.metadata();
        if metadata.is_empty() {
            log::warn!("No header metadata found for paper {}", paper_id);
        } else {
            let record = MetadataRecord {
                metadata,
                paper_summary_id: paper_id.to_string(),
            };
            // Divisions are already stored; a metadata failure does not undo them
            if let Err(e) = self.store.insert_metadata(&record) {
                log::warn!("Failed to insert metadata for paper {}: {}", paper_id, e);
            }
        }

        Ok(records.len())
    }
}

/// `paper.pdf` → `paper.tei.xml` in the same directory.
fn tei_path_for(pdf: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    pdf.with_file_name(format!("{}.tei.xml", stem))
}
