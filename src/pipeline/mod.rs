//! End-to-end extraction pipelines.
//!
//! ```text
//! paper id
//!     ↓
//! [PaperStore::fetch_paper] → pdf_file_path
//!     ↓
//! download_file → <documents_dir>/<id>/<file>.pdf
//!     ↓
//! ├─ StructureProcessor: DocumentConverter → TEI → divisions + metadata → store
//! └─ FigureExtractor: PageRenderer → LayoutClassifier → match_page → OCR → store
//! ```
//!
//! Setup failures (missing record, failed download, failed render) end a
//! run. Failures on a single page or region are logged and skipped.

pub mod figures;
pub mod structure;

pub use figures::FigureExtractor;
pub use structure::{ProcessOutcome, StructureProcessor};

use crate::error::{Error, Result};
use crate::services::download::{download_file, file_name_from_url};
use crate::services::store::PaperStore;
use std::path::{Path, PathBuf};

/// Fetch the paper's record and make sure its PDF is available locally.
///
/// Returns the local path `<documents_dir>/<paper_id>/<file name>`.
pub fn fetch_source_pdf(store: &dyn PaperStore, paper_id: &str, documents_dir: &Path) -> Result<PathBuf> {
    let record = store
        .fetch_paper(paper_id)?
        .ok_or_else(|| Error::InvalidInput(format!("no paper found for id {}", paper_id)))?;
    let url = record
        .pdf_file_path
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("paper {} has no pdf_file_path", paper_id)))?;

    let doc_dir = documents_dir.join(paper_id);
    let file_name = file_name_from_url(url).unwrap_or("document.pdf");
    let destination = doc_dir.join(file_name);
    download_file(url, &destination, Some(&doc_dir))?;
    Ok(destination)
}
