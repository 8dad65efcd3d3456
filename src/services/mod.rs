//! Clients for the external collaborators of the pipelines.
//!
//! Each collaborator sits behind a narrow trait so the pipelines can be
//! driven by fakes in tests:
//!
//! - [`DocumentConverter`]: PDF to TEI (GROBID)
//! - [`PageRenderer`]: PDF pages to images (pdftoppm)
//! - [`TextRecognizer`]: OCR of region crops (tesseract)
//! - [`PaperStore`]: record and image persistence (Supabase)

pub mod download;
pub mod grobid;
pub mod ocr;
pub mod render;
pub mod store;

pub use download::{download_file, file_name_from_url, DownloadStatus};
pub use grobid::{DocumentConverter, GrobidClient, DEFAULT_GROBID_URL};
pub use ocr::{TesseractRecognizer, TextRecognizer};
pub use render::{PageRenderer, PdftoppmRenderer, DEFAULT_DPI};
pub use store::{FigureRecord, MemoryStore, PaperRecord, PaperStore, StoreTables, SupabaseStore};
