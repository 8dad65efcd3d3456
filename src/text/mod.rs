//! Text normalization shared by the TEI extractors and the OCR pipeline.

pub mod cleanup;

pub use cleanup::{clean_text, normalize_whitespace};
