//! Reading GROBID TEI documents.
//!
//! - [`divisions`]: body sections, paragraphs and reference markers
//! - [`metadata`]: title, authors, dates, abstract and identifiers
//! - [`figures`]: figure and table descriptions with page coordinates
//!
//! All extractors work on the element tree built by [`node::parse_document`];
//! parse once with [`TeiDocument::parse`] when more than one is needed.

pub mod divisions;
pub mod figures;
pub mod metadata;
pub mod node;

pub use divisions::{extract_divisions, Division, DivisionRecord, Paragraph, RefMarker};
pub use figures::{extract_figures, FigureKind, FigureKindFallback, PageBox, TeiFigure};
pub use metadata::{extract_metadata, Affiliation, Author, MetadataRecord, PaperMetadata};

use crate::error::Result;
use node::XmlElement;

/// A parsed TEI document.
#[derive(Debug, Clone)]
pub struct TeiDocument {
    root: XmlElement,
}

impl TeiDocument {
    /// Parse TEI XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self {
            root: node::parse_document(xml)?,
        })
    }

    /// Read and parse a TEI file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Body divisions.
    pub fn divisions(&self) -> Vec<Division> {
        divisions::divisions_from_tree(&self.root)
    }

    /// Header metadata.
    pub fn metadata(&self) -> PaperMetadata {
        metadata::metadata_from_tree(&self.root)
    }

    /// Figures and tables.
    pub fn figures(&self, fallback: FigureKindFallback) -> Vec<TeiFigure> {
        figures::figures_from_tree(&self.root, fallback)
    }
}
