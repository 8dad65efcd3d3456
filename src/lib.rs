// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Scholar Extract
//!
//! Structured extraction from scholarly PDFs: sections, metadata, figures
//! and tables, with their headings and captions.
//!
//! ## Core Features
//!
//! ### Document structure
//! - **TEI conversion**: PDFs are converted by a GROBID server
//! - **Divisions**: body sections with paragraphs and reference markers
//! - **Metadata**: title, authors and affiliations, dates, abstract, identifiers
//! - **TEI figures**: figure and table descriptions with page coordinates
//!
//! ### Figures and tables
//! - **Layout detection**: typed page regions from a detection service
//! - **Caption matching**: nearest heading above and caption below each
//!   figure or table, within distance and height limits
//! - **OCR**: heading and caption crops read with tesseract
//! - **Persistence**: crops uploaded to object storage, rows inserted into
//!   the paper store
//!
//! ## Architecture
//! - **Pure core**: region matching and TEI extraction perform no I/O
//! - **Pluggable collaborators**: conversion, rendering, detection, OCR and
//!   storage sit behind traits in [`services`] and [`layout`]
//! - **Pipelines**: [`pipeline::StructureProcessor`] and
//!   [`pipeline::FigureExtractor`] wire the pieces together
//!
//! ## Quick Start
//!
//! ```
//! use scholar_extract::layout::{match_page, MatchConfig, Page, Region, RegionCategory};
//!
//! let page = Page::new(
//!     0,
//!     vec![
//!         Region::new(RegionCategory::Text, 0.0, 60.0, 500.0, 95.0),
//!         Region::new(RegionCategory::Figure, 0.0, 100.0, 500.0, 400.0),
//!         Region::new(RegionCategory::Text, 0.0, 410.0, 500.0, 440.0),
//!     ],
//! );
//!
//! let matches = match_page(&page, &MatchConfig::default());
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].matched.heading, Some(&page.regions[0]));
//! assert_eq!(matches[0].matched.caption, Some(&page.regions[2]));
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Geometry and page images
pub mod geometry;
pub mod imaging;

// Layout regions and caption matching
pub mod layout;

// TEI extraction
pub mod tei;
pub mod text;

// External services
pub mod services;

// Pipelines
pub mod pipeline;

// Configuration
pub mod config;

// Re-exports
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use geometry::Rect;
pub use layout::{match_region, CaptionMatch, MatchConfig, Page, Region, RegionCategory};
pub use pipeline::{FigureExtractor, ProcessOutcome, StructureProcessor};
pub use tei::TeiDocument;

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
