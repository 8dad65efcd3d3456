//! Page layout: detected regions and the heuristics built on them.
//!
//! - [`region`]: typed regions and pages
//! - [`classifier`]: layout detection behind [`LayoutClassifier`]
//! - [`caption_matcher`]: heading/caption association for figures and tables
//! - [`image_selection`]: picking a detected image for a TEI figure

pub mod caption_matcher;
pub mod classifier;
pub mod image_selection;
pub mod region;

// Re-export main types
pub use caption_matcher::{
    find_heading_and_caption, match_page, match_region, CaptionMatch, MatchConfig, MatchThresholds,
    RegionMatch, DEFAULT_MAX_DISTANCE, DEFAULT_MAX_HEIGHT,
};
pub use classifier::{regions_from_detections, LayoutClassifier, RemoteLayoutClassifier, DEFAULT_SCORE_THRESHOLD};
pub use image_selection::{associate_figures, select_image, FigureAssociation, ImageCandidates, ImageSelectionPolicy};
pub use region::{Page, Region, RegionCategory};
