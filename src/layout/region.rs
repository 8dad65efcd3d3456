//! Layout regions detected on a rendered page image.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category assigned to a region by the layout classifier.
///
/// The set mirrors the PubLayNet label map used by the upstream detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionCategory {
    /// Body text block
    Text,
    /// Section or document title
    Title,
    /// Bulleted or numbered list
    List,
    /// Table
    Table,
    /// Figure (chart, photo, diagram)
    Figure,
}

impl RegionCategory {
    /// Map a PubLayNet class id (`0..=4`) to a category.
    pub fn from_label_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::Text),
            1 => Some(Self::Title),
            2 => Some(Self::List),
            3 => Some(Self::Table),
            4 => Some(Self::Figure),
            _ => None,
        }
    }

    /// Name as printed by the detector.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Title => "Title",
            Self::List => "List",
            Self::Table => "Table",
            Self::Figure => "Figure",
        }
    }

    /// Figures and tables are the regions that receive headings and captions.
    pub fn is_visual(&self) -> bool {
        matches!(self, Self::Figure | Self::Table)
    }
}

impl fmt::Display for RegionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "title" => Ok(Self::Title),
            "list" => Ok(Self::List),
            "table" => Ok(Self::Table),
            "figure" => Ok(Self::Figure),
            other => Err(format!("unknown region category '{}'", other)),
        }
    }
}

/// A classified bounding box on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Region category
    pub category: RegionCategory,
    /// Bounding box in page pixels
    pub bbox: Rect,
    /// Detector confidence, when known
    pub score: Option<f32>,
}

impl Region {
    /// Create a region from `(left, top, right, bottom)` edges.
    pub fn new(category: RegionCategory, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            category,
            bbox: Rect::from_points(left, top, right, bottom),
            score: None,
        }
    }

    /// Attach a detector confidence.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }
}

/// All regions detected on one rendered page.
///
/// Regions share a single coordinate space; nothing is ever associated
/// across pages.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Zero-based page index within the document
    pub index: usize,
    /// Regions in detector order
    pub regions: Vec<Region>,
}

impl Page {
    /// Create a page from its regions.
    pub fn new(index: usize, regions: Vec<Region>) -> Self {
        Self { index, regions }
    }

    /// Regions of one category, in detector order.
    pub fn regions_of(&self, category: RegionCategory) -> impl Iterator<Item = &Region> + '_ {
        self.regions.iter().filter(move |r| r.category == category)
    }

    /// Text regions, the pool headings and captions are drawn from.
    pub fn text_regions(&self) -> Vec<&Region> {
        self.regions_of(RegionCategory::Text).collect()
    }
}
