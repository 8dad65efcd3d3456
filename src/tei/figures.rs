//! Figure and table descriptions from TEI `<figure>` elements.
//!
//! GROBID emits one `<figure>` per figure or table with its heading, label,
//! description (`figDesc`) and, when coordinates were requested, the page
//! boxes it occupies. Tables carry `type="table"`; figures may carry a
//! `<graphic type="bitmap|vector">` child.

use crate::error::Result;
use crate::geometry::Rect;
use crate::tei::node::{parse_document, XmlElement};
use crate::text::cleanup::non_empty;
use std::fmt;

/// Classification of a TEI figure element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureKind {
    /// Raster figure
    BitmapFigure,
    /// Vector-drawn figure
    VectorFigure,
    /// Table
    Table,
}

impl FigureKind {
    /// Value of the `figure_type` column for this kind.
    pub fn figure_type(&self) -> &'static str {
        match self {
            Self::BitmapFigure | Self::VectorFigure => "figure",
            Self::Table => "table",
        }
    }

    /// True for tables.
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table)
    }
}

impl fmt::Display for FigureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BitmapFigure => f.write_str("bitmap figure"),
            Self::VectorFigure => f.write_str("vector figure"),
            Self::Table => f.write_str("table"),
        }
    }
}

/// Kind assigned to a non-table figure that has no `<graphic>` child, or
/// whose graphic type is not recognized.
///
/// GROBID omits the graphic element for figures it could not isolate; most
/// of those are raster images in practice, hence the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FigureKindFallback {
    /// Treat as [`FigureKind::BitmapFigure`]
    #[default]
    Bitmap,
    /// Treat as [`FigureKind::VectorFigure`]
    Vector,
}

impl FigureKindFallback {
    fn kind(&self) -> FigureKind {
        match self {
            Self::Bitmap => FigureKind::BitmapFigure,
            Self::Vector => FigureKind::VectorFigure,
        }
    }
}

/// A box on a PDF page, in PDF points with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// One-based page number
    pub page: u32,
    /// Box on that page
    pub rect: Rect,
}

/// A figure or table described in the TEI document.
#[derive(Debug, Clone, PartialEq)]
pub struct TeiFigure {
    /// `xml:id` of the element
    pub xml_id: Option<String>,
    /// Figure or table classification
    pub kind: FigureKind,
    /// Heading text (`<head>`)
    pub head: Option<String>,
    /// Label (`<label>`), e.g. "3"
    pub label: Option<String>,
    /// Description (`<figDesc>`)
    pub description: Option<String>,
    /// Page boxes from the `coords` attribute
    pub coords: Vec<PageBox>,
}

impl TeiFigure {
    /// Page the figure starts on, if coordinates are known.
    pub fn page(&self) -> Option<u32> {
        self.coords.first().map(|b| b.page)
    }

    /// Union of the boxes on the figure's first page.
    pub fn bounds_on_first_page(&self) -> Option<Rect> {
        let page = self.page()?;
        self.coords
            .iter()
            .filter(|b| b.page == page)
            .map(|b| b.rect)
            .reduce(|acc, r| {
                Rect::from_points(
                    acc.left.min(r.left),
                    acc.top.min(r.top),
                    acc.right.max(r.right),
                    acc.bottom.max(r.bottom),
                )
            })
    }
}

/// Parse a GROBID `coords` attribute: `page,x,y,w,h` entries separated by `;`.
///
/// Malformed entries are skipped.
///
/// # Examples
///
/// ```
/// use scholar_extract::tei::figures::parse_coords;
///
/// let boxes = parse_coords("3,72.0,100.5,200.0,50.0;bad;4,1,2,3,4");
/// assert_eq!(boxes.len(), 2);
/// assert_eq!(boxes[0].page, 3);
/// assert_eq!(boxes[0].rect.bottom, 150.5);
/// ```
pub fn parse_coords(coords: &str) -> Vec<PageBox> {
    coords
        .split(';')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split(',').map(str::trim).collect();
            if parts.len() != 5 {
                return None;
            }
            let page: u32 = parts[0].parse().ok()?;
            let mut values = [0f32; 4];
            for (slot, raw) in values.iter_mut().zip(&parts[1..]) {
                *slot = raw.parse().ok()?;
            }
            let [x, y, w, h] = values;
            let rect = Rect::new(x, y, w, h);
            if page == 0 || !rect.is_well_formed() {
                return None;
            }
            Some(PageBox { page, rect })
        })
        .collect()
}

/// Parse TEI text and extract its figures and tables.
pub fn extract_figures(tei_xml: &str, fallback: FigureKindFallback) -> Result<Vec<TeiFigure>> {
    let root = parse_document(tei_xml)?;
    Ok(figures_from_tree(&root, fallback))
}

/// Extract figures and tables from an already parsed TEI tree.
pub fn figures_from_tree(root: &XmlElement, fallback: FigureKindFallback) -> Vec<TeiFigure> {
    let scope = root.find("text").unwrap_or(root);
    scope
        .find_all("figure")
        .into_iter()
        .map(|figure| figure_from_element(figure, fallback))
        .collect()
}

fn figure_from_element(figure: &XmlElement, fallback: FigureKindFallback) -> TeiFigure {
    let xml_id = figure.attr("id").map(str::to_string);
    let kind = classify(figure, fallback, xml_id.as_deref());

    let mut coords = figure.attr("coords").map(parse_coords).unwrap_or_default();
    if coords.is_empty() {
        if let Some(graphic_coords) = figure.child("graphic").and_then(|g| g.attr("coords")) {
            coords = parse_coords(graphic_coords);
        }
    }

    TeiFigure {
        xml_id,
        kind,
        head: figure.child("head").and_then(|h| non_empty(&h.text())),
        label: figure.child("label").and_then(|l| non_empty(&l.text())),
        description: figure.child("figDesc").and_then(|d| non_empty(&d.text())),
        coords,
    }
}

fn classify(figure: &XmlElement, fallback: FigureKindFallback, xml_id: Option<&str>) -> FigureKind {
    if figure.attr("type") == Some("table") {
        return FigureKind::Table;
    }
    match figure.child("graphic").and_then(|g| g.attr("type")) {
        Some("bitmap") => FigureKind::BitmapFigure,
        Some("vector") => FigureKind::VectorFigure,
        other => {
            let kind = fallback.kind();
            log::debug!(
                "Figure {} has graphic type {:?}; classifying as {}",
                xml_id.unwrap_or("<no id>"),
                other,
                kind
            );
            kind
        },
    }
}
