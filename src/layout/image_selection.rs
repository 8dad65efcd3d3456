//! Associating TEI figure descriptions with detected image regions.
//!
//! A TEI figure only says which page it is on (and, with coordinates, roughly
//! where). The detected Figure/Table regions of that page are its candidate
//! images. Every candidate is exposed; the policy only decides which one is
//! reported as `selected`, and no policy guarantees the right pick.

use crate::layout::region::{Page, Region};
use crate::tei::figures::TeiFigure;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// How a single candidate image is picked for a TEI figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSelectionPolicy {
    /// First candidate for figures; second candidate (or the first when
    /// there is only one) for tables.
    FirstOnPage,
    /// Candidate with the largest overlap with the TEI coordinates, falling
    /// back to [`ImageSelectionPolicy::FirstOnPage`] without coordinates or
    /// overlap.
    #[default]
    BestOverlap,
}

/// Candidate images for one TEI figure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageCandidates<'a> {
    /// Figure and table regions on the figure's page, in detector order
    pub candidates: Vec<&'a Region>,
    /// Candidate chosen by the policy
    pub selected: Option<&'a Region>,
}

/// Collect candidate images on `page` for `figure` and pick one.
///
/// `page` must be the rendered page the figure lives on; `dpi` is the
/// resolution it was rendered at, used to bring TEI coordinates (PDF points)
/// into pixel space.
pub fn select_image<'a>(
    figure: &TeiFigure,
    page: &'a Page,
    dpi: u32,
    policy: ImageSelectionPolicy,
) -> ImageCandidates<'a> {
    let candidates: Vec<&Region> = page
        .regions
        .iter()
        .filter(|r| r.category.is_visual() && r.bbox.is_well_formed())
        .collect();

    let selected = match policy {
        ImageSelectionPolicy::FirstOnPage => first_on_page(figure, &candidates),
        ImageSelectionPolicy::BestOverlap => {
            best_overlap(figure, &candidates, dpi).or_else(|| first_on_page(figure, &candidates))
        },
    };

    ImageCandidates {
        candidates,
        selected,
    }
}

fn first_on_page<'a>(figure: &TeiFigure, candidates: &[&'a Region]) -> Option<&'a Region> {
    if figure.kind.is_table() {
        candidates.get(1).or_else(|| candidates.first()).copied()
    } else {
        candidates.first().copied()
    }
}

fn best_overlap<'a>(figure: &TeiFigure, candidates: &[&'a Region], dpi: u32) -> Option<&'a Region> {
    let bounds = figure
        .bounds_on_first_page()?
        .scale(dpi as f32 / POINTS_PER_INCH);

    let mut best: Option<(&Region, f32)> = None;
    for &candidate in candidates {
        let Some(overlap) = candidate.bbox.intersection(&bounds) else {
            continue;
        };
        let area = overlap.area();
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((candidate, area));
        }
    }
    best.map(|(region, _)| region)
}

/// A TEI figure paired with the candidate images of its page.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureAssociation<'a> {
    /// The TEI figure description
    pub figure: &'a TeiFigure,
    /// Index into the rendered pages, when the figure's page was rendered
    pub page_index: Option<usize>,
    /// Candidate images and the policy's pick
    pub images: ImageCandidates<'a>,
}

/// Associate every TEI figure with the detected images of its page.
///
/// TEI page numbers are one-based; `pages` are looked up by their `index`.
/// Figures without coordinates, or on a page that was not rendered, get no
/// candidates.
pub fn associate_figures<'a>(
    figures: &'a [TeiFigure],
    pages: &'a [Page],
    dpi: u32,
    policy: ImageSelectionPolicy,
) -> Vec<FigureAssociation<'a>> {
    figures
        .iter()
        .map(|figure| {
            let page = figure
                .page()
                .and_then(|n| (n as usize).checked_sub(1))
                .and_then(|index| pages.iter().find(|p| p.index == index));
            match page {
                Some(page) => FigureAssociation {
                    figure,
                    page_index: Some(page.index),
                    images: select_image(figure, page, dpi, policy),
                },
                None => {
                    log::debug!("No rendered page for TEI figure {:?}", figure.xml_id);
                    FigureAssociation {
                        figure,
                        page_index: None,
                        images: ImageCandidates::default(),
                    }
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::region::RegionCategory;
    use crate::tei::figures::{parse_coords, FigureKind};

    fn tei_figure(kind: FigureKind, coords: &str) -> TeiFigure {
        TeiFigure {
            xml_id: None,
            kind,
            head: None,
            label: None,
            description: None,
            coords: parse_coords(coords),
        }
    }

    fn page() -> Page {
        Page::new(
            0,
            vec![
                Region::new(RegionCategory::Figure, 0.0, 0.0, 100.0, 100.0),
                Region::new(RegionCategory::Text, 0.0, 110.0, 100.0, 130.0),
                Region::new(RegionCategory::Table, 0.0, 300.0, 200.0, 500.0),
                Region::new(RegionCategory::Figure, 300.0, 300.0, 600.0, 600.0),
            ],
        )
    }

    #[test]
    fn test_candidates_exclude_text() {
        let page = page();
        let found = select_image(&tei_figure(FigureKind::BitmapFigure, ""), &page, 72, ImageSelectionPolicy::FirstOnPage);
        assert_eq!(found.candidates.len(), 3);
        assert!(found.candidates.iter().all(|r| r.category.is_visual()));
    }

    #[test]
    fn test_first_on_page_policy() {
        let page = page();
        let figure = select_image(&tei_figure(FigureKind::BitmapFigure, ""), &page, 72, ImageSelectionPolicy::FirstOnPage);
        assert_eq!(figure.selected, Some(&page.regions[0]));

        let table = select_image(&tei_figure(FigureKind::Table, ""), &page, 72, ImageSelectionPolicy::FirstOnPage);
        assert_eq!(table.selected, Some(&page.regions[2]));
    }

    #[test]
    fn test_table_with_single_candidate_takes_first() {
        let page = Page::new(0, vec![Region::new(RegionCategory::Table, 0.0, 0.0, 10.0, 10.0)]);
        let table = select_image(&tei_figure(FigureKind::Table, ""), &page, 72, ImageSelectionPolicy::FirstOnPage);
        assert_eq!(table.selected, Some(&page.regions[0]));
    }

    #[test]
    fn test_best_overlap_scales_points_to_pixels() {
        let page = page();
        // 72pt at 144 dpi → 144px: box (160,160)-(280,280) in points covers the last figure
        let figure = tei_figure(FigureKind::VectorFigure, "1,160,160,120,120");
        let found = select_image(&figure, &page, 144, ImageSelectionPolicy::BestOverlap);
        assert_eq!(found.selected, Some(&page.regions[3]));
    }

    #[test]
    fn test_best_overlap_falls_back_without_coords() {
        let page = page();
        let found = select_image(&tei_figure(FigureKind::BitmapFigure, ""), &page, 300, ImageSelectionPolicy::BestOverlap);
        assert_eq!(found.selected, Some(&page.regions[0]));
    }

    #[test]
    fn test_empty_page() {
        let page = Page::new(0, Vec::new());
        let found = select_image(&tei_figure(FigureKind::Table, "1,0,0,10,10"), &page, 300, ImageSelectionPolicy::BestOverlap);
        assert!(found.candidates.is_empty());
        assert!(found.selected.is_none());
    }

    #[test]
    fn test_associate_figures_by_page_number() {
        let pages = vec![Page::new(0, Vec::new()), page_with_index(1)];
        let figures = vec![
            tei_figure(FigureKind::BitmapFigure, "2,0,0,10,10"),
            tei_figure(FigureKind::Table, "7,0,0,10,10"),
            tei_figure(FigureKind::BitmapFigure, ""),
        ];
        let found = associate_figures(&figures, &pages, 72, ImageSelectionPolicy::FirstOnPage);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].page_index, Some(1));
        assert_eq!(found[0].images.candidates.len(), 3);
        assert_eq!(found[0].images.selected, Some(&pages[1].regions[0]));
        assert_eq!(found[1].page_index, None);
        assert!(found[2].images.selected.is_none());
    }

    fn page_with_index(index: usize) -> Page {
        let mut p = page();
        p.index = index;
        p
    }
}
