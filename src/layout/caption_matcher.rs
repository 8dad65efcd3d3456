//! Heading and caption association for figure and table regions.
//!
//! Given a figure or table region and the text regions on the same page,
//! pick the text block most likely to be its heading (directly above) and
//! the one most likely to be its caption (directly below).
//!
//! A candidate qualifies when it
//! - lies entirely on the correct side of the target (touching edges allowed),
//! - is closer than `max_distance` to the facing edge of the target,
//! - is shorter than `max_height`, which keeps full paragraphs out.
//!
//! Among qualifying candidates the nearest one wins. On equal gaps the
//! candidate seen first is kept.
//!
//! The matcher is pure: it performs no I/O and never mutates regions.

use crate::layout::region::{Page, Region, RegionCategory};

/// Default maximum vertical gap, in pixels, between a target and its heading or caption.
pub const DEFAULT_MAX_DISTANCE: f32 = 200.0;

/// Default maximum height, in pixels, of a heading or caption block.
pub const DEFAULT_MAX_HEIGHT: f32 = 200.0;

/// Distance and height limits for one side of the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Candidates must be strictly closer than this to the target edge
    pub max_distance: f32,
    /// Candidates must be strictly shorter than this
    pub max_height: f32,
}

impl MatchThresholds {
    /// Create thresholds from a distance and height limit.
    pub fn new(max_distance: f32, max_height: f32) -> Self {
        Self {
            max_distance,
            max_height,
        }
    }

    fn admits(&self, gap: f32, height: f32) -> bool {
        gap < self.max_distance && height < self.max_height
    }
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE, DEFAULT_MAX_HEIGHT)
    }
}

/// Thresholds for heading (above) and caption (below) selection.
///
/// Passed explicitly to every call so concurrent callers can use different
/// limits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchConfig {
    /// Limits applied to heading candidates
    pub heading: MatchThresholds,
    /// Limits applied to caption candidates
    pub caption: MatchThresholds,
}

impl MatchConfig {
    /// Use the same limits on both sides.
    pub fn uniform(max_distance: f32, max_height: f32) -> Self {
        let thresholds = MatchThresholds::new(max_distance, max_height);
        Self {
            heading: thresholds,
            caption: thresholds,
        }
    }

    /// Override heading limits.
    pub fn with_heading(mut self, max_distance: f32, max_height: f32) -> Self {
        self.heading = MatchThresholds::new(max_distance, max_height);
        self
    }

    /// Override caption limits.
    pub fn with_caption(mut self, max_distance: f32, max_height: f32) -> Self {
        self.caption = MatchThresholds::new(max_distance, max_height);
        self
    }
}

/// Heading and caption selected for one target region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptionMatch<'a> {
    /// Nearest qualifying text block above the target
    pub heading: Option<&'a Region>,
    /// Nearest qualifying text block below the target
    pub caption: Option<&'a Region>,
}

impl CaptionMatch<'_> {
    /// True when neither side found a candidate.
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.caption.is_none()
    }
}

/// Match a target against candidates using the same limits on both sides.
///
/// # Examples
///
/// ```
/// use scholar_extract::layout::{match_region, Region, RegionCategory};
///
/// let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
/// let texts = vec![
///     Region::new(RegionCategory::Text, 0.0, 60.0, 50.0, 95.0),
///     Region::new(RegionCategory::Text, 0.0, 0.0, 50.0, 40.0),
/// ];
///
/// let found = match_region(&figure, &texts, 200.0, 200.0);
/// assert_eq!(found.heading, Some(&texts[0]));
/// assert_eq!(found.caption, None);
/// ```
pub fn match_region<'a, I>(
    target: &Region,
    candidates: I,
    max_distance: f32,
    max_height: f32,
) -> CaptionMatch<'a>
where
    I: IntoIterator<Item = &'a Region>,
{
    find_heading_and_caption(target, candidates, &MatchConfig::uniform(max_distance, max_height))
}

/// Select the nearest qualifying heading and caption for `target`.
///
/// Candidates with malformed boxes (non-finite or inverted edges) are
/// skipped individually. A target whose own box is malformed gets no match.
pub fn find_heading_and_caption<'a, I>(
    target: &Region,
    candidates: I,
    config: &MatchConfig,
) -> CaptionMatch<'a>
where
    I: IntoIterator<Item = &'a Region>,
{
    let mut result = CaptionMatch::default();
    if !target.bbox.is_well_formed() {
        log::debug!("Skipping {} region with malformed bounds {:?}", target.category, target.bbox);
        return result;
    }

    let mut heading_gap = f32::INFINITY;
    let mut caption_gap = f32::INFINITY;

    for candidate in candidates {
        let bbox = &candidate.bbox;
        if !bbox.is_well_formed() {
            log::debug!("Ignoring candidate with malformed bounds {:?}", bbox);
            continue;
        }
        let height = bbox.height();

        if bbox.is_above(&target.bbox) {
            let gap = bbox.gap_above(&target.bbox);
            // Strict comparison keeps the earliest candidate on ties
            if config.heading.admits(gap, height) && gap < heading_gap {
                heading_gap = gap;
                result.heading = Some(candidate);
            }
        }

        if bbox.is_below(&target.bbox) {
            let gap = bbox.gap_below(&target.bbox);
            if config.caption.admits(gap, height) && gap < caption_gap {
                caption_gap = gap;
                result.caption = Some(candidate);
            }
        }
    }

    result
}

/// Association result for one figure or table on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMatch<'a> {
    /// The figure or table region
    pub target: &'a Region,
    /// Position of the target among regions of its category on the page
    pub ordinal: usize,
    /// Selected heading and caption
    pub matched: CaptionMatch<'a>,
}

/// Match every figure, then every table, on a page against its text regions.
///
/// Figures and tables are returned in detector order, figures first.
pub fn match_page<'a>(page: &'a Page, config: &MatchConfig) -> Vec<RegionMatch<'a>> {
    let texts = page.text_regions();
    let mut matches = Vec::new();

    for category in [RegionCategory::Figure, RegionCategory::Table] {
        for (ordinal, target) in page.regions_of(category).enumerate() {
            let matched = find_heading_and_caption(target, texts.iter().copied(), config);
            matches.push(RegionMatch {
                target,
                ordinal,
                matched,
            });
        }
    }

    log::debug!(
        "Page {}: matched {} figure/table regions against {} text regions",
        page.index,
        matches.len(),
        texts.len()
    );
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(l: f32, t: f32, r: f32, b: f32) -> Region {
        Region::new(RegionCategory::Text, l, t, r, b)
    }

    #[test]
    fn test_nearest_heading_wins() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let a = text(0.0, 60.0, 50.0, 95.0);
        let b = text(0.0, 0.0, 50.0, 40.0);
        let candidates = vec![b.clone(), a.clone()];

        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.heading, Some(&candidates[1]));
        assert!(found.caption.is_none());
    }

    #[test]
    fn test_tall_caption_excluded() {
        let table = Region::new(RegionCategory::Table, 0.0, 100.0, 50.0, 150.0);
        let c = text(0.0, 155.0, 50.0, 600.0);
        let candidates = [c];

        let found = match_region(&table, &candidates, 200.0, 200.0);
        assert!(found.caption.is_none());
        assert!(found.heading.is_none());
    }

    #[test]
    fn test_empty_candidates() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let found = match_region(&figure, &[], 200.0, 200.0);
        assert!(found.is_empty());
    }

    #[test]
    fn test_nearest_of_three_captions() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![
            text(0.0, 300.0, 50.0, 320.0), // gap 150
            text(0.0, 160.0, 50.0, 180.0), // gap 10
            text(0.0, 200.0, 50.0, 220.0), // gap 50
        ];
        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.caption, Some(&candidates[1]));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![text(0.0, 70.0, 20.0, 90.0), text(30.0, 75.0, 50.0, 90.0)];
        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.heading, Some(&candidates[0]));
    }

    #[test]
    fn test_distance_limit_is_exclusive() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 300.0, 50.0, 350.0);
        let exactly_at_limit = text(0.0, 50.0, 50.0, 100.0); // gap 200
        let found = match_region(&figure, std::slice::from_ref(&exactly_at_limit), 200.0, 200.0);
        assert!(found.heading.is_none());

        let found = match_region(&figure, std::slice::from_ref(&exactly_at_limit), 201.0, 200.0);
        assert!(found.heading.is_some());
    }

    #[test]
    fn test_touching_edges_qualify() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![text(0.0, 80.0, 50.0, 100.0), text(0.0, 150.0, 50.0, 170.0)];
        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.heading, Some(&candidates[0]));
        assert_eq!(found.caption, Some(&candidates[1]));
    }

    #[test]
    fn test_overlapping_candidate_ignored() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![text(0.0, 90.0, 50.0, 110.0)];
        assert!(match_region(&figure, &candidates, 200.0, 200.0).is_empty());
    }

    #[test]
    fn test_zero_height_candidate_is_valid() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![text(0.0, 90.0, 50.0, 90.0)];
        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.heading, Some(&candidates[0]));

        // Height limit still applies, even to degenerate boxes
        let found = match_region(&figure, &candidates, 200.0, 0.0);
        assert!(found.heading.is_none());
    }

    #[test]
    fn test_malformed_candidate_skipped() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![
            text(0.0, f32::NAN, 50.0, 95.0),
            text(0.0, 95.0, 50.0, 60.0),
            text(0.0, 40.0, 50.0, 70.0),
        ];
        let found = match_region(&figure, &candidates, 200.0, 200.0);
        assert_eq!(found.heading, Some(&candidates[2]));
    }

    #[test]
    fn test_separate_heading_and_caption_limits() {
        let figure = Region::new(RegionCategory::Figure, 0.0, 100.0, 50.0, 150.0);
        let candidates = vec![text(0.0, 40.0, 50.0, 60.0), text(0.0, 190.0, 50.0, 210.0)];
        let config = MatchConfig::default().with_heading(30.0, 200.0).with_caption(50.0, 200.0);

        let found = find_heading_and_caption(&figure, &candidates, &config);
        assert!(found.heading.is_none(), "heading gap 40 exceeds limit 30");
        assert_eq!(found.caption, Some(&candidates[1]));
    }

    #[test]
    fn test_match_page_orders_figures_then_tables() {
        let page = Page::new(
            2,
            vec![
                Region::new(RegionCategory::Table, 0.0, 500.0, 100.0, 600.0),
                Region::new(RegionCategory::Text, 0.0, 610.0, 100.0, 630.0),
                Region::new(RegionCategory::Figure, 0.0, 100.0, 100.0, 200.0),
                Region::new(RegionCategory::Title, 0.0, 60.0, 100.0, 90.0),
                Region::new(RegionCategory::Figure, 0.0, 300.0, 100.0, 400.0),
            ],
        );

        let matches = match_page(&page, &MatchConfig::default());
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].target.category, RegionCategory::Figure);
        assert_eq!(matches[0].ordinal, 0);
        assert_eq!(matches[1].target.category, RegionCategory::Figure);
        assert_eq!(matches[1].ordinal, 1);
        assert_eq!(matches[2].target.category, RegionCategory::Table);
        assert_eq!(matches[2].ordinal, 0);

        // Title blocks are never candidates
        assert!(matches[0].matched.heading.is_none());
        assert_eq!(matches[2].matched.caption, Some(&page.regions[1]));
    }

    #[test]
    fn test_page_without_text_yields_empty_matches() {
        let page = Page::new(
            0,
            vec![
                Region::new(RegionCategory::Figure, 0.0, 100.0, 100.0, 200.0),
                Region::new(RegionCategory::Table, 0.0, 300.0, 100.0, 400.0),
            ],
        );
        let matches = match_page(&page, &MatchConfig::default());
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.matched.is_empty()));
    }
}
