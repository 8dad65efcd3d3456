//! Configuration for the extraction pipelines.

use crate::error::{Error, Result};
use crate::layout::caption_matcher::MatchConfig;
use crate::layout::classifier::DEFAULT_SCORE_THRESHOLD;
use crate::layout::image_selection::ImageSelectionPolicy;
use crate::services::grobid::DEFAULT_GROBID_URL;
use crate::services::render::DEFAULT_DPI;
use crate::services::store::StoreTables;
use crate::tei::figures::FigureKindFallback;
use std::path::PathBuf;

/// Default storage bucket for figure crops.
pub const DEFAULT_BUCKET: &str = "figure-images";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Page rendering resolution.
    pub dpi: u32,

    /// Heading and caption thresholds.
    pub matching: MatchConfig,

    /// Layout detector confidence cut-off.
    pub score_threshold: f32,

    /// Storage bucket for figure crops.
    pub bucket: String,

    /// Directory downloaded PDFs are kept under (one subdirectory per paper).
    pub documents_dir: PathBuf,

    /// Directory local figure crops are written to.
    pub output_dir: PathBuf,

    /// GROBID base URL.
    pub grobid_url: String,

    /// Layout detection endpoint.
    pub layout_url: Option<String>,

    /// Supabase project URL.
    pub supabase_url: Option<String>,

    /// Supabase API key.
    pub supabase_key: Option<String>,

    /// Figure kind for TEI figures without a graphic.
    pub figure_fallback: FigureKindFallback,

    /// Image association policy for TEI figures.
    pub image_policy: ImageSelectionPolicy,

    /// Store table names.
    pub tables: StoreTables,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            matching: MatchConfig::default(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            bucket: DEFAULT_BUCKET.to_string(),
            documents_dir: PathBuf::from("./documents"),
            output_dir: PathBuf::from("output"),
            grobid_url: DEFAULT_GROBID_URL.to_string(),
            layout_url: None,
            supabase_url: None,
            supabase_key: None,
            figure_fallback: FigureKindFallback::default(),
            image_policy: ImageSelectionPolicy::default(),
            tables: StoreTables::default(),
        }
    }

    /// Defaults overridden by `SUPABASE_URL`, `SUPABASE_KEY`, `GROBID_URL`
    /// and `LAYOUT_URL` where set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::new();
        config.supabase_url = get("SUPABASE_URL");
        config.supabase_key = get("SUPABASE_KEY");
        config.layout_url = get("LAYOUT_URL");
        if let Some(url) = get("GROBID_URL") {
            config.grobid_url = url;
        }
        config
    }

    /// Set rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set matching thresholds.
    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    /// Set detector confidence cut-off.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set storage bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the documents directory.
    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = dir.into();
        self
    }

    /// Set the crop output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set GROBID base URL.
    pub fn with_grobid_url(mut self, url: impl Into<String>) -> Self {
        self.grobid_url = url.into();
        self
    }

    /// Set layout detection endpoint.
    pub fn with_layout_url(mut self, url: impl Into<String>) -> Self {
        self.layout_url = Some(url.into());
        self
    }

    /// Set Supabase credentials.
    pub fn with_supabase(mut self, url: impl Into<String>, key: impl Into<String>) -> Self {
        self.supabase_url = Some(url.into());
        self.supabase_key = Some(key.into());
        self
    }

    /// Set the figure kind fallback.
    pub fn with_figure_fallback(mut self, fallback: FigureKindFallback) -> Self {
        self.figure_fallback = fallback;
        self
    }

    /// Set the image association policy.
    pub fn with_image_policy(mut self, policy: ImageSelectionPolicy) -> Self {
        self.image_policy = policy;
        self
    }

    /// Set store table names.
    pub fn with_tables(mut self, tables: StoreTables) -> Self {
        self.tables = tables;
        self
    }

    /// Supabase URL and key, or the name of the missing setting.
    pub fn supabase_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or(Error::MissingConfig("SUPABASE_URL"))?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or(Error::MissingConfig("SUPABASE_KEY"))?;
        Ok((url, key))
    }

    /// Layout endpoint, or an error naming the missing setting.
    pub fn layout_endpoint(&self) -> Result<&str> {
        self.layout_url
            .as_deref()
            .ok_or(Error::MissingConfig("LAYOUT_URL"))
    }
}
