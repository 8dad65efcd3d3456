//! Layout region classification.
//!
//! The detector itself (a PubLayNet-trained model) runs outside this crate.
//! [`RemoteLayoutClassifier`] posts a rendered page to an HTTP endpoint and
//! converts the returned detections into [`Region`]s.

use crate::error::{Error, Result};
use crate::imaging::encode_png;
use crate::layout::region::{Region, RegionCategory};
use image::DynamicImage;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// Default detector confidence cut-off.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.8;

/// Produces typed regions for a rendered page image.
pub trait LayoutClassifier {
    /// Detect layout regions on `page`.
    fn detect(&self, page: &DynamicImage) -> Result<Vec<Region>>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Name(String),
    Id(u32),
}

impl Label {
    fn category(&self) -> Option<RegionCategory> {
        match self {
            Label::Name(name) => name.parse().ok(),
            Label::Id(id) => RegionCategory::from_label_id(*id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Detection {
    #[serde(rename = "type", alias = "label")]
    label: Label,
    #[serde(default)]
    score: Option<f32>,
    coordinates: Vec<f32>,
}

/// Convert raw detector output into regions.
///
/// Detections below `score_threshold`, with an unknown label, or with
/// missing/malformed coordinates are dropped one by one; the rest of the
/// page is kept.
pub fn regions_from_detections(raw: &[serde_json::Value], score_threshold: f32) -> Vec<Region> {
    let mut regions = Vec::with_capacity(raw.len());
    for (i, value) in raw.iter().enumerate() {
        let detection: Detection = match serde_json::from_value(value.clone()) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Skipping detection {}: {}", i, e);
                continue;
            },
        };

        let Some(category) = detection.label.category() else {
            log::debug!("Skipping detection {} with unknown label {:?}", i, detection.label);
            continue;
        };

        if let Some(score) = detection.score {
            if score < score_threshold {
                continue;
            }
        }

        let [left, top, right, bottom] = match detection.coordinates.as_slice() {
            &[l, t, r, b] => [l, t, r, b],
            other => {
                log::warn!("Skipping detection {}: expected 4 coordinates, got {}", i, other.len());
                continue;
            },
        };

        let mut region = Region::new(category, left, top, right, bottom);
        if !region.bbox.is_well_formed() {
            log::warn!("Skipping detection {}: malformed bounds {:?}", i, region.bbox);
            continue;
        }
        region.score = detection.score;
        regions.push(region);
    }
    regions
}

/// Layout classifier served over HTTP.
///
/// The endpoint receives the page as a multipart `image` field (PNG) and
/// answers with a JSON array of `{type, score, coordinates: [x1, y1, x2, y2]}`.
pub struct RemoteLayoutClassifier {
    client: reqwest::blocking::Client,
    endpoint: String,
    score_threshold: f32,
}

impl RemoteLayoutClassifier {
    /// Create a classifier for the given detection endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        })
    }

    /// Override the confidence cut-off.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }
}

impl LayoutClassifier for RemoteLayoutClassifier {
    fn detect(&self, page: &DynamicImage) -> Result<Vec<Region>> {
        let png = encode_png(page)?;
        let part = Part::bytes(png).file_name("page.png").mime_str("image/png")?;
        let form = Form::new().part("image", part);

        let response = self.client.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ServiceStatus {
                service: "layout detector",
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let raw: Vec<serde_json::Value> = response.json()?;
        let regions = regions_from_detections(&raw, self.score_threshold);
        log::debug!("Layout detector kept {}/{} detections", regions.len(), raw.len());
        Ok(regions)
    }
}
