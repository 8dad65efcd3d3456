//! GROBID document conversion client.

use crate::error::{Error, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;

/// Default GROBID base URL.
pub const DEFAULT_GROBID_URL: &str = "http://localhost:8070";

/// Elements GROBID annotates with page coordinates.
const TEI_COORDINATES: [&str; 4] = ["ref", "figure", "head", "p"];

/// Converts a PDF into TEI XML.
pub trait DocumentConverter {
    /// Convert the PDF at `pdf` and return the TEI document as text.
    fn convert(&self, pdf: &Path) -> Result<String>;
}

/// Client for a GROBID server's `processFulltextDocument` service.
pub struct GrobidClient {
    client: reqwest::blocking::Client,
    base_url: String,
    consolidate_citations: bool,
}

impl GrobidClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consolidate_citations: true,
        })
    }

    /// Enable or disable citation consolidation.
    pub fn with_consolidate_citations(mut self, enable: bool) -> Self {
        self.consolidate_citations = enable;
        self
    }

    /// Check the server's liveness endpoint.
    pub fn is_alive(&self) -> bool {
        let url = format!("{}/api/isalive", self.base_url);
        match self.client.get(&url).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::debug!("GROBID liveness check failed: {}", e);
                false
            },
        }
    }

    fn consolidate_flag(&self) -> &'static str {
        if self.consolidate_citations {
            "1"
        } else {
            "0"
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/processFulltextDocument", self.base_url)
    }
}

impl DocumentConverter for GrobidClient {
    fn convert(&self, pdf: &Path) -> Result<String> {
        let bytes = std::fs::read(pdf)?;
        let file_name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let mut form = Form::new()
            .part("input", part)
            .text("consolidateCitations", self.consolidate_flag());
        for element in TEI_COORDINATES {
            form = form.text("teiCoordinates", element);
        }

        log::info!("Converting {} with GROBID", pdf.display());
        let response = self.client.post(self.endpoint()).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::ServiceStatus {
                service: "GROBID",
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Err(Error::Xml(format!("GROBID returned an empty document for {}", pdf.display())));
        }
        Ok(body)
    }
}
