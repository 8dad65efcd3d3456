//! Fetching source PDFs.

use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Outcome of [`download_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The file was fetched and written
    Downloaded,
    /// The destination already existed; nothing was fetched
    AlreadyPresent,
}

/// Download `url` to `destination` unless the file already exists.
///
/// `doc_dir`, when given, is created first. The destination's parent
/// directory is always created.
pub fn download_file(url: &str, destination: &Path, doc_dir: Option<&Path>) -> Result<DownloadStatus> {
    if let Some(dir) = doc_dir {
        std::fs::create_dir_all(dir)?;
        log::info!("Created/verified document directory: {}", dir.display());
    }

    if destination.exists() {
        log::info!("File already exists at {}, skipping download", destination.display());
        return Ok(DownloadStatus::AlreadyPresent);
    }

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::info!("Downloading file from {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ServiceStatus {
            service: "PDF download",
            status: status.as_u16(),
            body: url.to_string(),
        });
    }

    let bytes = response.bytes()?;
    std::fs::write(destination, &bytes)?;
    log::info!("File downloaded successfully to {}", destination.display());
    Ok(DownloadStatus::Downloaded)
}

/// File name component of a URL path, without query or fragment.
///
/// # Examples
///
/// ```
/// use scholar_extract::services::download::file_name_from_url;
///
/// assert_eq!(file_name_from_url("https://x.org/papers/attn.pdf?dl=1"), Some("attn.pdf"));
/// assert_eq!(file_name_from_url("https://x.org/"), None);
/// ```
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
