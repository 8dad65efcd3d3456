//! Rasterizing PDF pages for layout detection.

use crate::error::{Error, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Renders every page of a PDF to an image.
pub trait PageRenderer {
    /// Render `pdf` at `dpi`, one image per page in page order.
    fn render(&self, pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Renderer backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    program: String,
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self {
            program: "pdftoppm".to_string(),
        }
    }
}

impl PdftoppmRenderer {
    /// Create a renderer using `pdftoppm` from `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different pdftoppm binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render(&self, pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");

        log::info!("Rendering {} at {} dpi", pdf.display(), dpi);
        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| Error::Command {
                program: "pdftoppm",
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Command {
                program: "pdftoppm",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let files = rendered_pages(dir.path())?;
        if files.is_empty() {
            return Err(Error::Command {
                program: "pdftoppm",
                message: "no pages rendered".to_string(),
            });
        }

        let mut pages = Vec::with_capacity(files.len());
        for file in files {
            pages.push(image::open(&file)?);
        }
        log::info!("Rendered {} pages", pages.len());
        Ok(pages)
    }
}

/// PNG files written by pdftoppm, ordered by page number.
///
/// pdftoppm zero-pads page numbers to the width of the page count
/// (`page-01.png`..`page-12.png`), but ordering numerically keeps this
/// correct regardless of padding.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.rsplit('-').next())
            .and_then(|n| n.parse().ok());
        if let Some(number) = number {
            numbered.push((number, path));
        }
    }
    numbered.sort_by_key(|(n, _)| *n);
    Ok(numbered.into_iter().map(|(_, p)| p).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_pages_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-2.png", "page-1.png", "notes.txt", "page-x.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pages = rendered_pages(dir.path()).unwrap();
        let names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page-1.png", "page-2.png", "page-10.png"]);
    }

    #[test]
    fn test_missing_binary_reports_command_error() {
        let renderer = PdftoppmRenderer::new().with_program("pdftoppm-binary-that-does-not-exist");
        let err = renderer.render(Path::new("paper.pdf"), DEFAULT_DPI).unwrap_err();
        assert!(matches!(err, Error::Command { program: "pdftoppm", .. }));
    }
}
