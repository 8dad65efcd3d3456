//! Text recognition for cropped heading and caption regions.

use crate::error::{Error, Result};
use crate::imaging::save_png;
use image::DynamicImage;
use std::path::Path;
use std::process::Command;

/// Recognizes the text in an image crop.
pub trait TextRecognizer {
    /// Return the recognized text; an empty string is a valid result.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Recognizer backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
    language: String,
    page_segmentation_mode: Option<u8>,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: "eng".to_string(),
            page_segmentation_mode: None,
        }
    }
}

impl TesseractRecognizer {
    /// Create a recognizer using `tesseract` from `PATH` and English.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different tesseract binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Tesseract language code, e.g. `eng+deu`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Tesseract `--psm` value.
    pub fn with_page_segmentation_mode(mut self, psm: u8) -> Self {
        self.page_segmentation_mode = Some(psm);
        self
    }

    /// True when the binary can be executed.
    pub fn is_available(&self) -> bool {
        let ok = Command::new(&self.program).arg("--version").output().is_ok();
        if !ok {
            log::debug!("{} not found - install tesseract-ocr for OCR support", self.program);
        }
        ok
    }

    fn arguments(&self, input: &Path) -> Vec<String> {
        let mut args = vec![
            input.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(psm) = self.page_segmentation_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("crop.png");
        save_png(image, &input)?;

        let output = Command::new(&self.program)
            .args(self.arguments(&input))
            .output().map_err(|e| Error::Command {
            program: "tesseract",
            message: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(Error::Command {
                program: "tesseract",
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_reports_command_error() {
        let recognizer = TesseractRecognizer::new().with_program("tesseract-binary-that-does-not-exist");
        assert!(!recognizer.is_available());

        let image = DynamicImage::new_rgb8(4, 4);
        let err = recognizer.recognize(&image).unwrap_err();
        assert!(matches!(err, Error::Command { program: "tesseract", .. }));
    }

    #[test]
    fn test_arguments() {
        let input = Path::new("/tmp/crop.png");
        assert_eq!(TesseractRecognizer::new().arguments(input), vec!["/tmp/crop.png", "stdout", "-l", "eng"]);

        let tuned = TesseractRecognizer::new()
            .with_language("eng+deu")
            .with_page_segmentation_mode(6);
        assert_eq!(
            tuned.arguments(input),
            vec!["/tmp/crop.png", "stdout", "-l", "eng+deu", "--psm", "6"]
        );
    }
}
