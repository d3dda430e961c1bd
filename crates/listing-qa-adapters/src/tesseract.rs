//! Tesseract OCR adapter.
//!
//! Runs the `tesseract` command line tool on a temporary PNG and reads the
//! recognized text from its standard output.

use std::io::ErrorKind;
use std::process::Command;

use image::{GrayImage, ImageFormat};
use listing_qa_core::{PipelineError, TextRecognizer};
use tracing::{debug, trace};

/// Default executable name.
pub const DEFAULT_COMMAND: &str = "tesseract";
/// Default recognition language.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// OCR engine backed by the Tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: String,
    language: String,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_LANGUAGE)
    }
}

impl TesseractRecognizer {
    /// Creates a recognizer running `command` with language `language`.
    #[must_use]
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Returns the configured executable.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Checks that the executable can be started.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn run(&self, image: &GrayImage) -> Result<String, PipelineError> {
        let file = tempfile::Builder::new()
            .prefix("listing-qa-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| PipelineError::TextExtraction(format!("cannot create temp file: {e}")))?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| PipelineError::TextExtraction(format!("cannot write temp image: {e}")))?;

        trace!("Running {} on {}", self.command, file.path().display());
        let output = Command::new(&self.command)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    PipelineError::TextExtraction(format!(
                        "{} not found; install Tesseract or set ocr.command",
                        self.command
                    ))
                } else {
                    PipelineError::TextExtraction(format!("cannot run {}: {e}", self.command))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::TextExtraction(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        &self.command
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, PipelineError> {
        let text = self.run(image)?;
        debug!("{} returned {} bytes", self.command, text.len());
        Ok(text)
    }
}
