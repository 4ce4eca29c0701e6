//! OCR engine abstraction.
//!
//! The runtime treats recognition as a black box: image file in, text out.
//! [`TesseractEngine`] is the production implementation; tests substitute
//! their own [`OcrEngine`] fakes.

use std::path::Path;

use thiserror::Error;

mod tesseract;

pub use tesseract::TesseractEngine;

/// Failure inside a recognition call.
///
/// The display form is what ends up in a job's domain-level error payload,
/// so it carries the full cause description.
#[derive(Debug, Clone, Error)]
#[error("OCR processing failed: {message}")]
pub struct OcrError {
    pub message: String,
}

impl OcrError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A black-box OCR backend.
///
/// Implementations are synchronous; async callers run them under
/// `spawn_blocking`.  Recognition may take minutes for large images and may
/// legitimately return an empty string, never a missing one.
pub trait OcrEngine: Send + Sync {
    /// Short human-readable engine name (e.g. for health reporting).
    fn name(&self) -> &str;

    /// Recognize text in the image at `path`.
    ///
    /// `languages` is an engine-specific language spec such as `"rus+eng"`.
    fn recognize(&self, path: &Path, languages: &str) -> Result<String, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_carries_the_cause() {
        let err = OcrError::new("binary exited with signal 9");
        assert_eq!(
            err.to_string(),
            "OCR processing failed: binary exited with signal 9"
        );
    }
}
