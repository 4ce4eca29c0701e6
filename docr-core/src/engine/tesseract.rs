//! Tesseract CLI engine.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::engine::{OcrEngine, OcrError};

/// Shells out to the `tesseract` binary (`tesseract <image> stdout -l <langs>`).
///
/// The binary name/path is configurable so deployments can pin a specific
/// build without touching `PATH`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "Tesseract"
    }

    fn recognize(&self, path: &Path, languages: &str) -> Result<String, OcrError> {
        let bytes = std::fs::read(path)
            .map_err(|e| OcrError::new(format!("cannot read {}: {e}", path.display())))?;
        // Header sniff first; tesseract's stderr on undecodable input is
        // unhelpful to callers.
        image::guess_format(&bytes)
            .map_err(|e| OcrError::new(format!("unsupported image data: {e}")))?;

        debug!(path = %path.display(), languages, "invoking tesseract");
        let output = Command::new(&self.binary)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .output()
            .map_err(|e| OcrError::new(format!("failed to launch {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::new(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.trim_end().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("docr_engine_{}_{}", std::process::id(), name));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn undecodable_input_is_rejected_before_launch() {
        let path = scratch_file("garbage.png", b"definitely not an image");
        let engine = TesseractEngine::default();
        let err = engine.recognize(&path, "eng").unwrap_err();
        assert!(
            err.message.contains("unsupported image data"),
            "got: {}",
            err.message
        );
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_engine_error() {
        let engine = TesseractEngine::default();
        let err = engine
            .recognize(Path::new("/nonexistent/docr_missing.png"), "eng")
            .unwrap_err();
        assert!(err.message.contains("cannot read"), "got: {}", err.message);
    }
}
