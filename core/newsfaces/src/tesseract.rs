use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use image::codecs::png::PngEncoder;
use image::{GrayImage, ImageEncoder};
use tracing::debug;

use crate::error::Error;
use crate::text_match::TextRecognizer;

/// OCR backend that pipes pages through the `tesseract` executable.
///
/// Runs `tesseract stdin stdout -l <language> [--psm <mode>]` once per page.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
    page_segmentation: Option<u8>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractCli {
    /// `tesseract` from `PATH`, English, default page segmentation.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_segmentation: None,
        }
    }

    /// Path to the tesseract executable (default: `tesseract` on `PATH`).
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Traineddata language code (default: `eng`).
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Page segmentation mode passed as `--psm` (default: tesseract's own).
    pub fn page_segmentation(mut self, mode: u8) -> Self {
        self.page_segmentation = Some(mode);
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(mode) = self.page_segmentation {
            command.arg("--psm").arg(mode.to_string());
        }
        command
    }
}

fn encode_png(page: &GrayImage) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            page.as_raw(),
            page.width(),
            page.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(buffer)
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, page: &GrayImage) -> Result<String, Error> {
        let png = encode_png(page)?;

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Ocr(format!("failed to run {}: {e}", self.binary.display())))?;

        // tesseract reads all of stdin before it writes, so a plain write is safe
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Ocr(format!("failed to wait for tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| Error::Ocr(format!("failed to send page to tesseract: {e}")))?;

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = png.len(), chars = text.len(), "tesseract finished");
        Ok(text)
    }
}
