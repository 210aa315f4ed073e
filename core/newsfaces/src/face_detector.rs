use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::Error;

/// Bounding box of a detected face, in page pixel coordinates.
///
/// Coordinates are signed because detectors may report a box that
/// overhangs the page edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl FaceBox {
    /// Build a box from a detector's `(x, y, width, height)` output.
    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width as i32,
            bottom: y + height as i32,
        }
    }

    /// Width in pixels; zero for a degenerate box.
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// Height in pixels; zero for a degenerate box.
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
}

/// Failure reported by a [`FaceDetector`].
///
/// The input-shape variants describe pages the detector cannot scan; the
/// locator treats them as "no faces". [`DetectionError::Backend`] is a
/// genuine engine failure and is propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// The page has no pixels.
    #[error("image has zero width or height")]
    EmptyImage,

    /// The page is smaller than the smallest face the detector scans for.
    #[error("image {width}x{height} is smaller than the {min_size}px detection window")]
    ImageTooSmall {
        /// Page width in pixels.
        width: u32,
        /// Page height in pixels.
        height: u32,
        /// Detection window edge in pixels.
        min_size: u32,
    },

    /// The grayscale buffer does not hold `width * height` bytes.
    #[error("grayscale buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// `width * height`.
        expected: usize,
        /// Length of the buffer handed over.
        actual: usize,
    },

    /// The detection engine itself failed.
    #[error("{0}")]
    Backend(String),
}

impl DetectionError {
    /// Whether this failure stems from malformed input and degrades to an
    /// empty result.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, DetectionError::Backend(_))
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to plug in another engine (an OpenCV cascade, an
/// ONNX model) and pass it to [`crate::FaceSearch::new`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceBox>, DetectionError>;
}

/// Check the shape of a grayscale buffer before handing it to a backend.
pub fn validate_input(gray: &[u8], width: u32, height: u32) -> Result<(), DetectionError> {
    if width == 0 || height == 0 {
        return Err(DetectionError::EmptyImage);
    }
    let expected = width as usize * height as usize;
    if gray.len() != expected {
        return Err(DetectionError::BufferSize {
            expected,
            actual: gray.len(),
        });
    }
    Ok(())
}

/// Runs a [`FaceDetector`] over whole pages and applies the degrade policy.
pub struct FaceLocator<'a> {
    detector: &'a dyn FaceDetector,
}

impl<'a> FaceLocator<'a> {
    /// Wrap a detector.
    pub fn new(detector: &'a dyn FaceDetector) -> Self {
        Self { detector }
    }

    /// Locate faces on a page.
    ///
    /// Malformed-input failures yield an empty list; backend failures are
    /// returned as [`Error::Detection`].
    pub fn locate(&self, page: &DynamicImage) -> Result<Vec<FaceBox>, Error> {
        let gray = image::imageops::grayscale(page);
        let (width, height) = (gray.width(), gray.height());

        match self.detector.detect(gray.as_raw(), width, height) {
            Ok(faces) => {
                debug!(faces = faces.len(), width, height, "face detection finished");
                Ok(faces)
            }
            Err(e) if e.is_malformed_input() => {
                warn!(error = %e, "face detection skipped, treating page as faceless");
                Ok(Vec::new())
            }
            Err(e) => Err(Error::Detection(e)),
        }
    }
}
