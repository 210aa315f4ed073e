use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::error::Error;
use crate::face_detector::{validate_input, DetectionError, FaceBox, FaceDetector};

/// Fixed detection parameters, held constant for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    /// Step between pyramid levels, as a cascade's `scaleFactor` (> 1.0).
    pub scale_factor: f32,
    /// Smallest face edge in pixels the detector scans for.
    pub min_face_size: u32,
    /// Minimum classifier score for a window to count as a face.
    pub score_thresh: f64,
    /// Horizontal and vertical sliding-window step in pixels.
    pub window_step: u32,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.3,
            min_face_size: 20,
            score_thresh: 2.0,
            window_step: 4,
        }
    }
}

impl CascadeParams {
    /// The scale factor as rustface expects it: a shrink ratio in (0, 1).
    fn pyramid_scale_factor(&self) -> f32 {
        1.0 / self.scale_factor
    }
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The frontal-face model is read from disk once, on construction.
pub struct RustfaceDetector {
    model: rustface::Model,
    params: CascadeParams,
}

impl RustfaceDetector {
    /// Load the SeetaFace model at `path` with the given parameters.
    pub fn from_path(path: impl AsRef<Path>, params: CascadeParams) -> Result<Self, Error> {
        let path = path.as_ref();
        if params.scale_factor <= 1.0 || params.window_step == 0 {
            return Err(Error::ModelLoad(format!(
                "invalid cascade parameters: {params:?}"
            )));
        }
        let file = File::open(path)
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;
        let model = rustface::read_model(BufReader::new(file))
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", path.display())))?;
        info!(model = %path.display(), "loaded face detection model");
        Ok(Self { model, params })
    }

    /// Detection parameters in use.
    pub fn params(&self) -> &CascadeParams {
        &self.params
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceBox>, DetectionError> {
        validate_input(gray, width, height)?;
        let min_size = self.params.min_face_size;
        if width < min_size || height < min_size {
            return Err(DetectionError::ImageTooSmall {
                width,
                height,
                min_size,
            });
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(min_size);
        detector.set_score_thresh(self.params.score_thresh);
        detector.set_pyramid_scale_factor(self.params.pyramid_scale_factor());
        detector.set_slide_window_step(self.params.window_step, self.params.window_step);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox::from_xywh(bbox.x(), bbox.y(), bbox.width(), bbox.height())
            })
            .collect())
    }
}
