use thiserror::Error;

use crate::face_detector::DetectionError;

/// Errors returned by newsfaces operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a file from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive is not a readable zip file.
    #[error("failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry is not a decodable raster image.
    #[error("failed to decode archive entry {entry}: {reason}")]
    Decode {
        /// Name of the offending entry.
        entry: String,
        /// Decoder message.
        reason: String,
    },

    /// The face detection model could not be loaded.
    #[error("failed to load face model: {0}")]
    ModelLoad(String),

    /// The OCR engine failed on a page.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The face detector failed for a reason other than malformed input.
    #[error("face detection failed: {0}")]
    Detection(DetectionError),

    /// A contact sheet was requested for an empty face list.
    #[error("cannot compose a contact sheet from zero faces")]
    EmptyFaceList,

    /// The sheet layout has a zero cell size or column count.
    #[error("sheet layout needs a nonzero cell size and column count")]
    InvalidLayout,

    /// Encoding or writing an image failed.
    #[error("failed to encode image: {0}")]
    Encode(String),
}
