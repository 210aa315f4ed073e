//! Keyword and face search over archives of scanned newspaper pages.
//!
//! Each page is binarized and run through OCR; pages whose text contains
//! the keyword (case-insensitively) are scanned for faces, and the faces
//! are cropped and tiled into a contact sheet.
//!
//! # Example
//!
//! ```no_run
//! use newsfaces::{CascadeParams, FaceSearch, PageArchive, PageOutcome, RustfaceDetector, TesseractCli};
//!
//! let detector = RustfaceDetector::from_path("seeta_fd_frontal_v1.0.bin", CascadeParams::default()).unwrap();
//! let search = FaceSearch::new(Box::new(TesseractCli::new()), Box::new(detector));
//!
//! let archive = PageArchive::open("small_img.zip").unwrap();
//! for report in search.run(&archive, "Christopher") {
//!     if let Ok(PageOutcome::Sheet(sheet)) = report.outcome {
//!         sheet.save(format!("{}_faces.png", report.name)).unwrap();
//!     }
//! }
//! ```
#![warn(missing_docs)]

mod archive;
mod crop;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
mod search;
/// Contact-sheet layout and composition.
pub mod sheet;
mod tesseract;
/// OCR seam and keyword matching.
pub mod text_match;

/// Archive of decoded pages.
pub use archive::{Page, PageArchive};
/// Face cropping.
pub use crop::crop_face;
/// Error type returned by newsfaces operations.
pub use error::Error;
/// Face detection trait and face bounding-box type.
pub use face_detector::{DetectionError, FaceBox, FaceDetector};
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model from disk.
pub use rustface_backend::{CascadeParams, RustfaceDetector};
/// The page-by-page driver.
pub use search::{FaceSearch, PageOutcome, PageReport};
/// Contact-sheet types.
pub use sheet::{ContactSheet, SheetLayout};
/// Tesseract command-line OCR backend.
pub use tesseract::TesseractCli;
/// OCR backend trait.
pub use text_match::TextRecognizer;
