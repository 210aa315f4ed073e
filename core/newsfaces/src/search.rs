use tracing::{debug, info, warn};

use crate::archive::{Page, PageArchive};
use crate::crop::crop_face;
use crate::error::Error;
use crate::face_detector::{FaceDetector, FaceLocator};
use crate::sheet::{compose, ContactSheet, SheetLayout};
use crate::text_match::{TextMatcher, TextRecognizer};

/// Terminal state of one page.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// The keyword does not appear on the page.
    Skipped,
    /// The keyword appears but no faces were found.
    NoFaces,
    /// The keyword appears and the faces were composed into a sheet.
    Sheet(ContactSheet),
}

impl PageOutcome {
    /// Whether the keyword was found on the page.
    pub fn is_match(&self) -> bool {
        !matches!(self, PageOutcome::Skipped)
    }

    /// The contact sheet, if one was composed.
    pub fn sheet(&self) -> Option<&ContactSheet> {
        match self {
            PageOutcome::Sheet(sheet) => Some(sheet),
            _ => None,
        }
    }
}

/// Result of processing one page of an archive.
#[derive(Debug)]
pub struct PageReport {
    /// Archive entry name of the page.
    pub name: String,
    /// Outcome, or the error that stopped this page.
    pub outcome: Result<PageOutcome, Error>,
}

/// Searches archive pages for a keyword and collects faces from hits.
///
/// OCR and face detection are injected, so the same driver runs against
/// tesseract and rustface in production and against fakes in tests.
pub struct FaceSearch {
    recognizer: Box<dyn TextRecognizer>,
    detector: Box<dyn FaceDetector>,
    layout: SheetLayout,
}

impl FaceSearch {
    /// Build a search with the default sheet layout.
    pub fn new(recognizer: Box<dyn TextRecognizer>, detector: Box<dyn FaceDetector>) -> Self {
        Self {
            recognizer,
            detector,
            layout: SheetLayout::default(),
        }
    }

    /// Set the full sheet layout (default: 72 px cells, 5 columns).
    pub fn layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the contact-sheet cell size in pixels (default: 72).
    pub fn cell_size(mut self, cell_size: u32) -> Self {
        self.layout.cell_size = cell_size;
        self
    }

    /// Run one page through match → locate → crop → compose.
    pub fn process_page(&self, page: &Page, keyword: &str) -> Result<PageOutcome, Error> {
        if !TextMatcher::new(self.recognizer.as_ref()).matches(&page.image, keyword)? {
            debug!(page = %page.name, "keyword not found");
            return Ok(PageOutcome::Skipped);
        }
        info!(page = %page.name, keyword, "keyword found");

        let faces = FaceLocator::new(self.detector.as_ref()).locate(&page.image)?;
        if faces.is_empty() {
            info!(page = %page.name, "no faces on matching page");
            return Ok(PageOutcome::NoFaces);
        }

        let crops: Vec<_> = faces
            .iter()
            .map(|face| crop_face(&page.image, *face))
            .collect();
        let sheet = compose(&crops, self.layout)?;
        info!(page = %page.name, faces = sheet.count, "composed contact sheet");
        Ok(PageOutcome::Sheet(sheet))
    }

    /// Lazily process pages in archive order.
    ///
    /// Each page is processed when the iterator reaches it, so a caller can
    /// act on one report before the next page is OCR'd. A failing page is
    /// logged and reported; later pages still run.
    pub fn reports<'a>(
        &'a self,
        archive: &'a PageArchive,
        keyword: &'a str,
    ) -> impl Iterator<Item = PageReport> + 'a {
        archive.iter().map(move |page| {
            let outcome = self.process_page(page, keyword);
            if let Err(e) = &outcome {
                warn!(page = %page.name, error = %e, "page failed");
            }
            PageReport {
                name: page.name.clone(),
                outcome,
            }
        })
    }

    /// Process every page in archive order and collect the reports.
    pub fn run(&self, archive: &PageArchive, keyword: &str) -> Vec<PageReport> {
        self.reports(archive, keyword).collect()
    }
}
