use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::Error;

/// Upper bound on the buffer preallocated from an entry's declared size.
const MAX_CAPACITY_HINT: usize = 64 * 1024 * 1024;

/// Preallocation for an entry, trusting its header size only up to a cap.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_CAPACITY_HINT, |size| size.min(MAX_CAPACITY_HINT))
}

/// One scanned page, named after its archive entry.
#[derive(Debug, Clone)]
pub struct Page {
    /// Archive entry name, e.g. `a-0.png`.
    pub name: String,
    /// Decoded page image.
    pub image: DynamicImage,
}

/// Decoded pages of an archive, in archive entry order.
#[derive(Debug, Clone, Default)]
pub struct PageArchive {
    pages: Vec<Page>,
}

impl PageArchive {
    /// Open a zip archive on disk and decode every entry.
    ///
    /// The file handle is released before this returns.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let archive = Self::from_reader(BufReader::new(file))?;
        info!(
            archive = %path.display(),
            pages = archive.len(),
            "loaded page archive"
        );
        Ok(archive)
    }

    /// Decode every entry of a zip archive read from `reader`.
    ///
    /// Fails on the first entry that is not a decodable raster image.
    /// Directory entries are skipped.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, Error> {
        let mut zip = ZipArchive::new(reader)?;
        let mut pages = Vec::with_capacity(zip.len());

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();

            let mut raw = Vec::with_capacity(capacity_hint(entry.size()));
            entry.read_to_end(&mut raw)?;
            let image = image::load_from_memory(&raw).map_err(|e| Error::Decode {
                entry: name.clone(),
                reason: e.to_string(),
            })?;

            debug!(
                entry = %name,
                width = image.width(),
                height = image.height(),
                "decoded page"
            );
            pages.push(Page { name, image });
        }

        Ok(Self { pages })
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the archive holds no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages in archive entry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    /// Look up a page by entry name.
    pub fn get(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.name == name)
    }

    /// Entry names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.name.as_str())
    }
}

impl From<Vec<Page>> for PageArchive {
    fn from(pages: Vec<Page>) -> Self {
        Self { pages }
    }
}

impl<'a> IntoIterator for &'a PageArchive {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
