use image::{DynamicImage, GrayImage, Luma, Rgb};
use tracing::debug;

use crate::error::Error;

/// Pluggable OCR backend.
///
/// Receives the binarized page and returns the raw recognized text.
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text printed on a binarized page.
    fn recognize(&self, page: &GrayImage) -> Result<String, Error>;
}

/// ITU-R 601-2 luma in 16-bit fixed point, rounded to nearest.
pub fn luma_601(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    let weighted = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Convert a page to luma with the 601 weights of [`luma_601`].
pub fn grayscale_601(page: &DynamicImage) -> GrayImage {
    let rgb = page.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([luma_601(*rgb.get_pixel(x, y))])
    })
}

/// Convert a page to two-tone black and white.
///
/// The page is converted to 601 luma and then Floyd–Steinberg dithered to
/// the levels 0 and 255.
pub fn binarize(page: &DynamicImage) -> GrayImage {
    let mut gray = grayscale_601(page);
    image::imageops::dither(&mut gray, &image::imageops::BiLevel);
    gray
}

/// Remove line breaks from OCR output without inserting separators.
pub fn flatten_text(text: &str) -> String {
    text.replace('\n', "")
}

/// Case-insensitive substring test.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Decides whether a page mentions a keyword.
pub struct TextMatcher<'a> {
    recognizer: &'a dyn TextRecognizer,
}

impl<'a> TextMatcher<'a> {
    /// Match through `recognizer`.
    pub fn new(recognizer: &'a dyn TextRecognizer) -> Self {
        Self { recognizer }
    }

    /// Binarize, OCR, flatten, then search for `keyword`.
    pub fn matches(&self, page: &DynamicImage, keyword: &str) -> Result<bool, Error> {
        let binary = binarize(page);
        let text = flatten_text(&self.recognizer.recognize(&binary)?);
        let found = contains_keyword(&text, keyword);
        debug!(chars = text.len(), found, "searched OCR text");
        Ok(found)
    }
}
