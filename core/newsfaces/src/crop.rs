use image::{DynamicImage, GenericImageView};

use crate::face_detector::FaceBox;

/// Crop region clipped to the page, plus where it lands in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge of the clipped region in page coordinates.
    pub x: u32,
    /// Top edge of the clipped region in page coordinates.
    pub y: u32,
    /// Width of the clipped region.
    pub width: u32,
    /// Height of the clipped region.
    pub height: u32,
    /// Horizontal offset of the clipped region inside the output image.
    pub dest_x: u32,
    /// Vertical offset of the clipped region inside the output image.
    pub dest_y: u32,
}

/// Intersect a face box with a `page_width` × `page_height` page.
///
/// Returns `None` when the box lies entirely off the page.
pub fn clip_to_page(face: FaceBox, page_width: u32, page_height: u32) -> Option<CropRegion> {
    let left = face.left.max(0) as i64;
    let top = face.top.max(0) as i64;
    let right = (face.right as i64).min(page_width as i64);
    let bottom = (face.bottom as i64).min(page_height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(CropRegion {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
        dest_x: (left - face.left as i64) as u32,
        dest_y: (top - face.top as i64) as u32,
    })
}

/// Copy the face region out of a page.
///
/// The result is always `face.width()` × `face.height()`, in the page's
/// color type. Parts of the box outside the page are left zeroed.
pub fn crop_face(page: &DynamicImage, face: FaceBox) -> DynamicImage {
    let (width, height) = (face.width(), face.height());
    let (page_w, page_h) = page.dimensions();

    if face.left >= 0
        && face.top >= 0
        && face.right as i64 <= page_w as i64
        && face.bottom as i64 <= page_h as i64
    {
        return page.crop_imm(face.left as u32, face.top as u32, width, height);
    }

    let mut out = DynamicImage::new(width, height, page.color());
    if let Some(region) = clip_to_page(face, page_w, page_h) {
        let inside = page.crop_imm(region.x, region.y, region.width, region.height);
        image::imageops::replace(&mut out, &inside, region.dest_x as i64, region.dest_y as i64);
    }
    out
}
