use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::Error;

/// Default edge length of a contact-sheet cell, in pixels.
pub const DEFAULT_CELL_SIZE: u32 = 72;

/// Default number of thumbnails per sheet row.
pub const DEFAULT_COLUMNS: u32 = 5;

/// Grid geometry of a contact sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Edge length of each square cell in pixels.
    pub cell_size: u32,
    /// Cells per row.
    pub columns: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl SheetLayout {
    /// Number of grid rows allocated for `count` thumbnails.
    ///
    /// Always `count / columns + 1`, so an exact multiple of `columns`
    /// leaves one blank trailing row.
    pub fn rows_for(&self, count: usize) -> u32 {
        count as u32 / self.columns + 1
    }

    /// Pixel origin of the cell holding the `index`-th thumbnail.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (
            (index % self.columns) * self.cell_size,
            (index / self.columns) * self.cell_size,
        )
    }

    fn validate(&self) -> Result<(), Error> {
        if self.cell_size == 0 || self.columns == 0 {
            return Err(Error::InvalidLayout);
        }
        Ok(())
    }
}

/// A composed grid of face thumbnails for one page.
#[derive(Debug, Clone)]
pub struct ContactSheet {
    /// The composed image.
    pub image: DynamicImage,

    /// Layout the sheet was composed with.
    pub layout: SheetLayout,

    /// Number of grid rows allocated.
    pub rows: u32,

    /// Number of thumbnails placed on the sheet.
    pub count: usize,
}

impl ContactSheet {
    /// Sheet width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Sheet height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Write the sheet to `path`; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        self.image
            .save(path.as_ref())
            .map_err(|e| Error::Encode(e.to_string()))
    }
}

/// Output size of a thumbnail that fits within a `cell` × `cell` box.
///
/// Only ever shrinks. The constrained side is `cell`; the other side is the
/// floor or ceiling of the scaled length, whichever keeps the aspect ratio
/// closer, and never less than 1.
pub fn thumbnail_dimensions(width: u32, height: u32, cell: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (cell >= width && cell >= height) {
        return (width, height);
    }

    let aspect = width as f64 / height as f64;
    let bound = cell as f64;

    if 1.0 >= aspect {
        // Taller than wide: height is pinned to the cell
        let w = round_aspect(bound * aspect, |n| (aspect - n / bound).abs());
        (w, cell)
    } else {
        let h = round_aspect(bound / aspect, |n| {
            if n == 0.0 {
                0.0
            } else {
                (aspect - bound / n).abs()
            }
        });
        (cell, h)
    }
}

fn round_aspect(number: f64, error: impl Fn(f64) -> f64) -> u32 {
    let (floor, ceil) = (number.floor(), number.ceil());
    let best = if error(ceil) < error(floor) { ceil } else { floor };
    (best as u32).max(1)
}

/// Shrink an image to fit within a `cell` × `cell` box, preserving aspect.
pub fn thumbnail(image: &DynamicImage, cell: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_w, new_h) = thumbnail_dimensions(width, height, cell);
    if (new_w, new_h) == (width, height) {
        return image.clone();
    }
    image.resize_exact(new_w, new_h, FilterType::CatmullRom)
}

/// Tile face crops into a contact sheet.
///
/// The canvas is `columns × cell_size` wide and uses the color type of the
/// first face. Thumbnails fill cells left to right, top to bottom.
pub fn compose(faces: &[DynamicImage], layout: SheetLayout) -> Result<ContactSheet, Error> {
    let first = faces.first().ok_or(Error::EmptyFaceList)?;
    layout.validate()?;

    let rows = layout.rows_for(faces.len());
    let mut canvas = DynamicImage::new(
        layout.cell_size * layout.columns,
        layout.cell_size * rows,
        first.color(),
    );

    for (index, face) in faces.iter().enumerate() {
        let thumb = thumbnail(face, layout.cell_size);
        let (x, y) = layout.cell_origin(index);
        image::imageops::replace(&mut canvas, &thumb, x as i64, y as i64);
    }

    debug!(
        faces = faces.len(),
        rows,
        width = canvas.width(),
        height = canvas.height(),
        "composed contact sheet"
    );

    Ok(ContactSheet {
        image: canvas,
        layout,
        rows,
        count: faces.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn thumbnail_keeps_small_images() {
        assert_eq!(thumbnail_dimensions(40, 60, 72), (40, 60));
        assert_eq!(thumbnail_dimensions(72, 72, 72), (72, 72));
    }

    #[test]
    fn thumbnail_square_fills_cell() {
        assert_eq!(thumbnail_dimensions(150, 150, 72), (72, 72));
    }

    #[test]
    fn thumbnail_landscape_pins_width() {
        assert_eq!(thumbnail_dimensions(200, 100, 72), (72, 36));
        // 72 / (100 / 60) = 43.2
        assert_eq!(thumbnail_dimensions(100, 60, 72), (72, 43));
    }

    #[test]
    fn thumbnail_portrait_pins_height() {
        assert_eq!(thumbnail_dimensions(100, 200, 72), (36, 72));
        // One side already fits but the other does not
        assert_eq!(thumbnail_dimensions(50, 100, 72), (36, 72));
    }

    #[test]
    fn thumbnail_never_collapses_to_zero() {
        assert_eq!(thumbnail_dimensions(1000, 1, 72), (72, 1));
        assert_eq!(thumbnail_dimensions(1, 1000, 72), (1, 72));
    }

    #[test]
    fn thumbnail_resizes_pixels() {
        let thumb = thumbnail(&solid(144, 96, [10, 20, 30]), 72);
        assert_eq!(thumb.dimensions(), (72, 48));
    }

    #[test]
    fn rows_reserve_one_extra() {
        let layout = SheetLayout::default();
        assert_eq!(layout.rows_for(1), 1);
        assert_eq!(layout.rows_for(4), 1);
        assert_eq!(layout.rows_for(5), 2);
        assert_eq!(layout.rows_for(6), 2);
        assert_eq!(layout.rows_for(10), 3);
    }

    #[test]
    fn cell_origin_wraps_after_five() {
        let layout = SheetLayout::default();
        assert_eq!(layout.cell_origin(0), (0, 0));
        assert_eq!(layout.cell_origin(4), (288, 0));
        assert_eq!(layout.cell_origin(5), (0, 72));
        assert_eq!(layout.cell_origin(7), (144, 72));
    }

    #[test]
    fn compose_width_is_five_cells() {
        for count in 1..=12 {
            let faces = vec![solid(90, 90, [255, 0, 0]); count];
            let sheet = compose(&faces, SheetLayout::default()).unwrap();
            assert_eq!(sheet.width(), 5 * DEFAULT_CELL_SIZE, "count {count}");
            assert_eq!(sheet.count, count);
        }
    }

    #[test]
    fn compose_five_faces_allocates_two_rows() {
        let faces = vec![solid(90, 90, [255, 0, 0]); 5];
        let sheet = compose(&faces, SheetLayout::default()).unwrap();
        assert_eq!(sheet.rows, 2);
        assert_eq!(sheet.height(), 2 * DEFAULT_CELL_SIZE);

        let rgb = sheet.image.to_rgb8();
        // Last cell of the first row is filled, the reserved row is blank
        assert_eq!(rgb.get_pixel(4 * 72 + 10, 10), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(10, 72 + 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn compose_places_faces_in_order() {
        let faces = vec![
            solid(80, 80, [255, 0, 0]),
            solid(80, 80, [0, 255, 0]),
            solid(30, 30, [0, 0, 255]),
        ];
        let sheet = compose(&faces, SheetLayout::default()).unwrap();
        let rgb = sheet.image.to_rgb8();
        assert_eq!(rgb.get_pixel(5, 5), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(72 + 5, 5), &Rgb([0, 255, 0]));
        // A small crop is pasted at its cell origin, unscaled
        assert_eq!(rgb.get_pixel(144 + 5, 5), &Rgb([0, 0, 255]));
        assert_eq!(rgb.get_pixel(144 + 40, 5), &Rgb([0, 0, 0]));
    }

    #[test]
    fn compose_uses_first_face_color_type() {
        let faces = vec![
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([1, 2, 3, 255]))),
            solid(10, 10, [9, 9, 9]),
        ];
        let sheet = compose(&faces, SheetLayout::default()).unwrap();
        assert_eq!(sheet.image.color(), image::ColorType::Rgba8);
        assert_eq!(sheet.image.get_pixel(72 + 1, 1), Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn compose_respects_custom_cell_size() {
        let layout = SheetLayout {
            cell_size: 32,
            columns: 5,
        };
        let faces = vec![solid(64, 64, [1, 1, 1]); 7];
        let sheet = compose(&faces, layout).unwrap();
        assert_eq!(sheet.width(), 160);
        assert_eq!(sheet.height(), 64);
    }

    #[test]
    fn compose_rejects_empty_list() {
        let result = compose(&[], SheetLayout::default());
        assert!(matches!(result, Err(Error::EmptyFaceList)));
    }

    #[test]
    fn compose_rejects_zero_columns() {
        let layout = SheetLayout {
            cell_size: 72,
            columns: 0,
        };
        let result = compose(&[solid(4, 4, [0, 0, 0])], layout);
        assert!(matches!(result, Err(Error::InvalidLayout)));
    }

    #[test]
    fn save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        let sheet = compose(&[solid(20, 20, [5, 5, 5])], SheetLayout::default()).unwrap();
        sheet.save(&path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.dimensions(), (360, 72));
    }
}
