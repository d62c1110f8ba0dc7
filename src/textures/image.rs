//! Image-backed texture mappings

use std::path::Path;

use crate::color::{colors, Color, FromPixel};

/// Decodes the image at `file_path`, logging instead of failing.
fn load(file_path: &Path) -> Option<image::DynamicImage> {
    let decoded = image::io::Reader::open(file_path)
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.with_guessed_format().map_err(image::ImageError::IoError))
        .and_then(|reader| reader.decode());

    match decoded {
        Ok(img) => {
            log::info!(
                "Loaded image {} ({}x{})",
                file_path.display(),
                img.width(),
                img.height()
            );
            Some(img)
        }
        Err(why) => {
            log::warn!(
                "Could not load image {}: {why}; substituting the missing texture",
                file_path.display()
            );
            None
        }
    }
}

/// An image-based texture
#[derive(Debug)]
pub struct ImageMap {
    /// The image buffer used as the texture, `None` if it failed to load
    image: Option<image::RgbImage>,
}

impl ImageMap {
    /// Creates a new [ImageMap]
    ///
    /// Loads the image located at `file_path`:
    /// * if successful, holds the decoded [image::RgbImage]
    /// * on error, holds nothing and every lookup returns [colors::MISSING]
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            image: load(file_path.as_ref()).map(|img| img.into_rgb8()),
        }
    }

    pub fn from_image(image: image::RgbImage) -> Self {
        Self { image: Some(image) }
    }

    /// Whether the backing image was loaded.
    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub(super) fn color(&self, u: f32, v: f32) -> Color {
        match &self.image {
            Some(img) if img.width() > 0 && img.height() > 0 => {
                let u = u.clamp(0.0, 1.0);
                // flip v to image coordinates
                let v = 1.0 - v.clamp(0.0, 1.0);

                let i = (u * img.width() as f32) as u32;
                let j = (v * img.height() as f32) as u32;

                let i = i.min(img.width() - 1);
                let j = j.min(img.height() - 1);

                Color::from_pixel(*img.get_pixel(i, j))
            }
            _ => colors::MISSING,
        }
    }
}

/// A floating-point image sampled in latitude/longitude coordinates.
///
/// Unlike [ImageMap] the rows are not flipped: `v = 0` is the top row.
#[derive(Debug)]
pub struct EnvironmentMap {
    image: Option<image::Rgb32FImage>,
}

impl EnvironmentMap {
    /// Creates a new [EnvironmentMap] from the image at `file_path`.
    ///
    /// HDR inputs keep their full range; on error every lookup returns [colors::MISSING].
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            image: load(file_path.as_ref()).map(|img| img.into_rgb32f()),
        }
    }

    pub fn from_image(image: image::Rgb32FImage) -> Self {
        Self { image: Some(image) }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub(super) fn color(&self, u: f32, v: f32) -> Color {
        match &self.image {
            Some(img) if img.width() > 0 && img.height() > 0 => {
                let u = u.clamp(0.0, 1.0);
                let v = v.clamp(0.0, 1.0);

                let i = (u * (img.width() - 1) as f32 + 0.5) as u32;
                let j = (v * (img.height() - 1) as f32 + 0.5) as u32;

                Color::from_pixel(*img.get_pixel(i, j))
            }
            _ => colors::MISSING,
        }
    }
}
