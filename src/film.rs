//! Image dimensions, sampling settings and the output buffer

use std::path::{Path, PathBuf};

/// What to render: image size, samples per pixel and where the result goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilmDescriptor {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub output: PathBuf,
}

impl FilmDescriptor {
    pub fn new(width: u32, height: u32, samples_per_pixel: u32, output: impl Into<PathBuf>) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            output: output.into(),
        }
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Checks that `path` names an image format this build can encode.
///
/// Since [image::ImageOutputFormat] conditionally compiles the supported formats,
/// use that existing functionality instead of manually parsing which formats
/// this crate supports against the feature flags of this crate.
pub fn output_format(path: &Path) -> image::ImageResult<image::ImageFormat> {
    use image::{error, ImageOutputFormat};
    let format = image::ImageFormat::from_path(path)?;
    match ImageOutputFormat::from(format) {
        ImageOutputFormat::Unsupported(_) => Err(error::ImageError::Unsupported(
            error::UnsupportedError::from(error::ImageFormatHint::from(format)),
        )),
        _ => Ok(format),
    }
}

/// An 8-bit RGB image, stored row-major from the top scanline.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    image: image::RgbImage,
}

impl Framebuffer {
    /// Allocates a black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: image::ImageBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw channel bytes, three per pixel.
    pub fn bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// The pixel at column `x` of scanline `y`, counted from the top.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    pub fn into_image(self) -> image::RgbImage {
        self.image
    }

    /// Encodes the image in the format implied by the extension of `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.image.save(path)
    }
}
