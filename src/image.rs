use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::io::{self, Write};
use tracing::debug;

//===========================================================================//

// Size limits for images in memory.  Upper limits are enforced only when an
// image is placed in an ICO file, so that large sources can still be
// resampled down.
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

// Alpha value given to one pixel of an otherwise fully opaque image.
const FORCED_ALPHA: u8 = u8::MAX - 1;

// The cubic kernel used for all resampling.
const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

//===========================================================================//

/// A decoded image, stored as straight (non-premultiplied) 8-bit RGBA.
#[derive(Clone, Debug)]
pub struct IconImage {
    buffer: RgbaImage,
}

impl IconImage {
    /// Creates a new image with the given dimensions and RGBA data.  The
    /// `width` and `height` must be nonzero, and `rgba_data` must have `4 *
    /// width * height` bytes and be in row-major order from top to bottom.
    /// Panics if the dimensions are out of range or if `rgba_data` is the
    /// wrong length.
    pub fn from_rgba_data(
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> IconImage {
        if width < MIN_WIDTH {
            panic!(
                "Invalid width (was {}, but must be at least {})",
                width, MIN_WIDTH
            );
        }
        if height < MIN_HEIGHT {
            panic!(
                "Invalid height (was {}, but must be at least {})",
                height, MIN_HEIGHT
            );
        }
        let expected_data_len = (width as u64) * (height as u64) * 4;
        if (rgba_data.len() as u64) != expected_data_len {
            panic!(
                "Invalid data length (was {}, but must be {} for {}x{} image)",
                rgba_data.len(),
                expected_data_len,
                width,
                height
            );
        }
        match RgbaImage::from_raw(width, height, rgba_data) {
            Some(buffer) => IconImage { buffer },
            None => unreachable!(),
        }
    }

    /// Converts an image of any pixel format into straight RGBA.  Panics if
    /// the image is empty.
    pub fn from_dynamic_image(image: &DynamicImage) -> IconImage {
        IconImage::from(image.to_rgba8())
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Returns true if every pixel has an alpha value of 255.
    pub fn is_fully_opaque(&self) -> bool {
        self.rgba_data().chunks_exact(4).all(|pixel| pixel[3] == u8::MAX)
    }

    /// Returns a copy of this image scaled to exactly `width` by `height`
    /// pixels.  Each channel, alpha included, is filtered independently
    /// with a Catmull-Rom cubic kernel, so the result depends only on the
    /// input.  If the image already has the requested size, the copy is
    /// returned unchanged.  Panics if either dimension is zero.
    pub fn resample(&self, width: u32, height: u32) -> IconImage {
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            panic!(
                "Invalid resample size (was {}x{}, but must be at least \
                 {}x{})",
                width, height, MIN_WIDTH, MIN_HEIGHT
            );
        }
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        debug!(
            from_width = self.width(),
            from_height = self.height(),
            to_width = width,
            to_height = height,
            "resampling image"
        );
        let buffer =
            imageops::resize(&self.buffer, width, height, RESAMPLE_FILTER);
        IconImage { buffer }
    }

    /// Encodes the image as an 8-bit RGBA PNG file.
    ///
    /// The PNG always carries an alpha channel that is not entirely opaque:
    /// if every pixel of the image is opaque, the bottom-right pixel is
    /// written with an alpha of 254.  ICO consumers render PNG payloads
    /// without a usable alpha plane incorrectly.  The image itself is never
    /// modified.
    pub fn write_png<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut rgba_data = self.rgba_data().to_vec();
        if self.is_fully_opaque() {
            if let Some(alpha) = rgba_data.last_mut() {
                *alpha = FORCED_ALPHA;
            }
        }
        match self.write_png_enc(&rgba_data, writer) {
            Ok(()) => Ok(()),
            Err(png::EncodingError::IoError(error)) => Err(error),
            Err(png::EncodingError::Format(error)) => {
                encode_error!("PNG format error: {}", error);
            }
            Err(png::EncodingError::LimitsExceeded) => {
                encode_error!(
                    "PNG limits exceeded for {}x{} image",
                    self.width(),
                    self.height()
                );
            }
            Err(png::EncodingError::Parameter(error)) => {
                encode_error!("PNG parameter error: {}", error);
            }
        }
    }

    fn write_png_enc<W: Write>(
        &self,
        rgba_data: &[u8],
        writer: W,
    ) -> Result<(), png::EncodingError> {
        let mut encoder =
            png::Encoder::new(writer, self.width(), self.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()
    }
}

impl From<RgbaImage> for IconImage {
    /// Panics if the image is empty.
    fn from(buffer: RgbaImage) -> IconImage {
        let (width, height) = buffer.dimensions();
        IconImage::from_rgba_data(width, height, buffer.into_raw())
    }
}

//===========================================================================//


//===========================================================================//
