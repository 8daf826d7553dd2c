//! Dispatch from raw file bytes to an image decoder.
//!
//! Decoders are plain capabilities: a name, the magic byte sequences that
//! identify the format, and a function turning the bytes into an
//! [`IconImage`].  A [`DecoderRegistry`] is built by the caller and handed
//! to the encoder; there is no global registration.

use crate::image::IconImage;
use image::ImageFormat;
use std::fmt;
use std::io;
use tracing::debug;

//===========================================================================//

/// A function that decodes a complete image file.
pub type DecodeFn = fn(&[u8]) -> io::Result<IconImage>;

//===========================================================================//

/// A single image file format that can be decoded.
#[derive(Clone, Copy)]
pub struct ImageDecoder {
    name: &'static str,
    signatures: &'static [&'static [u8]],
    decode: DecodeFn,
}

impl ImageDecoder {
    /// Creates a decoder for files that start with any of the given
    /// `signatures`.
    pub const fn new(
        name: &'static str,
        signatures: &'static [&'static [u8]],
        decode: DecodeFn,
    ) -> ImageDecoder {
        ImageDecoder { name, signatures, decode }
    }

    /// Returns the name of the format, e.g. `"PNG"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if `data` starts with one of this format's signatures.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.signatures.iter().any(|signature| data.starts_with(signature))
    }

    /// Decodes `data` into an image.
    pub fn decode(&self, data: &[u8]) -> io::Result<IconImage> {
        (self.decode)(data)
    }
}

impl fmt::Debug for ImageDecoder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImageDecoder")
            .field("name", &self.name)
            .field("signatures", &self.signatures)
            .finish()
    }
}

//===========================================================================//

/// PNG files, decoded with the `image` crate.
pub const PNG: ImageDecoder =
    ImageDecoder::new("PNG", &[b"\x89PNG\r\n\x1a\n"], decode_png);

/// Windows BMP files, decoded with the `image` crate.
pub const BMP: ImageDecoder = ImageDecoder::new("BMP", &[b"BM"], decode_bmp);

/// JPEG files, decoded with the `image` crate.
pub const JPEG: ImageDecoder =
    ImageDecoder::new("JPEG", &[b"\xff\xd8\xff"], decode_jpeg);

/// GIF files (first frame only), decoded with the `image` crate.
pub const GIF: ImageDecoder =
    ImageDecoder::new("GIF", &[b"GIF87a", b"GIF89a"], decode_gif);

fn decode_png(data: &[u8]) -> io::Result<IconImage> {
    decode_with_format(data, ImageFormat::Png)
}

fn decode_bmp(data: &[u8]) -> io::Result<IconImage> {
    decode_with_format(data, ImageFormat::Bmp)
}

fn decode_jpeg(data: &[u8]) -> io::Result<IconImage> {
    decode_with_format(data, ImageFormat::Jpeg)
}

fn decode_gif(data: &[u8]) -> io::Result<IconImage> {
    decode_with_format(data, ImageFormat::Gif)
}

fn decode_with_format(
    data: &[u8],
    format: ImageFormat,
) -> io::Result<IconImage> {
    let image = match image::load_from_memory_with_format(data, format) {
        Ok(image) => image,
        Err(error) => decode_error!("Malformed {:?} data: {}", format, error),
    };
    if image.width() == 0 || image.height() == 0 {
        decode_error!(
            "{:?} image is empty ({}x{})",
            format,
            image.width(),
            image.height()
        );
    }
    Ok(IconImage::from_dynamic_image(&image))
}

//===========================================================================//

/// An ordered list of the image formats an encoder can read.
#[derive(Clone, Debug)]
pub struct DecoderRegistry {
    decoders: Vec<ImageDecoder>,
}

impl DecoderRegistry {
    /// Creates a registry that recognizes no formats at all.
    pub fn new() -> DecoderRegistry {
        DecoderRegistry { decoders: Vec::new() }
    }

    /// Creates a registry for PNG, BMP, JPEG and GIF files.
    pub fn with_standard_formats() -> DecoderRegistry {
        DecoderRegistry { decoders: vec![PNG, BMP, JPEG, GIF] }
    }

    /// Adds a decoder.  Decoders are tried in the order they were added.
    pub fn register(&mut self, decoder: ImageDecoder) {
        self.decoders.push(decoder);
    }

    /// Returns the registered decoders.
    pub fn decoders(&self) -> &[ImageDecoder] {
        &self.decoders
    }

    /// Returns the first decoder whose signature matches `data`, if any.
    pub fn find(&self, data: &[u8]) -> Option<&ImageDecoder> {
        self.decoders.iter().find(|decoder| decoder.matches(data))
    }

    /// Decodes `data` with the matching decoder.  Returns an `InvalidData`
    /// error if no registered format matches or if decoding fails.
    pub fn decode(&self, data: &[u8]) -> io::Result<IconImage> {
        let decoder = match self.find(data) {
            Some(decoder) => decoder,
            None => decode_error!("Unrecognized image format"),
        };
        debug!(format = decoder.name(), len = data.len(), "decoding image");
        decoder.decode(data)
    }
}

impl Default for DecoderRegistry {
    fn default() -> DecoderRegistry {
        DecoderRegistry::with_standard_formats()
    }
}

//===========================================================================//


//===========================================================================//
