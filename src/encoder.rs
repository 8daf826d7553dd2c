use crate::decoder::DecoderRegistry;
use crate::icondir::{check_size, IconDir, IconDirEntry};
use crate::image::IconImage;
use crate::passthrough::{is_passthrough_eligible, read_png_size};
use image::DynamicImage;
use std::io;
use tracing::debug;

//===========================================================================//

/// The icon sizes generated by the multi-resolution entry points, in the
/// order they appear in the ICO file.
pub const STANDARD_SIZES: [u32; 9] = [16, 24, 32, 48, 64, 96, 128, 192, 256];

//===========================================================================//

/// Turns images, or raw image files, into complete ICO files.
///
/// Every image is stored as a PNG payload.  An encoder holds the formats it
/// can decode and the list of square sizes to generate for
/// multi-resolution icons; it keeps no other state between calls.
#[derive(Clone, Debug)]
pub struct IcoEncoder {
    decoders: DecoderRegistry,
    sizes: Vec<u32>,
}

impl IcoEncoder {
    /// Creates an encoder that reads raw files with the given decoders and
    /// uses [`STANDARD_SIZES`] for multi-resolution icons.
    pub fn new(decoders: DecoderRegistry) -> IcoEncoder {
        IcoEncoder { decoders, sizes: STANDARD_SIZES.to_vec() }
    }

    /// Returns the decoders used for raw image files.
    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }

    /// Returns the sizes generated for multi-resolution icons.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Replaces the sizes generated for multi-resolution icons.  Sizes are
    /// checked against the ICO limits when encoding.
    pub fn set_sizes(&mut self, sizes: &[u32]) {
        self.sizes = sizes.to_vec();
    }

    /// Encodes an image at its own size into a single-entry ICO file.
    pub fn encode_image(&self, image: &IconImage) -> io::Result<Vec<u8>> {
        let operation = "IcoEncoder::encode_image";
        let entry = encode_entry(operation, image)?;
        write_icondir(operation, vec![entry])
    }

    /// Encodes any `image` crate image into a single-entry ICO file.  The
    /// image is always re-encoded, since there are no original file bytes to
    /// reuse.
    pub fn encode_dynamic_image(
        &self,
        image: &DynamicImage,
    ) -> io::Result<Vec<u8>> {
        let operation = "IcoEncoder::encode_dynamic_image";
        check_size(operation, image.width(), image.height())?;
        let entry =
            encode_entry(operation, &IconImage::from_dynamic_image(image))?;
        write_icondir(operation, vec![entry])
    }

    /// Resamples an image to each of [`sizes`](IcoEncoder::sizes) and encodes
    /// the results into one ICO file, one entry per size in order.  Sizes
    /// that already match the image are used without resampling.
    pub fn encode_image_multi(
        &self,
        image: &IconImage,
    ) -> io::Result<Vec<u8>> {
        self.encode_ladder("IcoEncoder::encode_image_multi", image)
    }

    /// Encodes a raw image file into a single-entry ICO file.
    ///
    /// An 8-bit RGBA PNG file is embedded exactly as given.  Any other file
    /// is decoded with the registered decoders and re-encoded as a PNG.
    pub fn encode_bytes(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let operation = "IcoEncoder::encode_bytes";
        if is_passthrough_eligible(data) {
            let (width, height) = read_png_size(data)
                .map_err(|error| with_operation(operation, error))?;
            check_size(operation, width, height)?;
            debug!(width, height, len = data.len(), "reusing PNG data as is");
            let entry =
                IconDirEntry::from_png_data(width, height, data.to_vec());
            return write_icondir(operation, vec![entry]);
        }
        debug!(len = data.len(), "input is not an RGBA PNG; re-encoding");
        let image = self.decode(operation, data)?;
        let entry = encode_entry(operation, &image)?;
        write_icondir(operation, vec![entry])
    }

    /// Decodes a raw image file and encodes it as a multi-resolution ICO
    /// file, as [`encode_image_multi`](IcoEncoder::encode_image_multi)
    /// does.
    pub fn encode_bytes_multi(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let operation = "IcoEncoder::encode_bytes_multi";
        let image = self.decode(operation, data)?;
        self.encode_ladder(operation, &image)
    }

    fn decode(&self, operation: &str, data: &[u8]) -> io::Result<IconImage> {
        self.decoders
            .decode(data)
            .map_err(|error| with_operation(operation, error))
    }

    fn encode_ladder(
        &self,
        operation: &str,
        image: &IconImage,
    ) -> io::Result<Vec<u8>> {
        for &size in self.sizes.iter() {
            check_size(operation, size, size)?;
        }
        let mut entries = Vec::with_capacity(self.sizes.len());
        for &size in self.sizes.iter() {
            entries.push(encode_entry(operation, &image.resample(size, size))?);
        }
        write_icondir(operation, entries)
    }
}

impl Default for IcoEncoder {
    fn default() -> IcoEncoder {
        IcoEncoder::new(DecoderRegistry::default())
    }
}

//===========================================================================//

// The helpers below take the name of the public entry point that called
// them, and report every error under that name exactly once.

fn encode_entry(
    operation: &str,
    image: &IconImage,
) -> io::Result<IconDirEntry> {
    check_size(operation, image.width(), image.height())?;
    IconDirEntry::encode(image)
        .map_err(|error| with_operation(operation, error))
}

fn write_icondir(
    operation: &str,
    entries: Vec<IconDirEntry>,
) -> io::Result<Vec<u8>> {
    let mut icondir = IconDir::new();
    for entry in entries {
        icondir.add_entry(entry);
    }
    let mut output = Vec::new();
    icondir
        .write(&mut output)
        .map_err(|error| with_operation(operation, error))?;
    Ok(output)
}

// Prefixes an error message with the name of the failing operation, keeping
// the error kind.
fn with_operation(operation: &str, error: io::Error) -> io::Error {
    io::Error::new(error.kind(), format!("{}: {}", operation, error))
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{with_operation, IcoEncoder, STANDARD_SIZES};
    use crate::decoder::DecoderRegistry;
    use crate::image::IconImage;
    use std::io;

    #[test]
    fn default_sizes() {
        let encoder = IcoEncoder::default();
        assert_eq!(encoder.sizes(), &STANDARD_SIZES);
        assert_eq!(encoder.decoders().decoders().len(), 4);
    }

    #[test]
    fn with_operation_keeps_kind() {
        let error = io::Error::new(io::ErrorKind::InvalidData, "bad bytes");
        let error = with_operation("IcoEncoder::encode_bytes", error);
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
        assert_eq!(error.to_string(), "IcoEncoder::encode_bytes: bad bytes");
    }

    #[test]
    fn errors_name_only_the_called_operation() {
        let encoder = IcoEncoder::default();
        let error = encoder.encode_bytes_multi(b"not an image").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
        let message = error.to_string();
        assert!(
            message.starts_with("IcoEncoder::encode_bytes_multi: "),
            "{}",
            message
        );
        assert_eq!(message.matches("IcoEncoder::").count(), 1, "{}", message);
    }

    #[test]
    fn invalid_ladder_size_is_rejected_before_resampling() {
        let mut encoder = IcoEncoder::new(DecoderRegistry::new());
        encoder.set_sizes(&[16, 0]);
        let image = IconImage::from_rgba_data(1, 1, vec![0, 0, 0, 0]);
        let error = encoder.encode_image_multi(&image).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert!(error.to_string().contains("0x0"));
    }

    #[test]
    fn empty_ladder_is_rejected() {
        let mut encoder = IcoEncoder::default();
        encoder.set_sizes(&[]);
        let image = IconImage::from_rgba_data(1, 1, vec![0, 0, 0, 0]);
        let error = encoder.encode_image_multi(&image).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}

//===========================================================================//
