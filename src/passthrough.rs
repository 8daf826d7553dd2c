//! Detection of PNG files that can be embedded in an ICO file verbatim.
//!
//! A PNG that is already 8-bit RGBA may have been tuned by an external
//! optimizer.  Decoding and re-encoding it would throw that work away, so
//! such files are copied into the ICO file byte for byte instead.

use std::io;

//===========================================================================//

// Every PNG file starts with this signature, directly followed by the IHDR
// chunk (length 13).
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const IHDR_CHUNK_START: &[u8] = b"\x00\x00\x00\x0dIHDR";

// The IHDR payload begins with a 4-byte width and a 4-byte height, followed
// by one byte each of bit depth and color type.
const BIT_DEPTH_OFFSET: usize = 16 + 4 + 4;
const COLOR_TYPE_OFFSET: usize = BIT_DEPTH_OFFSET + 1;

const BIT_DEPTH_EIGHT: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;

//===========================================================================//

/// Returns true if `data` is a well-formed PNG file with 8 bits per channel
/// and truecolor-with-alpha pixels.  Never fails; anything that can't be
/// confirmed simply yields false.
pub fn is_passthrough_eligible(data: &[u8]) -> bool {
    has_rgba8_header(data) && decodes_cleanly(data)
}

/// Reads the width and height from the header of a PNG file, without
/// decoding its pixel data.
pub fn read_png_size(data: &[u8]) -> io::Result<(u32, u32)> {
    match png::Decoder::new(data).read_info() {
        Ok(reader) => Ok((reader.info().width, reader.info().height)),
        Err(error) => decode_error!("Malformed PNG header: {}", error),
    }
}

fn has_rgba8_header(data: &[u8]) -> bool {
    if data.len() <= COLOR_TYPE_OFFSET {
        return false;
    }
    data.starts_with(PNG_SIGNATURE)
        && data[PNG_SIGNATURE.len()..].starts_with(IHDR_CHUNK_START)
        && data[BIT_DEPTH_OFFSET] == BIT_DEPTH_EIGHT
        && data[COLOR_TYPE_OFFSET] == COLOR_TYPE_RGBA
}

fn decodes_cleanly(data: &[u8]) -> bool {
    let mut reader = match png::Decoder::new(data).read_info() {
        Ok(reader) => reader,
        Err(_) => return false,
    };
    let mut buffer = vec![0u8; reader.output_buffer_size()];
    // Read through IEND too, so that every chunk's CRC gets checked.
    reader.next_frame(&mut buffer).is_ok() && reader.finish().is_ok()
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{is_passthrough_eligible, read_png_size};
    use std::io;

    fn encode_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        data: &[u8],
    ) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
            writer.finish().unwrap();
        }
        output
    }

    #[test]
    fn rgba8_png_is_eligible() {
        let data = encode_png(
            2,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            &[1, 2, 3, 255, 4, 5, 6, 255],
        );
        assert!(is_passthrough_eligible(&data));
        assert_eq!(read_png_size(&data).unwrap(), (2, 1));
    }

    #[test]
    fn rgb8_png_is_not_eligible() {
        let data = encode_png(
            2,
            1,
            png::ColorType::Rgb,
            png::BitDepth::Eight,
            &[1, 2, 3, 4, 5, 6],
        );
        assert!(!is_passthrough_eligible(&data));
    }

    #[test]
    fn rgba16_png_is_not_eligible() {
        let data = encode_png(
            1,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Sixteen,
            &[0, 1, 0, 2, 0, 3, 255, 255],
        );
        assert!(!is_passthrough_eligible(&data));
    }

    #[test]
    fn truncated_png_is_not_eligible() {
        let mut state = 12345u32;
        let rgba: Vec<u8> = (0..(8 * 8 * 4))
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                (state >> 16) as u8
            })
            .collect();
        let data =
            encode_png(8, 8, png::ColorType::Rgba, png::BitDepth::Eight, &rgba);
        // The header is intact, but the image data is cut short.
        let truncated = &data[..data.len() / 2];
        assert!(!is_passthrough_eligible(truncated));
        assert_eq!(read_png_size(truncated).unwrap(), (8, 8));
    }

    #[test]
    fn png_with_corrupt_trailing_chunk_is_not_eligible() {
        let mut data = encode_png(
            2,
            2,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            &[9u8; 16],
        );
        assert!(is_passthrough_eligible(&data));
        // Damage the CRC of the IEND chunk, after all of the image data.
        let last = data.len() - 1;
        data[last] ^= 0xff;
        assert!(!is_passthrough_eligible(&data));
    }

    #[test]
    fn short_or_foreign_data_is_not_eligible() {
        assert!(!is_passthrough_eligible(b""));
        assert!(!is_passthrough_eligible(b"\x89PNG\r\n\x1a\n"));
        assert!(!is_passthrough_eligible(b"BM\x00\x00\x00\x00\x00\x00"));
        assert!(!is_passthrough_eligible(&[0u8; 64]));
    }

    #[test]
    fn malformed_header_is_a_decode_error() {
        let error = read_png_size(b"GIF89a").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }
}

//===========================================================================//
