use crate::image::IconImage;
use byteorder::{LittleEndian, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::trace;

//===========================================================================//

// The signature that all PNG files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

// The ICONDIR header and each ICONDIRENTRY have fixed sizes, in bytes.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

// The resource type number for icons (cursors use 2).
const ICON_RESOURCE_TYPE: u16 = 1;

// Size limits for images in an ICO file:
const MIN_SIZE: u32 = 1;
const MAX_SIZE: u32 = 256;

// Every embedded PNG is stored as 32-bit RGBA.
const BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

/// Checks that a `width` by `height` image fits in an ICO file.  The
/// `operation` names the caller in the error message.
pub(crate) fn check_size(
    operation: &str,
    width: u32,
    height: u32,
) -> io::Result<()> {
    if width < MIN_SIZE
        || width > MAX_SIZE
        || height < MIN_SIZE
        || height > MAX_SIZE
    {
        size_range_error!(
            "{}: illegal image size, width and height must be in range \
             [{}..{}] but the given image has size {}x{}",
            operation,
            MIN_SIZE,
            MAX_SIZE,
            width,
            height
        );
    }
    Ok(())
}

//===========================================================================//

/// A collection of images; the contents of a single ICO file.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDir {
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty collection of icons.
    pub fn new() -> IconDir {
        IconDir { entries: Vec::new() }
    }

    /// Returns the entries in this collection.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Adds an entry to the collection.  Entries are written in the order
    /// they were added.
    pub fn add_entry(&mut self, entry: IconDirEntry) {
        self.entries.push(entry);
    }

    /// Writes an ICO file out to disk.
    ///
    /// Returns an `InvalidInput` error, without writing anything, if the
    /// collection is empty, has more than 65535 entries, has an entry whose
    /// width or height is outside 1 to 256, or would be too large for the
    /// 32-bit offsets of the ICO format.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let num_entries = self.entries.len();
        if num_entries == 0 {
            size_range_error!(
                "IconDir::write: an ICO file needs at least one image"
            );
        }
        if num_entries > (u16::MAX as usize) {
            size_range_error!(
                "IconDir::write: too many entries (was {}, but max is {})",
                num_entries,
                u16::MAX
            );
        }
        for entry in self.entries.iter() {
            check_size("IconDir::write", entry.width, entry.height)?;
        }
        let directory_len =
            ICONDIR_LEN as u64 + ICONDIRENTRY_LEN as u64 * num_entries as u64;
        let total_len = self
            .entries
            .iter()
            .fold(directory_len, |len, entry| len + entry.data.len() as u64);
        if total_len > u32::MAX as u64 {
            size_range_error!(
                "IconDir::write: ICO file would be {} bytes (max is {})",
                total_len,
                u32::MAX
            );
        }

        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(ICON_RESOURCE_TYPE)?;
        writer.write_u16::<LittleEndian>(num_entries as u16)?;
        let mut data_offset = directory_len as u32;
        for entry in self.entries.iter() {
            // A width/height byte of zero indicates a size of 256.
            let width =
                if entry.width == MAX_SIZE { 0 } else { entry.width as u8 };
            writer.write_u8(width)?;
            let height =
                if entry.height == MAX_SIZE { 0 } else { entry.height as u8 };
            writer.write_u8(height)?;
            writer.write_u8(0)?; // no color palette
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(1)?; // color planes
            writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
            let data_size = entry.data.len() as u32;
            writer.write_u32::<LittleEndian>(data_size)?;
            writer.write_u32::<LittleEndian>(data_offset)?;
            trace!(
                width = entry.width,
                height = entry.height,
                data_size,
                data_offset,
                "wrote ICONDIRENTRY"
            );
            data_offset += data_size;
        }
        for entry in self.entries.iter() {
            writer.write_all(&entry.data)?;
        }
        Ok(())
    }
}

//===========================================================================//

/// One entry in an ICO file; a single PNG-encoded image.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl IconDirEntry {
    /// Creates an entry holding already-encoded PNG data, which is written
    /// to the ICO file unmodified.  The `width` and `height` must match the
    /// PNG's own dimensions; they are checked against the ICO size limits
    /// when the file is written.
    pub fn from_png_data(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> IconDirEntry {
        IconDirEntry { width, height, data }
    }

    /// Encodes an image as a PNG in a new entry.  Returns an error if the
    /// encoding fails.
    pub fn encode(image: &IconImage) -> io::Result<IconDirEntry> {
        let mut data = Vec::new();
        image.write_png(&mut data)?;
        Ok(IconDirEntry::from_png_data(image.width(), image.height(), data))
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel recorded for this entry, which is always
    /// 32.
    pub fn bits_per_pixel(&self) -> u16 {
        BITS_PER_PIXEL
    }

    /// Returns true if the payload starts with the PNG signature.
    pub fn is_png(&self) -> bool {
        self.data.starts_with(PNG_SIGNATURE)
    }

    /// Returns the raw, encoded image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

//===========================================================================//


//===========================================================================//
