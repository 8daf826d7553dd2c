//! A library for packing images into ICO files.
//!
//! Every image in an ICO file produced by this crate is stored as a 32-bit
//! RGBA PNG.  Images can come from decoded pixel data ([`IconImage`], or any
//! `image::DynamicImage`) or from raw PNG, BMP, JPEG or GIF file bytes.  An
//! 8-bit RGBA PNG file is embedded byte for byte, so any optimization that
//! was applied to it survives.
//!
//! # Examples
//!
//! ```no_run
//! let source = std::fs::read("logo.png").unwrap();
//! let encoder = pngico::IcoEncoder::default();
//! let icon = encoder.encode_bytes(&source).unwrap();
//! std::fs::write("logo.ico", icon).unwrap();
//! ```
//!
//! # Errors
//!
//! All fallible operations return `std::io::Result`.  The error kind tells
//! what went wrong:
//!
//! * `InvalidData`: the input bytes are not a supported, well-formed image.
//! * `InvalidInput`: an image is smaller than 1x1 or larger than 256x256
//!   (the limits of the ICO format), or the ICO file would have no entries
//!   or too many.
//! * Any other kind: PNG encoding failed.
//!
//! Error messages name the failing operation and, for size errors, the
//! actual dimensions.

#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod decoder;
mod encoder;
mod icondir;
mod image;
pub mod passthrough;

pub use crate::decoder::{DecoderRegistry, ImageDecoder};
pub use crate::encoder::{IcoEncoder, STANDARD_SIZES};
pub use crate::icondir::{IconDir, IconDirEntry};
pub use crate::image::IconImage;

//===========================================================================//
