//! Loading of 8/16-bit LDR images and writing of float radiance images.

mod error;
mod jpeg_fmt;
mod png_fmt;
mod tiff_fmt;

use std::io::{Read, Seek, SeekFrom, Write};

pub use error::{ReadError, WriteError};

#[derive(Debug, Clone)]
pub enum ImageData {
    /// 8-bit unsigned RGB channels, interleaved.
    Rgb8(Vec<u8>),

    /// 16-bit unsigned RGB channels, interleaved.
    Rgb16(Vec<u16>),
}

#[derive(Debug, Clone)]
pub struct Image {
    pub dimensions: (usize, usize),
    pub data: ImageData,
}

impl Image {
    pub fn bit_depth(&self) -> usize {
        match self.data {
            ImageData::Rgb8(_) => 8,
            ImageData::Rgb16(_) => 16,
        }
    }

    /// Returns the pixels with each channel mapped to [0.0, 1.0].
    pub fn to_normalized_rgb(&self) -> Vec<[f32; 3]> {
        fn normalize<T: Copy + Into<f32>>(data: &[T], max: f32) -> Vec<[f32; 3]> {
            let norm = 1.0 / max;
            data.chunks_exact(3)
                .map(|c| [c[0].into() * norm, c[1].into() * norm, c[2].into() * norm])
                .collect()
        }

        match self.data {
            ImageData::Rgb8(ref data) => normalize(data, 255.0),
            ImageData::Rgb16(ref data) => normalize(data, 65535.0),
        }
    }
}

pub fn load<R: Read + Seek>(mut reader: R) -> Result<Image, ReadError> {
    // Try each format in turn, rewinding between attempts.
    match tiff_fmt::load(&mut reader) {
        Err(ReadError::UnknownFormat) => {} // Continue to try next format.
        r => return r,
    }

    reader.seek(SeekFrom::Start(0))?;
    match png_fmt::load(&mut reader) {
        Err(ReadError::UnknownFormat) => {}
        r => return r,
    }

    reader.seek(SeekFrom::Start(0))?;
    match jpeg_fmt::load(&mut reader) {
        Err(ReadError::UnknownFormat) => {}
        r => return r,
    }

    // No formats matched.
    Err(ReadError::UnknownFormat)
}

/// Writes an uncompressed 32-bit float RGB TIFF.
pub fn write_rgb_f32_tiff<W: Write + Seek>(
    writer: W,
    width: usize,
    height: usize,
    pixels: &[[f32; 3]],
) -> Result<(), WriteError> {
    tiff_fmt::write_rgb_f32(writer, width, height, pixels)
}
