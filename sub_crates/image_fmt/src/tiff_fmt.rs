use std::io::{Read, Seek, Write};

use tiff::{decoder::DecodingResult, encoder::colortype, ColorType};

use crate::{
    error::{ReadError, WriteError},
    Image, ImageData,
};

pub fn load<R: Read + Seek>(mut reader: R) -> Result<Image, ReadError> {
    let mut decoder =
        tiff::decoder::Decoder::new(&mut reader)?.with_limits(tiff::decoder::Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let dimensions = (width as usize, height as usize);
    let colortype = decoder.colortype()?;
    let data = decoder.read_image()?;

    let data = match (colortype, data) {
        (ColorType::RGB(_), DecodingResult::U8(d)) => ImageData::Rgb8(d),
        (ColorType::RGB(_), DecodingResult::U16(d)) => ImageData::Rgb16(d),

        // Alpha is dropped.
        (ColorType::RGBA(_), DecodingResult::U8(d)) => ImageData::Rgb8(drop_alpha(&d, 4)),
        (ColorType::RGBA(_), DecodingResult::U16(d)) => ImageData::Rgb16(drop_alpha(&d, 4)),

        (ColorType::Gray(_), DecodingResult::U8(d)) => ImageData::Rgb8(gray_to_rgb(&d, 1)),
        (ColorType::Gray(_), DecodingResult::U16(d)) => ImageData::Rgb16(gray_to_rgb(&d, 1)),

        (ColorType::GrayA(_), DecodingResult::U8(d)) => ImageData::Rgb8(gray_to_rgb(&d, 2)),
        (ColorType::GrayA(_), DecodingResult::U16(d)) => ImageData::Rgb16(gray_to_rgb(&d, 2)),

        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}

pub fn write_rgb_f32<W: Write + Seek>(
    writer: W,
    width: usize,
    height: usize,
    pixels: &[[f32; 3]],
) -> Result<(), WriteError> {
    if pixels.len() != width * height {
        return Err(WriteError::PixelCountMismatch {
            width: width,
            height: height,
            expected: width * height,
            found: pixels.len(),
        });
    }

    let data: Vec<f32> = pixels.iter().flatten().copied().collect();
    let mut encoder = tiff::encoder::TiffEncoder::new(writer)?;
    encoder.write_image::<colortype::RGB32Float>(width as u32, height as u32, &data)?;

    Ok(())
}

/// Takes the first sample of each `stride`-sized pixel and repeats it
/// for all three channels.
pub(crate) fn gray_to_rgb<T: Copy>(data: &[T], stride: usize) -> Vec<T> {
    data.chunks_exact(stride).flat_map(|c| [c[0], c[0], c[0]]).collect()
}

/// Keeps the first three samples of each `stride`-sized pixel.
pub(crate) fn drop_alpha<T: Copy>(data: &[T], stride: usize) -> Vec<T> {
    data.chunks_exact(stride).flat_map(|c| [c[0], c[1], c[2]]).collect()
}
