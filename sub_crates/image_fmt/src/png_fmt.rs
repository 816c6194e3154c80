use std::io::Read;

use crate::{
    error::ReadError,
    tiff_fmt::{drop_alpha, gray_to_rgb},
    Image, ImageData,
};

pub fn load<R: Read>(reader: R) -> Result<Image, ReadError> {
    let mut decoder = png::Decoder::new(reader);

    // Palettes become RGB, and sub-8-bit grayscale becomes 8-bit.
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;

    let mut pixel_data = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut pixel_data)?;
    pixel_data.truncate(frame.buffer_size());

    let dimensions = (frame.width as usize, frame.height as usize);
    let (color_type, bit_depth) = reader.output_color_type();

    use png::{BitDepth::*, ColorType::*};
    let stride = match color_type {
        Rgb => 3,
        Rgba => 4,
        Grayscale => 1,
        GrayscaleAlpha => 2,
        Indexed => return Err(ReadError::UnsupportedFeature),
    };

    let data = match bit_depth {
        Eight => ImageData::Rgb8(expand(&pixel_data, color_type, stride)),
        Sixteen => {
            // PNG stores 16-bit samples big-endian.
            let samples: Vec<u16> = pixel_data
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            ImageData::Rgb16(expand(&samples, color_type, stride))
        }
        _ => return Err(ReadError::UnsupportedFeature),
    };

    Ok(Image {
        dimensions: dimensions,
        data: data,
    })
}

fn expand<T: Copy>(samples: &[T], color_type: png::ColorType, stride: usize) -> Vec<T> {
    match color_type {
        png::ColorType::Rgb => samples.to_vec(),
        png::ColorType::Rgba => drop_alpha(samples, stride),
        _ => gray_to_rgb(samples, stride),
    }
}
