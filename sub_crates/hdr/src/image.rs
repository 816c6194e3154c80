use crate::error::Error;

/// An RGB image with floating point channels.
///
/// Pixels are stored row-major, `width * height` of them.  The image
/// can't be modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<[f32; 3]>, // Vec<[r, g, b]>
}

impl Image {
    pub fn new(width: usize, height: usize, pixels: Vec<[f32; 3]>) -> Result<Image, Error> {
        if pixels.len() != width * height {
            return Err(Error::PixelCountMismatch {
                width: width,
                height: height,
                expected: width * height,
                found: pixels.len(),
            });
        }

        Ok(Image {
            width: width,
            height: height,
            pixels: pixels,
        })
    }

    /// Creates an image with every pixel set to `color`.
    pub fn from_pixel(width: usize, height: usize, color: [f32; 3]) -> Image {
        Image {
            width: width,
            height: height,
            pixels: vec![color; width * height],
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline(always)]
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[[f32; 3]] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_pixel_count() {
        assert!(Image::new(2, 2, vec![[0.0; 3]; 4]).is_ok());
        assert_eq!(
            Image::new(3, 2, vec![[0.0; 3]; 4]),
            Err(Error::PixelCountMismatch {
                width: 3,
                height: 2,
                expected: 6,
                found: 4,
            })
        );
    }

    #[test]
    fn rows_are_row_major() {
        let img = Image::new(
            2,
            2,
            vec![[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]],
        )
        .unwrap();
        assert_eq!(img.pixel(1, 0), [1.0; 3]);
        assert_eq!(img.pixel(0, 1), [2.0; 3]);
        assert_eq!(img.pixel(1, 1), [3.0; 3]);
        assert_eq!(img.pixels()[2..], [[2.0; 3], [3.0; 3]]);
    }
}
