use image::{GrayImage, Luma};

use crate::types::ImageSize;

/// Dense row-major binary pixel buffer.
///
/// `pixel(row, col)` lives at `data[row * width + col]`. Any nonzero byte is
/// foreground; [`BinaryImage::normalized`] folds values into `{0, 1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    size: ImageSize,
    data: Vec<u8>,
}

impl BinaryImage {
    /// Zero-filled buffer of `size`
    pub fn new(size: ImageSize) -> Self {
        Self {
            size,
            data: vec![0; size.area()],
        }
    }

    /// Buffer with no pixels, returned by algorithms on invalid input
    pub fn empty() -> Self {
        Self {
            size: ImageSize::new(0, 0),
            data: Vec::new(),
        }
    }

    /// Wrap raw bytes without validating the length.
    ///
    /// Use [`BinaryImage::is_consistent`] to check `data.len() == width * height`.
    pub fn from_raw(size: ImageSize, data: Vec<u8>) -> Self {
        Self { size, data }
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when the buffer holds no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Buffer length agrees with the declared size
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.size.area()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.size.width as usize + col
    }

    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> u8 {
        self.data[self.index(row, col)]
    }

    #[inline]
    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.pixel(row, col) > 0
    }

    #[inline]
    pub fn set_pixel(&mut self, row: usize, col: usize, value: u8) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    /// Copy with every pixel mapped to `{0, 1}`
    pub fn normalized(&self) -> Self {
        Self {
            size: self.size,
            data: self.data.iter().map(|&p| u8::from(p > 0)).collect(),
        }
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&p| p > 0).count()
    }

    /// Render as an 8-bit image with foreground at 255.
    ///
    /// Returns `None` when the buffer length does not match the size.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        let pixels = self
            .data
            .iter()
            .map(|&p| if p > 0 { 255 } else { 0 })
            .collect();
        GrayImage::from_raw(self.size.width, self.size.height, pixels)
    }

    /// Build a normalized buffer from an 8-bit image
    pub fn from_gray_image(image: &GrayImage) -> Self {
        let size = ImageSize::new(image.width(), image.height());
        let data = image
            .pixels()
            .map(|&Luma([value])| u8::from(value > 0))
            .collect();
        Self { size, data }
    }
}
