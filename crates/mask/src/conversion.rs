use crate::{
    binary_image::BinaryImage,
    types::{ImageSize, Mask, Point2D},
};

/// Rasterize a mask onto a zero-filled buffer of `size`.
///
/// Points outside the buffer are dropped.
pub fn to_image(mask: &[Point2D], size: ImageSize) -> BinaryImage {
    let mut image = BinaryImage::new(size);
    for &point in mask {
        if size.contains(point) {
            image.set_pixel(point.y as usize, point.x as usize, 1);
        }
    }
    image
}

/// Collect every foreground pixel in row-major scan order
pub fn to_mask(image: &BinaryImage) -> Mask {
    let width = image.width() as usize;
    if width == 0 {
        return Mask::new();
    }

    image
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value > 0)
        .map(|(idx, _)| Point2D::new((idx % width) as u32, (idx / width) as u32))
        .collect()
}
