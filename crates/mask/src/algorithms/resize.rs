use crate::{
    binary_image::BinaryImage,
    conversion::{to_image, to_mask},
    types::{ImageSize, Mask, Point2D},
};

/// Source pixel sampled for destination pixel `dest` along one axis.
///
/// Uses the half-pixel-center convention:
/// `floor((dest + 0.5) * scale - 0.5)` clamped to `[0, source_len - 1]`.
#[inline]
pub fn nearest_source_index(dest: u32, scale: f64, source_len: u32) -> u32 {
    let mapped = ((f64::from(dest) + 0.5) * scale - 0.5).floor();
    mapped.clamp(0.0, f64::from(source_len.saturating_sub(1))) as u32
}

/// Nearest-neighbour resample of a binary buffer to `dest`
pub fn resize_nearest(image: &BinaryImage, dest: ImageSize) -> BinaryImage {
    let source = image.size();
    if !source.is_valid() || !dest.is_valid() || !image.is_consistent() {
        return BinaryImage::empty();
    }

    let scale_x = f64::from(source.width) / f64::from(dest.width);
    let scale_y = f64::from(source.height) / f64::from(dest.height);

    let columns: Vec<usize> = (0..dest.width)
        .map(|dx| nearest_source_index(dx, scale_x, source.width) as usize)
        .collect();

    let mut output = BinaryImage::new(dest);
    for dy in 0..dest.height {
        let sy = nearest_source_index(dy, scale_y, source.height) as usize;
        for (dx, &sx) in columns.iter().enumerate() {
            if image.is_foreground(sy, sx) {
                output.set_pixel(dy as usize, dx, 1);
            }
        }
    }
    output
}

/// Remap a mask from the `source` grid onto the `dest` grid.
///
/// The mask is rasterized, resampled and extracted again so that coverage
/// stays binary; point coordinates are never scaled directly.
pub fn resize_mask(mask: &[Point2D], source: ImageSize, dest: ImageSize) -> Mask {
    if mask.is_empty() || !source.is_valid() || !dest.is_valid() {
        return Mask::new();
    }
    if source == dest {
        return mask.to_vec();
    }

    to_mask(&resize_nearest(&to_image(mask, source), dest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_returns_input_unchanged() {
        let size = ImageSize::new(20, 10);
        // Duplicates and out-of-range points survive: no rasterization happens.
        let mask = vec![Point2D::new(3, 4), Point2D::new(3, 4), Point2D::new(50, 50)];
        assert_eq!(resize_mask(&mask, size, size), mask);
    }

    #[test]
    fn test_degenerate_inputs_are_empty() {
        let mask = vec![Point2D::new(1, 1)];
        assert!(resize_mask(&[], ImageSize::new(4, 4), ImageSize::new(8, 8)).is_empty());
        assert!(resize_mask(&mask, ImageSize::new(0, 4), ImageSize::new(8, 8)).is_empty());
        assert!(resize_mask(&mask, ImageSize::new(4, 4), ImageSize::new(8, 0)).is_empty());
    }

    #[test]
    fn test_half_pixel_convention_downscale() {
        // 100 -> 50: scale 2, so destination d samples source floor(2d + 0.5) = 2d.
        for d in 0..50 {
            assert_eq!(nearest_source_index(d, 2.0, 100), 2 * d);
        }

        let source = ImageSize::new(100, 100);
        let dest = ImageSize::new(50, 50);
        assert_eq!(
            resize_mask(&[Point2D::new(40, 40)], source, dest),
            vec![Point2D::new(20, 20)]
        );
        // Odd source pixels are never sampled on a 2x downscale.
        assert!(resize_mask(&[Point2D::new(41, 41)], source, dest).is_empty());
    }

    #[test]
    fn test_half_pixel_convention_upscale() {
        // 50 -> 100: scale 0.5, d samples floor(0.5d - 0.25), clamped at 0.
        let expected = [0, 0, 0, 1, 1, 2, 2, 3];
        for (d, &s) in expected.iter().enumerate() {
            assert_eq!(nearest_source_index(d as u32, 0.5, 50), s, "dest {d}");
        }
        assert_eq!(nearest_source_index(99, 0.5, 50), 49);

        let resized = resize_mask(
            &[Point2D::new(10, 10)],
            ImageSize::new(50, 50),
            ImageSize::new(100, 100),
        );
        assert_eq!(
            resized,
            vec![
                Point2D::new(21, 21),
                Point2D::new(22, 21),
                Point2D::new(21, 22),
                Point2D::new(22, 22),
            ]
        );
    }

    #[test]
    fn test_non_uniform_scale() {
        let mask: Mask = (0..4).flat_map(|y| (0..4).map(move |x| Point2D::new(x, y))).collect();
        let resized = resize_mask(&mask, ImageSize::new(8, 8), ImageSize::new(4, 2));
        // Source block covers columns 0..4, rows 0..4; x samples 0,2,4,6 and y samples 1,5.
        assert_eq!(resized, vec![Point2D::new(0, 0), Point2D::new(1, 0)]);
    }
}
