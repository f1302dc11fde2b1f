use crate::{binary_image::BinaryImage, traits::PixelAlgorithm};

pub const DEFAULT_WINDOW_SIZE: i32 = 3;

/// Binary median filter over a square `window_size` x `window_size` window
#[derive(Debug, Clone, Copy)]
pub struct MedianFilter {
    pub window_size: i32,
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl PixelAlgorithm for MedianFilter {
    fn name(&self) -> &str {
        "median_filter"
    }

    fn apply(&self, image: &BinaryImage) -> BinaryImage {
        median_filter(image, self.window_size)
    }
}

/// A usable window is positive and odd
pub fn is_valid_window_size(window_size: i32) -> bool {
    window_size > 0 && window_size % 2 == 1
}

/// Median-filter a binary image with reflection padding at the borders.
///
/// An even or non-positive `window_size` passes the input through normalized.
/// A buffer whose length disagrees with its size yields an empty image.
pub fn median_filter(image: &BinaryImage, window_size: i32) -> BinaryImage {
    if !image.is_consistent() || image.is_empty() {
        return BinaryImage::empty();
    }
    if !is_valid_window_size(window_size) {
        return image.normalized();
    }

    match window_size {
        3 => majority_3x3(image),
        k => windowed_median(image, k as usize),
    }
}

/// Mirror an out-of-range coordinate back into `[0, len)`.
///
/// `-d` maps to `d - 1` and `len - 1 + d` maps to `len - d`; the final clamp
/// covers windows wider than the image itself.
#[inline]
pub(crate) fn reflect(coord: isize, len: usize) -> usize {
    let len = len as isize;
    let mirrored = if coord < 0 {
        -coord - 1
    } else if coord >= len {
        2 * len - 1 - coord
    } else {
        coord
    };
    mirrored.clamp(0, len - 1) as usize
}

/// 3x3 fast path: foreground iff at least 5 of the 9 samples are foreground
fn majority_3x3(image: &BinaryImage) -> BinaryImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let mut output = BinaryImage::new(image.size());

    for row in 0..height {
        for col in 0..width {
            let mut ones = 0u8;
            for dr in -1..=1isize {
                let r = reflect(row as isize + dr, height);
                for dc in -1..=1isize {
                    let c = reflect(col as isize + dc, width);
                    ones += u8::from(image.is_foreground(r, c));
                }
            }
            if ones >= 5 {
                output.set_pixel(row, col, 1);
            }
        }
    }

    output
}

/// How many window offsets along one axis land on each source index.
///
/// Only nonzero weights are returned. Offsets past a single reflection clamp
/// onto the first or last index, so they are counted in bulk and the cost is
/// bounded by the axis length rather than the window size.
fn axis_weights(center: usize, radius: usize, len: usize) -> Vec<(usize, u64)> {
    let len_i = len as i64;
    let lo = center as i64 - radius as i64;
    let hi = center as i64 + radius as i64;
    let mut weights = vec![0u64; len];

    // Offsets below -len all clamp onto the last index.
    let below = (hi.min(-len_i - 1) - lo + 1).max(0);
    if below > 0 {
        weights[len - 1] += below as u64;
    }
    // Offsets at or past 2*len all clamp onto the first index.
    let above = (hi - lo.max(2 * len_i) + 1).max(0);
    if above > 0 {
        weights[0] += above as u64;
    }
    for coord in lo.max(-len_i)..=hi.min(2 * len_i - 1) {
        weights[reflect(coord as isize, len)] += 1;
    }

    weights
        .into_iter()
        .enumerate()
        .filter(|&(_, weight)| weight > 0)
        .collect()
}

/// General path: foreground iff more than half of the `k * k` reflected
/// samples are foreground
pub(crate) fn windowed_median(image: &BinaryImage, window_size: usize) -> BinaryImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let radius = window_size / 2;
    let half = (window_size as u64 * window_size as u64) / 2;
    let mut output = BinaryImage::new(image.size());

    let row_weights: Vec<_> = (0..height).map(|row| axis_weights(row, radius, height)).collect();
    let col_weights: Vec<_> = (0..width).map(|col| axis_weights(col, radius, width)).collect();

    for (row, rows) in row_weights.iter().enumerate() {
        for (col, cols) in col_weights.iter().enumerate() {
            let mut ones = 0u64;
            for &(r, row_weight) in rows {
                let hits: u64 = cols
                    .iter()
                    .filter(|&&(c, _)| image.is_foreground(r, c))
                    .map(|&(_, col_weight)| col_weight)
                    .sum();
                ones += row_weight * hits;
            }
            if ones > half {
                output.set_pixel(row, col, 1);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageSize;

    fn xorshift_image(size: ImageSize, mut state: u32) -> BinaryImage {
        let data = (0..size.area())
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state & 0xff) as u8 & 0x81
            })
            .collect();
        BinaryImage::from_raw(size, data)
    }

    fn square(size: u32, lo: usize, hi: usize) -> BinaryImage {
        let mut image = BinaryImage::new(ImageSize::new(size, size));
        for row in lo..hi {
            for col in lo..hi {
                image.set_pixel(row, col, 255);
            }
        }
        image
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(3, 5), 3);
        // Single reflection is not enough on a one-pixel axis.
        assert_eq!(reflect(-2, 1), 0);
        assert_eq!(reflect(2, 1), 0);
    }

    #[test]
    fn test_removes_isolated_pixels() {
        let mut image = square(10, 3, 7);
        image.set_pixel(0, 0, 255);
        image.set_pixel(9, 9, 255);
        image.set_pixel(8, 1, 255);

        let result = median_filter(&image, 3);
        assert_eq!(result.pixel(8, 1), 0);
        assert!(result.is_foreground(4, 4));
        assert!(result.is_foreground(5, 5));
        assert!(result.count_foreground() < image.count_foreground());
    }

    #[test]
    fn test_corner_pixel_uses_reflection() {
        // A lone corner pixel is reflected into four of its nine samples.
        let mut image = BinaryImage::new(ImageSize::new(5, 5));
        image.set_pixel(0, 0, 1);
        assert_eq!(median_filter(&image, 3).pixel(0, 0), 0);

        // A 2x2 corner block fills the whole reflected window.
        for (r, c) in [(0, 1), (1, 0), (1, 1)] {
            image.set_pixel(r, c, 1);
        }
        assert_eq!(median_filter(&image, 3).pixel(0, 0), 1);
    }

    #[test]
    fn test_invalid_window_passes_through_normalized() {
        let image = xorshift_image(ImageSize::new(9, 7), 12345);
        for window in [0, -1, -3, 2, 4, 10] {
            assert_eq!(median_filter(&image, window), image.normalized(), "window {window}");
        }
    }

    #[test]
    fn test_size_mismatch_is_empty() {
        let broken = BinaryImage::from_raw(ImageSize::new(3, 3), vec![1; 4]);
        assert!(median_filter(&broken, 3).is_empty());
    }

    #[test]
    fn test_fast_path_matches_general_median() {
        for seed in 1..40u32 {
            let size = ImageSize::new(1 + seed % 11, 1 + (seed * 7) % 9);
            let image = xorshift_image(size, seed.wrapping_mul(2654435761));
            assert_eq!(
                median_filter(&image, 3),
                windowed_median(&image, 3),
                "seed {seed}, size {size}"
            );
        }
    }

    #[test]
    fn test_window_sizes_differ() {
        let mut image = square(11, 3, 8);
        for (r, c) in [(0, 0), (10, 10), (10, 0), (0, 10)] {
            image.set_pixel(r, c, 255);
        }
        let three = median_filter(&image, 3);
        let five = median_filter(&image, 5);
        assert_ne!(three.count_foreground(), five.count_foreground());
    }

    /// Every offset of the window visited one by one
    fn naive_median(image: &BinaryImage, window_size: usize) -> BinaryImage {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let radius = (window_size / 2) as isize;
        let mut output = BinaryImage::new(image.size());
        for row in 0..height {
            for col in 0..width {
                let mut ones = 0;
                for dr in -radius..=radius {
                    for dc in -radius..=radius {
                        let r = reflect(row as isize + dr, height);
                        let c = reflect(col as isize + dc, width);
                        ones += usize::from(image.is_foreground(r, c));
                    }
                }
                if ones > window_size * window_size / 2 {
                    output.set_pixel(row, col, 1);
                }
            }
        }
        output
    }

    #[test]
    fn test_general_path_matches_naive_window() {
        for seed in 1..25u32 {
            let size = ImageSize::new(1 + seed % 7, 1 + (seed * 5) % 6);
            let image = xorshift_image(size, seed.wrapping_mul(2246822519));
            for window in [5, 7, 9, 15] {
                assert_eq!(
                    median_filter(&image, window),
                    naive_median(&image, window as usize),
                    "seed {seed}, size {size}, window {window}"
                );
            }
        }
    }

    #[test]
    fn test_five_window_reflects_at_border() {
        // Foreground: rows 0..2, cols 0..3 of a 6x6 image.
        let mut image = BinaryImage::new(ImageSize::new(6, 6));
        for row in 0..2 {
            for col in 0..3 {
                image.set_pixel(row, col, 1);
            }
        }
        let result = median_filter(&image, 5);

        // Rows and cols 0 and 1 are each sampled twice at the corner: 4 * 5 = 20 of 25.
        assert_eq!(result.pixel(0, 0), 1);
        // Exactly 12 of 25, one short of a majority.
        assert_eq!(result.pixel(0, 2), 0);
        assert_eq!(result.pixel(2, 2), 0);
        assert_eq!(result.pixel(5, 5), 0);
    }

    #[test]
    fn test_huge_window_counts_without_visiting_every_offset() {
        let full = BinaryImage::from_raw(ImageSize::new(4, 4), vec![1; 16]);
        assert_eq!(median_filter(&full, i32::MAX), full);

        let mut single = BinaryImage::new(ImageSize::new(4, 4));
        single.set_pixel(1, 2, 1);
        assert_eq!(median_filter(&single, i32::MAX).count_foreground(), 0);

        // Clamped offsets pile onto the first and last rows and columns.
        let mut corners = BinaryImage::new(ImageSize::new(3, 3));
        for (r, c) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
            corners.set_pixel(r, c, 1);
        }
        assert_eq!(
            median_filter(&corners, 1_000_001),
            BinaryImage::from_raw(ImageSize::new(3, 3), vec![1; 9])
        );
    }

    #[test]
    fn test_large_window_on_tiny_image() {
        let image = BinaryImage::from_raw(ImageSize::new(2, 1), vec![1, 1]);
        let result = median_filter(&image, 7);
        assert_eq!(result.data(), &[1, 1]);
    }
}
