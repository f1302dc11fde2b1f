use std::collections::VecDeque;

use crate::{binary_image::BinaryImage, traits::PixelAlgorithm};

/// Fills background regions that cannot be reached from the image border
#[derive(Debug, Clone, Copy, Default)]
pub struct HoleFill;

impl PixelAlgorithm for HoleFill {
    fn name(&self) -> &str {
        "hole_fill"
    }

    fn apply(&self, image: &BinaryImage) -> BinaryImage {
        fill_holes(image)
    }
}

/// Convert every enclosed background region to foreground.
///
/// Background pixels 4-connected to the border are flooded breadth-first from
/// all border seeds at once; whatever background remains unvisited is a hole.
/// Output is normalized to `{0, 1}`.
pub fn fill_holes(image: &BinaryImage) -> BinaryImage {
    let size = image.size();
    if size.area() == 0 || !image.is_consistent() {
        return BinaryImage::empty();
    }

    let width = size.width as usize;
    let height = size.height as usize;

    // Inverted copy: true where the original is background.
    let background: Vec<bool> = image.data().iter().map(|&p| p == 0).collect();
    let mut reachable = vec![false; background.len()];
    let mut queue = VecDeque::new();

    let mut seed = |row: usize, col: usize, queue: &mut VecDeque<(usize, usize)>| {
        let idx = row * width + col;
        if background[idx] && !reachable[idx] {
            reachable[idx] = true;
            queue.push_back((row, col));
        }
    };

    for col in 0..width {
        seed(0, col, &mut queue);
        seed(height - 1, col, &mut queue);
    }
    for row in 0..height {
        seed(row, 0, &mut queue);
        seed(row, width - 1, &mut queue);
    }

    while let Some((row, col)) = queue.pop_front() {
        if row > 0 {
            seed(row - 1, col, &mut queue);
        }
        if row + 1 < height {
            seed(row + 1, col, &mut queue);
        }
        if col > 0 {
            seed(row, col - 1, &mut queue);
        }
        if col + 1 < width {
            seed(row, col + 1, &mut queue);
        }
    }

    let data = reachable.iter().map(|&outside| u8::from(!outside)).collect();
    BinaryImage::from_raw(size, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageSize;

    fn square_ring(side: usize, lo: usize, hi: usize) -> BinaryImage {
        let mut image = BinaryImage::new(ImageSize::new(side as u32, side as u32));
        for row in lo..=hi {
            for col in lo..=hi {
                if row == lo || row == hi || col == lo || col == hi {
                    image.set_pixel(row, col, 255);
                }
            }
        }
        image
    }

    fn xorshift_image(size: ImageSize, mut state: u32, density: u32) -> BinaryImage {
        let data = (0..size.area())
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                u8::from(state % 100 < density) * 255
            })
            .collect();
        BinaryImage::from_raw(size, data)
    }

    #[test]
    fn test_fills_hollow_square() {
        let result = fill_holes(&square_ring(7, 1, 5));
        assert_eq!(result.data().len(), 49);

        for row in 0..7 {
            for col in 0..7 {
                let outer_frame = row == 0 || row == 6 || col == 0 || col == 6;
                let expected = u8::from(!outer_frame);
                assert_eq!(result.pixel(row, col), expected, "pixel ({row}, {col})");
            }
        }
    }

    #[test]
    fn test_solid_object_unchanged() {
        let mut image = BinaryImage::new(ImageSize::new(5, 5));
        for row in 1..4 {
            for col in 1..4 {
                image.set_pixel(row, col, 255);
            }
        }
        assert_eq!(fill_holes(&image), image.normalized());
    }

    #[test]
    fn test_fills_several_holes_in_one_pass() {
        let mut image = square_ring(9, 1, 7);
        for i in 2..7 {
            image.set_pixel(i, 4, 255);
            image.set_pixel(4, i, 255);
        }

        let result = fill_holes(&image);
        for row in 1..8 {
            for col in 1..8 {
                assert_eq!(result.pixel(row, col), 1);
            }
        }
        assert_eq!(result.count_foreground(), 49);
    }

    #[test]
    fn test_ring_touching_border_has_no_hole() {
        // Open on the left edge, so the interior leaks to the border.
        let mut image = square_ring(6, 0, 4);
        image.set_pixel(2, 0, 0);
        let result = fill_holes(&image);
        assert_eq!(result.pixel(2, 2), 0);
        assert_eq!(result, image.normalized());
    }

    #[test]
    fn test_zero_area_and_inconsistent_inputs() {
        assert!(fill_holes(&BinaryImage::new(ImageSize::new(0, 5))).is_empty());
        let broken = BinaryImage::from_raw(ImageSize::new(4, 4), vec![1; 10]);
        assert!(fill_holes(&broken).is_empty());
    }

    #[test]
    fn test_idempotent() {
        for seed in 1..20u32 {
            let image = xorshift_image(ImageSize::new(13, 9), seed * 7919, 45);
            let once = fill_holes(&image);
            assert_eq!(fill_holes(&once), once, "seed {seed}");
        }
    }

    #[test]
    fn test_border_pixels_preserved() {
        for seed in 1..20u32 {
            let image = xorshift_image(ImageSize::new(11, 8), seed * 104729, 50);
            let normalized = image.normalized();
            let result = fill_holes(&image);
            let (w, h) = (11usize, 8usize);
            for col in 0..w {
                assert_eq!(result.pixel(0, col), normalized.pixel(0, col));
                assert_eq!(result.pixel(h - 1, col), normalized.pixel(h - 1, col));
            }
            for row in 0..h {
                assert_eq!(result.pixel(row, 0), normalized.pixel(row, 0));
                assert_eq!(result.pixel(row, w - 1), normalized.pixel(row, w - 1));
            }
        }
    }
}
