use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::{binary_image::BinaryImage, traits::PixelAlgorithm};

pub const DEFAULT_COMPONENT_THRESHOLD: usize = 10;

/// Drops 8-connected foreground components smaller than `threshold` pixels
#[derive(Debug, Clone, Copy)]
pub struct SmallComponentFilter {
    pub threshold: usize,
}

impl Default for SmallComponentFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COMPONENT_THRESHOLD,
        }
    }
}

impl PixelAlgorithm for SmallComponentFilter {
    fn name(&self) -> &str {
        "small_component_filter"
    }

    fn apply(&self, image: &BinaryImage) -> BinaryImage {
        remove_small_components(image, self.threshold)
    }
}

/// Keep only components with at least `threshold` pixels.
///
/// Diagonal neighbours are connected. Output is normalized to `{0, 1}`.
pub fn remove_small_components(image: &BinaryImage, threshold: usize) -> BinaryImage {
    if image.is_empty() {
        return BinaryImage::empty();
    }
    let Some(gray) = image.to_gray_image() else {
        return BinaryImage::empty();
    };

    let labels = connected_components(&gray, Connectivity::Eight, Luma([0u8]));

    let mut sizes: Vec<usize> = Vec::new();
    for &Luma([label]) in labels.pixels() {
        let label = label as usize;
        if label == 0 {
            continue;
        }
        if sizes.len() <= label {
            sizes.resize(label + 1, 0);
        }
        sizes[label] += 1;
    }

    let data = labels
        .pixels()
        .map(|&Luma([label])| u8::from(label != 0 && sizes[label as usize] >= threshold))
        .collect();
    BinaryImage::from_raw(image.size(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageSize;

    fn image_with(size: ImageSize, pixels: &[(usize, usize)]) -> BinaryImage {
        let mut image = BinaryImage::new(size);
        for &(row, col) in pixels {
            image.set_pixel(row, col, 255);
        }
        image
    }

    #[test]
    fn test_removes_small_keeps_large() {
        let mut pixels = Vec::new();
        for row in 1..4 {
            for col in 1..4 {
                pixels.push((row, col));
            }
        }
        pixels.extend([(1, 7), (1, 8)]);
        for row in 7..9 {
            for col in 1..3 {
                pixels.push((row, col));
            }
        }
        pixels.push((8, 8));
        let image = image_with(ImageSize::new(10, 10), &pixels);

        let result = remove_small_components(&image, 4);
        assert_eq!(result.count_foreground(), 13);
        assert_eq!(result.pixel(1, 7), 0);
        assert_eq!(result.pixel(8, 8), 0);
        assert_eq!(result.pixel(7, 1), 1);
    }

    #[test]
    fn test_threshold_one_keeps_everything() {
        let image = image_with(ImageSize::new(5, 5), &[(0, 0), (2, 2), (4, 4), (0, 3), (0, 4)]);
        assert_eq!(remove_small_components(&image, 1), image.normalized());
    }

    #[test]
    fn test_diagonal_pixels_form_one_component() {
        let image = image_with(ImageSize::new(5, 5), &[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let result = remove_small_components(&image, 4);
        assert_eq!(result.count_foreground(), 4);
    }

    #[test]
    fn test_blank_and_inconsistent_inputs() {
        let blank = BinaryImage::new(ImageSize::new(6, 6));
        assert_eq!(remove_small_components(&blank, 3).count_foreground(), 0);
        let broken = BinaryImage::from_raw(ImageSize::new(6, 6), vec![1; 5]);
        assert!(remove_small_components(&broken, 3).is_empty());
    }
}
