use crate::binary_image::BinaryImage;

/// Pure per-image transform applied to each rasterized mask.
///
/// Implementations are called concurrently from the dispatcher's worker
/// threads and must not touch shared state.
pub trait PixelAlgorithm: Send + Sync {
    /// Short label used in log output
    fn name(&self) -> &str {
        "pixel_algorithm"
    }

    /// Produce a new buffer of the same size as `image`
    fn apply(&self, image: &BinaryImage) -> BinaryImage;
}

impl<F> PixelAlgorithm for F
where
    F: Fn(&BinaryImage) -> BinaryImage + Send + Sync,
{
    fn apply(&self, image: &BinaryImage) -> BinaryImage {
        self(image)
    }
}
