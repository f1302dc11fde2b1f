//! # Binary Mask Processing Library
//!
//! Per-frame 2D point-set masks are rasterized into dense binary buffers,
//! transformed by a pixel algorithm and extracted back into point sets.
//!
//! ## Core Features
//!
//! - **Pixel Algorithms**: hole filling, binary median filtering, small
//!   component removal and nearest-neighbour resizing
//! - **Trait-based Architecture**: any [`PixelAlgorithm`] (including plain
//!   closures) can be dispatched over a collection
//! - **Parallel Dispatch**: per-mask jobs run on a rayon pool while results and
//!   progress are merged in a fixed order
//! - **Operation Registry**: serializable [`MaskOperation`] values selected by
//!   name
//!
//! ## Quick Start
//!
//! ```rust
//! use mask::{HoleFill, MaskCollection, MaskDispatcher, ImageSize, Point2D};
//!
//! let mut masks = MaskCollection::with_image_size(ImageSize::new(16, 16));
//! masks.add_at_time(0, vec![Point2D::new(3, 3), Point2D::new(4, 3)]);
//!
//! let dispatcher = MaskDispatcher::builder()
//!     .preserve_empty_masks(true)
//!     .build();
//! let filled = dispatcher.dispatch(Some(&masks), &HoleFill, None);
//! assert_eq!(filled.total_mask_count(), 1);
//! ```
//!
//! ## Selecting an Operation by Name
//!
//! ```rust
//! use mask::{MaskCollection, MaskDispatcher, MaskOperation};
//!
//! let op = MaskOperation::from_name("Apply Median Filter")?;
//! let mut progress = |percent: u32| println!("{percent}%");
//! let output = op.execute(None, &MaskDispatcher::default(), Some(&mut progress));
//! assert!(output.is_empty());
//! # Ok::<(), mask::MaskError>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod binary_image;
pub mod conversion;
pub mod traits;
pub mod algorithms;
pub mod collection;
pub mod pipeline;
pub mod operation;
pub mod io;

// Re-exports for convenience
pub use error::{MaskError, Result};
pub use types::{ImageSize, Mask, Point2D, TimeFrameIndex, TimeFrameInterval, DEFAULT_IMAGE_SIZE};
pub use binary_image::BinaryImage;
pub use conversion::{to_image, to_mask};
pub use traits::*;
pub use algorithms::*;
pub use collection::MaskCollection;
pub use pipeline::{builder::DispatcherBuilder, DispatchOptions, MaskDispatcher, ProgressCallback};
pub use operation::*;
pub use io::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn hollow_square(size: u32, lo: u32, hi: u32) -> Mask {
        (lo..=hi)
            .flat_map(|y| (lo..=hi).map(move |x| Point2D::new(x, y)))
            .filter(|p| p.x == lo || p.x == hi || p.y == lo || p.y == hi)
            .filter(|p| p.x < size && p.y < size)
            .collect()
    }

    #[test]
    fn test_operation_chain() {
        let mut masks = MaskCollection::with_image_size(ImageSize::new(10, 10));
        masks.add_at_time(0, hollow_square(10, 2, 7));

        let dispatcher = MaskDispatcher::default();
        let filled = MaskOperation::from_name("Fill Mask Holes")
            .expect("registered")
            .execute(Some(&masks), &dispatcher, None);
        let smoothed = MaskOperation::from_name("median_filter")
            .expect("registered")
            .execute(Some(&filled), &dispatcher, None);

        let center = Point2D::new(4, 4);
        assert!(filled.get_at_time(0)[0].len() > masks.get_at_time(0)[0].len());
        assert!(smoothed.get_at_time(0)[0].contains(&center));
    }

    #[test]
    fn test_collection_json_round_trip_through_dispatch() {
        let mut masks = MaskCollection::with_image_size(ImageSize::new(10, 10));
        masks.add_at_time(4, hollow_square(10, 1, 5));
        masks.add_at_time(9, Mask::new());

        let dispatcher = MaskDispatcher::builder().preserve_empty_masks(true).build();
        let filled = dispatcher.dispatch(Some(&masks), &HoleFill, None);

        let reloaded = MaskCollection::from_json(&filled.to_json().expect("serializes"))
            .expect("parses");
        assert_eq!(reloaded, filled);
        assert_eq!(reloaded.get_at_time(9), &[Mask::new()]);
    }
}
