use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    algorithms::resize_mask,
    error::{MaskError, Result},
    types::{ImageSize, Mask, TimeFrameIndex, TimeFrameInterval},
};

/// Masks stored per time frame, sharing one canonical image size.
///
/// Frames iterate in ascending time order and masks within a frame keep their
/// insertion order. A frame holding an empty mask is distinct from a frame
/// with no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskCollection {
    frames: BTreeMap<TimeFrameIndex, Vec<Mask>>,
    image_size: Option<ImageSize>,
}

impl MaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_size(image_size: ImageSize) -> Self {
        Self {
            frames: BTreeMap::new(),
            image_size: Some(image_size),
        }
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    pub fn set_image_size(&mut self, image_size: ImageSize) {
        self.image_size = Some(image_size);
    }

    /// Append `mask` to the frame at `time`, creating the frame if needed
    pub fn add_at_time(&mut self, time: impl Into<TimeFrameIndex>, mask: Mask) {
        self.frames.entry(time.into()).or_default().push(mask);
    }

    /// Masks at `time`, empty when the frame does not exist
    pub fn get_at_time(&self, time: impl Into<TimeFrameIndex>) -> &[Mask] {
        self.frames
            .get(&time.into())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_time(&self, time: impl Into<TimeFrameIndex>) -> bool {
        self.frames.contains_key(&time.into())
    }

    pub fn times_with_data(&self) -> impl Iterator<Item = TimeFrameIndex> + '_ {
        self.frames.keys().copied()
    }

    /// `(time, masks)` pairs in ascending time order
    pub fn iter(&self) -> impl Iterator<Item = (TimeFrameIndex, &[Mask])> + '_ {
        self.frames.iter().map(|(&time, masks)| (time, masks.as_slice()))
    }

    pub fn time_count(&self) -> usize {
        self.frames.len()
    }

    pub fn total_mask_count(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Remove every mask at `time`. Returns false if the frame did not exist.
    pub fn clear_at_time(&mut self, time: impl Into<TimeFrameIndex>) -> bool {
        self.frames.remove(&time.into()).is_some()
    }

    /// Remove one mask; the frame disappears with its last mask
    pub fn clear_mask_at(&mut self, time: impl Into<TimeFrameIndex>, index: usize) -> bool {
        let time = time.into();
        let Some(masks) = self.frames.get_mut(&time) else {
            return false;
        };
        if index >= masks.len() {
            return false;
        }
        masks.remove(index);
        if masks.is_empty() {
            self.frames.remove(&time);
        }
        true
    }

    /// Rescale every stored mask onto a new canvas size.
    ///
    /// Masks are resampled with nearest-neighbour rasterization. Without a
    /// previous size there is nothing to scale from, so only the size is
    /// recorded. A mask that resamples to no pixels is removed, together with
    /// its frame when that frame has nothing left; masks that were already
    /// empty are kept.
    pub fn change_image_size(&mut self, image_size: ImageSize) -> Result<()> {
        if !image_size.is_valid() {
            return Err(MaskError::InvalidImageSize {
                width: image_size.width,
                height: image_size.height,
            });
        }

        let Some(current) = self.image_size.filter(ImageSize::is_valid) else {
            warn!(
                "No image size set for mask collection; recording {} without rescaling",
                image_size
            );
            self.image_size = Some(image_size);
            return Ok(());
        };

        if current == image_size {
            debug!("Image size is already {}; nothing to rescale", image_size);
            return Ok(());
        }

        let mut dropped = 0;
        for masks in self.frames.values_mut() {
            let before = masks.len();
            *masks = std::mem::take(masks)
                .into_iter()
                .filter_map(|mask| {
                    if mask.is_empty() {
                        return Some(mask);
                    }
                    let resized = resize_mask(&mask, current, image_size);
                    (!resized.is_empty()).then_some(resized)
                })
                .collect();
            dropped += before - masks.len();
        }
        self.frames.retain(|_, masks| !masks.is_empty());

        if dropped > 0 {
            debug!(dropped, "Removed masks with no pixels left after rescaling to {}", image_size);
        }
        self.image_size = Some(image_size);
        Ok(())
    }

    /// Copy all masks inside `interval` into `target`. Returns the mask count.
    pub fn copy_to(&self, target: &mut MaskCollection, interval: TimeFrameInterval) -> usize {
        if !interval.is_valid() {
            warn!(
                "Interval start ({}) must not exceed end ({})",
                interval.start, interval.end
            );
            return 0;
        }

        let mut copied = 0;
        for (&time, masks) in self.frames.range(interval.start..=interval.end) {
            for mask in masks {
                target.add_at_time(time, mask.clone());
                copied += 1;
            }
        }
        copied
    }

    /// Move all masks inside `interval` into `target`. Returns the mask count.
    pub fn move_to(&mut self, target: &mut MaskCollection, interval: TimeFrameInterval) -> usize {
        let moved = self.copy_to(target, interval);
        if moved > 0 {
            self.frames
                .retain(|&time, _| !interval.contains(time));
        }
        moved
    }
}
