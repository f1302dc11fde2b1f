use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr, VariantNames};
use tracing::warn;

use crate::{
    algorithms::{
        is_valid_window_size, HoleFill, MedianFilter, SmallComponentFilter,
        DEFAULT_COMPONENT_THRESHOLD, DEFAULT_WINDOW_SIZE,
    },
    collection::MaskCollection,
    error::{MaskError, Result},
    pipeline::{MaskDispatcher, ProgressCallback},
    types::{ImageSize, DEFAULT_IMAGE_SIZE},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HoleFillParams {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MedianFilterParams {
    /// Side of the square window; must be positive and odd
    pub window_size: i32,
}

impl Default for MedianFilterParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComponentFilterParams {
    /// Components with fewer pixels than this are removed
    #[schemars(range(min = 1))]
    pub threshold: usize,
}

impl Default for ComponentFilterParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_COMPONENT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ResizeParams {
    #[schemars(range(min = 1))]
    pub width: u32,
    #[schemars(range(min = 1))]
    pub height: u32,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_SIZE.width,
            height: DEFAULT_IMAGE_SIZE.height,
        }
    }
}

impl ResizeParams {
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }
}

/// A collection-level mask operation together with its parameters
#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq
)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaskOperation {
    /// Fill background regions enclosed by each mask
    FillHoles(HoleFillParams),

    /// Binary median filter with reflection padding
    MedianFilter(MedianFilterParams),

    /// Drop 8-connected components below a pixel count
    RemoveSmallComponents(ComponentFilterParams),

    /// Resample every mask onto a new canvas size
    Resize(ResizeParams),
}

impl MaskOperation {
    /// Get the JSON schema for all operations
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(MaskOperation)
    }

    /// Machine names accepted by [`str::parse`]
    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    /// Human-facing name shown when picking an operation
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::FillHoles(_) => "Fill Mask Holes",
            Self::MedianFilter(_) => "Apply Median Filter",
            Self::RemoveSmallComponents(_) => "Remove Small Connected Components",
            Self::Resize(_) => "Resize Masks",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FillHoles(_) => "Fill enclosed background regions inside each mask",
            Self::MedianFilter(_) => "Smooth each mask with a binary median filter",
            Self::RemoveSmallComponents(_) => "Remove connected pieces smaller than a pixel threshold",
            Self::Resize(_) => "Resample masks to a new image size with nearest-neighbour lookup",
        }
    }

    /// Default-parameter operation for a display name such as "Fill Mask Holes"
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::iter().find(|op| op.display_name() == name)
    }

    /// Resolve either a display name or a snake_case machine name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_display_name(name)
            .or_else(|| name.parse().ok())
            .ok_or_else(|| MaskError::UnknownOperation(name.to_string()))
    }

    /// Run the operation over `source` and return a new collection
    pub fn execute(
        &self,
        source: Option<&MaskCollection>,
        dispatcher: &MaskDispatcher,
        progress: Option<ProgressCallback<'_>>,
    ) -> MaskCollection {
        match self {
            Self::FillHoles(_) => dispatcher.dispatch(source, &HoleFill, progress),
            Self::MedianFilter(params) => {
                if !is_valid_window_size(params.window_size) {
                    warn!(
                        "Median window size {} is not a positive odd number; masks pass through unfiltered",
                        params.window_size
                    );
                }
                let filter = MedianFilter {
                    window_size: params.window_size,
                };
                dispatcher.dispatch(source, &filter, progress)
            }
            Self::RemoveSmallComponents(params) => {
                let filter = SmallComponentFilter {
                    threshold: params.threshold,
                };
                dispatcher.dispatch(source, &filter, progress)
            }
            Self::Resize(params) => dispatcher.resize(source, params.size(), progress),
        }
    }
}
