use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canvas size used when a collection does not carry a usable image size.
pub const DEFAULT_IMAGE_SIZE: ImageSize = ImageSize {
    width: 256,
    height: 256,
};

/// Dimensions of the pixel grid a mask lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are positive
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Number of pixels in a buffer of this size
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, point: Point2D) -> bool {
        point.x < self.width && point.y < self.height
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Integer pixel coordinate, `x` is the column and `y` the row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Point2D {
    pub x: u32,
    pub y: u32,
}

impl Point2D {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point2D {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Foreground pixels of one object at one time frame.
///
/// Order carries no meaning and duplicates are tolerated; both collapse when
/// the mask is rasterized.
pub type Mask = Vec<Point2D>;

/// Position of a frame on the collection's time axis
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct TimeFrameIndex(pub i64);

impl TimeFrameIndex {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for TimeFrameIndex {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TimeFrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of frames `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeFrameInterval {
    pub start: TimeFrameIndex,
    pub end: TimeFrameIndex,
}

impl TimeFrameInterval {
    pub fn new(start: impl Into<TimeFrameIndex>, end: impl Into<TimeFrameIndex>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, time: TimeFrameIndex) -> bool {
        self.start <= time && time <= self.end
    }
}
