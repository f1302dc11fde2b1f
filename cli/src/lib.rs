use image::GrayImage;
use mask::{
    pipeline::canonical_size, to_image, ImageSize, Mask, MaskCollection, MaskDispatcher,
    MaskOperation, TimeFrameIndex,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    MaskError(#[from] mask::MaskError),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error("No masks stored at time {0}")]
    NoMasksAtTime(TimeFrameIndex),
    #[error("Cannot render an image of size {0}")]
    UnrenderableSize(ImageSize),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A processing run: which collection to read, what to apply, where to write
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProcessingConfig {
    /// Path of the input mask collection (JSON)
    pub input: String,
    /// Path the processed collection is written to (JSON)
    pub output: String,
    /// Keep empty masks as empty outputs instead of skipping them
    #[serde(default)]
    pub preserve_empty_masks: bool,
    /// Worker threads for the parallel phase; all cores when absent
    #[serde(default)]
    pub threads: Option<usize>,
    /// Operations applied in order, each to the previous result
    #[serde(default)]
    pub operations: Vec<MaskOperation>,
}

impl ProcessingConfig {
    /// Load ProcessingConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load ProcessingConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load ProcessingConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load ProcessingConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert ProcessingConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Convert ProcessingConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save ProcessingConfig next to its format's extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    pub fn dispatcher(&self) -> MaskDispatcher {
        let builder = MaskDispatcher::builder().preserve_empty_masks(self.preserve_empty_masks);
        let builder = match self.threads {
            Some(threads) => builder.num_threads(threads),
            None => builder,
        };
        builder.build()
    }
}

/// Apply `operations` in sequence, feeding each result into the next.
///
/// `on_progress` receives the operation's position, the operation and its
/// completion percentage.
pub fn apply_operations<F>(
    collection: &MaskCollection,
    operations: &[MaskOperation],
    dispatcher: &MaskDispatcher,
    mut on_progress: F,
) -> MaskCollection
where
    F: FnMut(usize, &MaskOperation, u32),
{
    let mut current = collection.clone();
    for (index, operation) in operations.iter().enumerate() {
        let mut forward = |percent: u32| on_progress(index, operation, percent);
        current = operation.execute(Some(&current), dispatcher, Some(&mut forward));
    }
    current
}

/// Union of every mask at `time`, rasterized on the collection's canvas
pub fn render_frame(
    collection: &MaskCollection,
    time: TimeFrameIndex,
) -> Result<GrayImage, CliError> {
    if !collection.has_time(time) {
        return Err(CliError::NoMasksAtTime(time));
    }

    let size = canonical_size(Some(collection));
    let points: Mask = collection
        .get_at_time(time)
        .iter()
        .flatten()
        .copied()
        .collect();

    to_image(&points, size)
        .to_gray_image()
        .ok_or(CliError::UnrenderableSize(size))
}
