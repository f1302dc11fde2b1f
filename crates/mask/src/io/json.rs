use std::{fs, path::Path};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    collection::MaskCollection,
    error::Result,
    types::{ImageSize, Mask, TimeFrameIndex},
};

/// On-disk form of a [`MaskCollection`]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MaskCollectionDocument {
    #[serde(default)]
    pub image_size: Option<ImageSize>,
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FrameRecord {
    pub time: TimeFrameIndex,
    pub masks: Vec<Mask>,
}

impl From<&MaskCollection> for MaskCollectionDocument {
    fn from(collection: &MaskCollection) -> Self {
        let frames = collection
            .iter()
            .map(|(time, masks)| FrameRecord {
                time,
                masks: masks.to_vec(),
            })
            .collect();

        Self {
            image_size: collection.image_size(),
            frames,
        }
    }
}

impl From<MaskCollectionDocument> for MaskCollection {
    fn from(document: MaskCollectionDocument) -> Self {
        let mut collection = MaskCollection::new();
        if let Some(size) = document.image_size {
            collection.set_image_size(size);
        }
        for frame in document.frames {
            for mask in frame.masks {
                collection.add_at_time(frame.time, mask);
            }
        }
        collection
    }
}

impl MaskCollection {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&MaskCollectionDocument::from(self))?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let document: MaskCollectionDocument = serde_json::from_str(content)?;
        Ok(document.into())
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
