use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaskError {
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("Unknown mask operation: {0}")]
    UnknownOperation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MaskError>;
