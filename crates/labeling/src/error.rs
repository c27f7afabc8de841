//! Labeling error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Labeling specific error
#[derive(Debug, Error)]
pub enum LabelingError {
    /// Image could not be read or decoded
    #[error("failed to read image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// RGB and segmentation frames must share dimensions
    #[error("dimension mismatch: rgb {rgb_width}x{rgb_height} vs seg {seg_width}x{seg_height}")]
    DimensionMismatch {
        rgb_width: u32,
        rgb_height: u32,
        seg_width: u32,
        seg_height: u32,
    },

    /// Dataset output failure
    #[error("dataset write error at '{path}': {source}")]
    DatasetWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl LabelingError {
    /// Create image read error
    pub fn image_read(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageRead {
            path: path.into(),
            source,
        }
    }

    /// Create dataset write error
    pub fn dataset_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DatasetWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, LabelingError>;
