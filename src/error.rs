use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fields every COCO document must carry at the top level.
pub const REQUIRED_FIELDS: [&str; 3] = ["images", "annotations", "categories"];

/// The input document is malformed or structurally incomplete.
///
/// Always raised before anything is written under the output directory.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("COCO JSON must be an object at the top level")]
    NotAnObject,
    #[error("Missing required fields in COCO JSON: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Malformed records in COCO JSON: {0}")]
    MalformedRecords(#[source] serde_json::Error),
    #[error("image {image_id} has no usable file name: {file_name:?}")]
    InvalidFileName { image_id: i64, file_name: String },
    #[error("image {image_id} has invalid size {width}x{height}")]
    InvalidImageSize {
        image_id: i64,
        width: u32,
        height: u32,
    },
    #[error("annotation on image {image_id} references unknown category id {category_id}")]
    UnknownCategory { image_id: i64, category_id: i64 },
}

/// Error type for a conversion run.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize dataset.yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConversionError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConversionError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns the validation error when the run was rejected before any output.
    pub fn as_invalid_input(&self) -> Option<&InvalidInputError> {
        match self {
            ConversionError::InvalidInput(e) => Some(e),
            _ => None,
        }
    }
}
