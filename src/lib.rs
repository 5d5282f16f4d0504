//! COCO to YOLO format converter
//!
//! This library converts object-detection annotations from a COCO JSON file to
//! YOLO label files, optionally copying the referenced images and writing a
//! `dataset.yaml` descriptor.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, ConvertOptions};
pub use dataset::{convert_coco_to_yolo, convert_with_options};
pub use error::{ConversionError, InvalidInputError};
pub use types::{
    CocoAnnotation, CocoCategory, CocoDocument, CocoImage, ConversionSummary, ConversionWarning,
    NameTable, YoloBox,
};
