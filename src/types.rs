use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

// Dense class index -> category name, ordered by index
pub type NameTable = BTreeMap<usize, String>;

/// The subset of a COCO annotation document used for conversion.
///
/// Any other top-level or per-record fields (`info`, `licenses`, `area`,
/// `segmentation`, ...) are ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CocoDocument {
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoCategory {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoImage {
    pub id: i64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoAnnotation {
    pub image_id: i64,
    pub category_id: i64,
    pub bbox: [f64; 4], // [x, y, width, height], top-left origin, pixels
}

/// Category id -> class index lookup together with the names written to dataset.yaml
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    pub id_to_index: HashMap<i64, usize>,
    pub names: NameTable,
}

impl CategoryIndex {
    pub fn class_index(&self, category_id: i64) -> Option<usize> {
        self.id_to_index.get(&category_id).copied()
    }
}

/// A bounding box in YOLO's normalized center format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub class_index: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl YoloBox {
    /// Normalize an absolute COCO `[x, y, w, h]` box against the image size.
    pub fn from_coco_bbox(
        class_index: usize,
        bbox: [f64; 4],
        img_width: u32,
        img_height: u32,
    ) -> Self {
        let [x, y, w, h] = bbox;
        let img_width = img_width as f64;
        let img_height = img_height as f64;
        Self {
            class_index,
            x_center: (x + w / 2.0) / img_width,
            y_center: (y + h / 2.0) / img_height,
            width: w / img_width,
            height: h / img_height,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.x_center, self.y_center, self.width, self.height]
    }

    /// True when all four values lie in the closed interval [0, 1]
    pub fn is_normalized(&self) -> bool {
        self.values().iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Render as a label line; `None` keeps the shortest round-trip float text.
    pub fn to_line(&self, precision: Option<usize>) -> String {
        let [xc, yc, w, h] = self.values();
        match precision {
            Some(p) => format!(
                "{} {:.p$} {:.p$} {:.p$} {:.p$}",
                self.class_index,
                xc,
                yc,
                w,
                h,
                p = p
            ),
            None => format!("{} {} {} {} {}", self.class_index, xc, yc, w, h),
        }
    }
}

/// Non-fatal anomaly met while converting; the run carries on after recording it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionWarning {
    OutOfBounds {
        image_id: i64,
        category_id: i64,
        values: [f64; 4],
    },
    MissingImage {
        path: PathBuf,
    },
    DuplicateLabelStem {
        image_id: i64,
        label_path: PathBuf,
    },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::OutOfBounds {
                image_id,
                category_id,
                values,
            } => write!(
                f,
                "Invalid coordinates in image {} (category {}): {:?}",
                image_id, category_id, values
            ),
            ConversionWarning::MissingImage { path } => {
                write!(f, "Image file not found: {}", path.display())
            }
            ConversionWarning::DuplicateLabelStem {
                image_id,
                label_path,
            } => write!(
                f,
                "Image {} overwrites label file {} written for an earlier image",
                image_id,
                label_path.display()
            ),
        }
    }
}

// Output of a finished conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionSummary {
    pub converted_images: usize,
    pub total_annotations: usize,
    pub written_annotations: usize,
    pub names: NameTable,
    pub warnings: Vec<ConversionWarning>,
    pub output_dir: PathBuf,
    pub dataset_yaml: PathBuf,
}

impl ConversionSummary {
    pub fn skipped_annotations(&self) -> usize {
        self.total_annotations - self.written_annotations
    }

    pub fn missing_images(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ConversionWarning::MissingImage { .. }))
            .count()
    }

    pub fn log_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Successfully converted {} images", self.converted_images);
        log::info!(
            "Annotations written: {} of {}",
            self.written_annotations,
            self.total_annotations
        );
        log::info!("Total categories: {}", self.names.len());
        log::info!("Category names: {:?}", self.names);
        log::info!("Output directory: {}", self.output_dir.display());

        let skipped = self.skipped_annotations();
        let missing = self.missing_images();
        if skipped > 0 || missing > 0 {
            log::warn!(
                "Skipped {} out-of-bounds annotations and {} missing image files",
                skipped,
                missing
            );
        }
    }
}

/// Paths of the directories a run writes into
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub labels_dir: PathBuf,
    pub images_dir: Option<PathBuf>,
}
