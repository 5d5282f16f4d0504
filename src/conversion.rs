use log::warn;
use std::collections::HashMap;

use crate::types::{
    CategoryIndex, CocoAnnotation, CocoCategory, CocoImage, ConversionWarning, YoloBox,
};

/// Label lines for one image plus whatever was dropped on the way
#[derive(Debug, Default)]
pub struct ImageLabels {
    pub lines: Vec<String>,
    pub warnings: Vec<ConversionWarning>,
}

impl ImageLabels {
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }
}

/// Assign dense class indices to categories in the order they appear in the input.
///
/// The Nth category gets index N regardless of its COCO id, and its name is
/// recorded at that index. A repeated category id maps to its last occurrence,
/// while every occurrence keeps its slot in the name table.
pub fn build_category_index(categories: &[CocoCategory]) -> CategoryIndex {
    let mut index = CategoryIndex::default();
    for (idx, category) in categories.iter().enumerate() {
        index.id_to_index.insert(category.id, idx);
        index.names.insert(idx, category.name.clone());
    }
    index
}

/// Group annotations by image id, keeping input order within each group
pub fn group_annotations_by_image(
    annotations: &[CocoAnnotation],
) -> HashMap<i64, Vec<&CocoAnnotation>> {
    let mut groups: HashMap<i64, Vec<&CocoAnnotation>> = HashMap::new();
    for annotation in annotations {
        groups.entry(annotation.image_id).or_default().push(annotation);
    }
    groups
}

/// Convert the annotations of one image to YOLO label lines.
///
/// Boxes whose normalized values leave [0, 1] are dropped with a warning.
/// Annotations must already have been validated against `index`; one whose
/// category is still unknown is dropped as well.
pub fn convert_image_annotations(
    image: &CocoImage,
    annotations: &[&CocoAnnotation],
    index: &CategoryIndex,
    precision: Option<usize>,
) -> ImageLabels {
    let mut labels = ImageLabels {
        lines: Vec::with_capacity(annotations.len()),
        warnings: Vec::new(),
    };

    for annotation in annotations {
        let Some(class_index) = index.class_index(annotation.category_id) else {
            continue;
        };

        let yolo_box =
            YoloBox::from_coco_bbox(class_index, annotation.bbox, image.width, image.height);
        if !yolo_box.is_normalized() {
            let warning = ConversionWarning::OutOfBounds {
                image_id: image.id,
                category_id: annotation.category_id,
                values: yolo_box.values(),
            };
            warn!("{}", warning);
            labels.warnings.push(warning);
            continue;
        }

        labels.lines.push(yolo_box.to_line(precision));
    }

    labels
}
