use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;

use crate::config::ConvertOptions;
use crate::conversion::{
    build_category_index, convert_image_annotations, group_annotations_by_image,
};
use crate::error::ConversionError;
use crate::io::{
    copy_image, create_dataset_yaml, label_path, read_coco_document, setup_output_directories,
    validate_document, write_label_file,
};
use crate::types::{ConversionSummary, ConversionWarning};
use crate::utils::create_progress_bar;

/// Convert a COCO annotation file into a YOLO dataset under `output_dir`.
///
/// Writes `labels/<stem>.txt` for every image, copies images into `images/`
/// when `image_dir` is given, and finishes with `dataset.yaml`.
pub fn convert_coco_to_yolo(
    coco_json_path: &Path,
    output_dir: &Path,
    image_dir: Option<&Path>,
) -> Result<ConversionSummary, ConversionError> {
    let options = ConvertOptions {
        image_dir: image_dir.map(Path::to_path_buf),
        ..ConvertOptions::default()
    };
    convert_with_options(coco_json_path, output_dir, &options)
}

/// Main conversion pipeline.
///
/// The input is read and validated in full before anything is created under
/// `output_dir`. Once writing starts, an I/O failure aborts the run and leaves
/// whatever was already written in place.
pub fn convert_with_options(
    coco_json_path: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<ConversionSummary, ConversionError> {
    info!("Reading COCO annotations from {}", coco_json_path.display());
    let document = read_coco_document(coco_json_path)?;
    validate_document(&document)?;
    info!(
        "Found {} images, {} annotations, {} categories.",
        document.images.len(),
        document.annotations.len(),
        document.categories.len()
    );

    let output_dirs = setup_output_directories(output_dir, options.image_dir.is_some())?;
    let category_index = build_category_index(&document.categories);
    let annotations_by_image = group_annotations_by_image(&document.annotations);

    let mut summary = ConversionSummary {
        output_dir: output_dir.to_path_buf(),
        ..ConversionSummary::default()
    };
    let mut written_labels = HashSet::new();

    let pb = create_progress_bar(document.images.len() as u64, "Images", options.show_progress);
    for image in &document.images {
        let annotations = annotations_by_image
            .get(&image.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let labels =
            convert_image_annotations(image, annotations, &category_index, options.precision);

        let label_file = label_path(&output_dirs.labels_dir, &image.file_name);
        if !written_labels.insert(label_file.clone()) {
            let warning = ConversionWarning::DuplicateLabelStem {
                image_id: image.id,
                label_path: label_file.clone(),
            };
            warn!("{}", warning);
            summary.warnings.push(warning);
        }
        write_label_file(&label_file, &labels.contents())?;

        summary.total_annotations += annotations.len();
        summary.written_annotations += labels.lines.len();
        summary.warnings.extend(labels.warnings);

        if let (Some(image_dir), Some(images_dir)) = (&options.image_dir, &output_dirs.images_dir) {
            if copy_image(image_dir, images_dir, &image.file_name)?.is_none() {
                let warning = ConversionWarning::MissingImage {
                    path: image_dir.join(&image.file_name),
                };
                warn!("{}", warning);
                summary.warnings.push(warning);
            }
        }

        summary.converted_images += 1;
        debug!("Converted image {} -> {}", image.id, label_file.display());
        pb.inc(1);
    }
    pb.finish_with_message("Image processing complete");

    info!("Creating dataset.yaml file...");
    summary.dataset_yaml = create_dataset_yaml(&output_dirs.root, &category_index.names)?;
    summary.names = category_index.names;

    summary.log_summary();
    Ok(summary)
}
