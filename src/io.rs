use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConversionError, InvalidInputError, REQUIRED_FIELDS};
use crate::types::{CocoDocument, NameTable, OutputDirs};
use crate::utils::{create_output_directory, label_stem};

/// Read a COCO annotation file and check it has the required shape.
///
/// The file is first parsed into a generic JSON value so that a syntax error
/// and a missing top-level field are reported separately.
pub fn read_coco_document(path: &Path) -> Result<CocoDocument, ConversionError> {
    let file = File::open(path).map_err(|e| ConversionError::io("open", path, e))?;

    let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            ConversionError::io("read", path, e.into())
        } else {
            InvalidInputError::InvalidJson(e).into()
        }
    })?;

    Ok(parse_coco_value(value)?)
}

/// Turn an already parsed JSON value into a typed document
pub fn parse_coco_value(value: Value) -> Result<CocoDocument, InvalidInputError> {
    let object = value.as_object().ok_or(InvalidInputError::NotAnObject)?;
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(InvalidInputError::MissingFields(missing));
    }

    serde_json::from_value(value).map_err(InvalidInputError::MalformedRecords)
}

/// Reject documents the conversion cannot handle.
///
/// Every image needs a file name with a stem and a positive size, and every
/// annotation attached to a listed image must reference a listed category.
/// Annotations on images absent from `images` are never emitted and so are
/// not checked.
pub fn validate_document(document: &CocoDocument) -> Result<(), InvalidInputError> {
    for image in &document.images {
        if label_stem(&image.file_name).is_none() {
            return Err(InvalidInputError::InvalidFileName {
                image_id: image.id,
                file_name: image.file_name.clone(),
            });
        }
        if image.width == 0 || image.height == 0 {
            return Err(InvalidInputError::InvalidImageSize {
                image_id: image.id,
                width: image.width,
                height: image.height,
            });
        }
    }

    let image_ids: HashSet<i64> = document.images.iter().map(|image| image.id).collect();
    let category_ids: HashSet<i64> = document.categories.iter().map(|c| c.id).collect();
    if let Some(annotation) = document
        .annotations
        .iter()
        .filter(|a| image_ids.contains(&a.image_id))
        .find(|a| !category_ids.contains(&a.category_id))
    {
        return Err(InvalidInputError::UnknownCategory {
            image_id: annotation.image_id,
            category_id: annotation.category_id,
        });
    }

    Ok(())
}

/// Set up `labels/` (and `images/` when images are copied) under the output directory
pub fn setup_output_directories(
    output_dir: &Path,
    with_images: bool,
) -> Result<OutputDirs, ConversionError> {
    let labels_dir = create_output_directory(&output_dir.join("labels"))?;
    let images_dir = if with_images {
        Some(create_output_directory(&output_dir.join("images"))?)
    } else {
        None
    };

    Ok(OutputDirs {
        root: output_dir.to_path_buf(),
        labels_dir,
        images_dir,
    })
}

/// Path of the label file for an image; `file_name` must have passed validation
pub fn label_path(labels_dir: &Path, file_name: &str) -> PathBuf {
    labels_dir.join(format!("{}.txt", label_stem(file_name).unwrap_or_default()))
}

/// Write the label lines of one image; an image without boxes gets an empty file
pub fn write_label_file(label_path: &Path, contents: &str) -> Result<(), ConversionError> {
    let file =
        File::create(label_path).map_err(|e| ConversionError::io("create", label_path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ConversionError::io("write", label_path, e))
}

/// Copy `image_dir/file_name` to `images_dir/file_name`, keeping permissions and
/// timestamps. Returns `Ok(None)` when the source file does not exist.
pub fn copy_image(
    image_dir: &Path,
    images_dir: &Path,
    file_name: &str,
) -> Result<Option<PathBuf>, ConversionError> {
    let source = image_dir.join(file_name);
    if !source.is_file() {
        return Ok(None);
    }

    let target = images_dir.join(file_name);
    if let Some(parent) = target.parent() {
        create_output_directory(parent)?;
    }
    fs::copy(&source, &target).map_err(|e| ConversionError::io("copy", &source, e))?;
    copy_file_times(&source, &target)
        .map_err(|e| ConversionError::io("set timestamps on", &target, e))?;

    Ok(Some(target))
}

fn copy_file_times(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    // A read-only source gives a read-only target; the owner can still set its
    // times through a read handle on Unix.
    let file = match OpenOptions::new().write(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => File::open(target)?,
        Err(e) => return Err(e),
    };
    file.set_times(times)
}

#[derive(Debug, Serialize)]
struct DatasetYaml<'a> {
    path: String,
    train: &'a str,
    val: &'a str,
    names: &'a NameTable,
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(
    output_dir: &Path,
    names: &NameTable,
) -> Result<PathBuf, ConversionError> {
    let absolute_path = fs::canonicalize(output_dir)
        .map_err(|e| ConversionError::io("resolve", output_dir, e))?;
    let descriptor = DatasetYaml {
        path: absolute_path.to_string_lossy().into_owned(),
        train: "images",
        val: "images",
        names,
    };
    let yaml_content = serde_yaml::to_string(&descriptor)?;

    let dataset_yaml_path = output_dir.join("dataset.yaml");
    fs::write(&dataset_yaml_path, yaml_content)
        .map_err(|e| ConversionError::io("write", &dataset_yaml_path, e))?;
    Ok(dataset_yaml_path)
}
