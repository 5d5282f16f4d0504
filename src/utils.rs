use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConversionError;

/// Create a progress bar with the given length and label, or a hidden one
pub fn create_progress_bar(len: u64, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Create an output directory (and its parents); an existing directory is kept as is
pub fn create_output_directory(path: &Path) -> Result<PathBuf, ConversionError> {
    fs::create_dir_all(path).map_err(|e| ConversionError::io("create directory", path, e))?;
    Ok(path.to_path_buf())
}

/// File stem of a COCO `file_name`, kept verbatim so labels and images share it.
/// `None` when the name has no stem (empty or ending in `..`).
pub fn label_stem(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}
