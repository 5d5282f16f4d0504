use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

// f64 round-trips with 17 significant digits; more decimals add nothing
const MAX_PRECISION: usize = 17;

/// Command-line arguments for converting a COCO annotation file to a YOLO dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the COCO annotation JSON file
    #[arg(short = 'j', long = "coco_json")]
    pub coco_json: PathBuf,

    /// Directory the YOLO dataset is written to
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding the images referenced by `file_name`; when given they are
    /// copied into `<output_dir>/images`
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: Option<PathBuf>,

    /// Number of decimals for normalized coordinates (default: shortest exact form)
    #[arg(long = "precision", value_parser = validate_precision)]
    pub precision: Option<usize>,

    /// Disable the progress bar
    #[arg(long = "no_progress")]
    pub no_progress: bool,
}

impl Args {
    pub fn to_convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            image_dir: self.image_dir.clone(),
            precision: self.precision,
            show_progress: !self.no_progress,
        }
    }
}

/// Knobs for a single conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub image_dir: Option<PathBuf>,
    pub precision: Option<usize>,
    pub show_progress: bool,
}

impl ConvertOptions {
    pub fn with_image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(image_dir.into());
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }
}

// Validate that the precision is a small non-negative integer
fn validate_precision(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val <= MAX_PRECISION => Ok(val),
        _ => Err(format!("PRECISION must be between 0 and {}", MAX_PRECISION)),
    }
}
