use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use coco2yolo::{convert_with_options, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.coco_json.exists() {
        error!(
            "The specified COCO JSON file does not exist: {}",
            args.coco_json.display()
        );
        return ExitCode::FAILURE;
    }

    info!("Starting COCO to YOLO conversion...");

    match convert_with_options(&args.coco_json, &args.output_dir, &args.to_convert_options()) {
        Ok(_) => {
            info!("Conversion process completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error during conversion: {}", e);
            ExitCode::FAILURE
        }
    }
}
