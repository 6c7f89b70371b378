use std::path::PathBuf;

use limiar_image::ImageError;
use limiar_imgproc::threshold::ThresholdError;
use limiar_io::IoError;

/// An error type for the binarization pipeline.
#[derive(thiserror::Error, Debug)]
pub enum BinarizeError {
    /// The configuration is not valid.
    #[error("Invalid configuration. {0}")]
    Config(String),

    /// The input image could not be read.
    #[error("Failed to read the input image. {0}")]
    Io(#[from] IoError),

    /// An intermediate image could not be built.
    #[error("Failed to process the image. {0}")]
    Image(#[from] ImageError),

    /// A thresholding sweep failed.
    #[error("Failed to binarize the image. {0}")]
    Threshold(#[from] ThresholdError),

    /// One or more artifacts could not be written; every artifact was attempted.
    #[error("Failed to write {} artifact(s): {}", .0.len(), list_paths(.0))]
    Artifacts(Vec<(PathBuf, IoError)>),

    /// The global thread pool could not be configured.
    #[error("Failed to build the thread pool. {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn list_paths(failures: &[(PathBuf, IoError)]) -> String {
    failures
        .iter()
        .map(|(path, err)| format!("{} ({err})", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
