#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Parameters of a binarization run.
pub mod config;

/// Error types for the binarization pipeline.
pub mod error;

/// The binarization pipeline and its artifacts.
pub mod pipeline;

#[doc(inline)]
pub use limiar_image as image;

#[doc(inline)]
pub use limiar_imgproc as imgproc;

#[doc(inline)]
pub use limiar_io as io;

pub use crate::config::BinarizeConfig;
pub use crate::error::BinarizeError;
pub use crate::pipeline::{Artifact, BinarizationOutput, BinarizationPipeline, Stage};
