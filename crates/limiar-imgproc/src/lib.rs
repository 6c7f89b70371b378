#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// border policies for sampling outside the image.
pub mod border;

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// compute image histogram module.
pub mod histogram;

/// local neighborhood sampling module.
pub mod neighborhood;

/// module containing parallization utilities.
pub mod parallel;

/// sample statistics module.
pub mod stats;

/// operations to threshold images.
pub mod threshold;
