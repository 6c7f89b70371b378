use limiar_image::{Image, ImageError};
use thiserror::Error;

use crate::border::BorderPolicy;
use crate::neighborhood::NeighborhoodSampler;
use crate::parallel::{self, ExecutionStrategy, ParallelError};
use crate::stats::LocalStats;

/// Midpoint of the 8-bit intensity range.
pub const MID_GRAY: f64 = 128.0;

/// An error type for the thresholding operations.
#[derive(Error, Debug, PartialEq)]
pub enum ThresholdError {
    /// The input or output image is not valid.
    #[error("Invalid image. {0}")]
    Image(#[from] ImageError),

    /// The sweep could not be scheduled.
    #[error("Failed to run the sweep. {0}")]
    Parallel(#[from] ParallelError),
}

/// The two values of a binary image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinaryValue {
    /// Foreground, stored as `0`.
    Black = 0,
    /// Background, stored as `255`.
    White = 255,
}

impl BinaryValue {
    /// `White` when `is_white` holds, `Black` otherwise.
    #[inline]
    pub fn from_decision(is_white: bool) -> Self {
        if is_white {
            BinaryValue::White
        } else {
            BinaryValue::Black
        }
    }

    /// The pixel value stored in a binary image.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The window used by the local thresholding methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalWindow {
    /// Side length of the square window, in pixels. Must be > 0.
    pub size: usize,
    /// Policy for window coordinates outside the image.
    pub border: BorderPolicy,
}

impl Default for LocalWindow {
    fn default() -> Self {
        Self {
            size: 10,
            border: BorderPolicy::default(),
        }
    }
}

/// Parameters of Bernsen's method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BernsenParams {
    /// Windows whose contrast (`max - min`) is below this limit are treated as
    /// a single class; `0` disables the low-contrast rule.
    pub contrast_limit: u8,
}

impl Default for BernsenParams {
    fn default() -> Self {
        Self { contrast_limit: 15 }
    }
}

/// Parameters of Niblack's method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NiblackParams {
    /// Weight of the local standard deviation.
    pub k: f64,
}

impl Default for NiblackParams {
    fn default() -> Self {
        Self { k: 0.5 }
    }
}

/// Parameters of the Sauvola-Pietikäinen method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SauvolaParams {
    /// Weight of the normalized deviation term.
    pub k: f64,
    /// Dynamic range of the variance. Must be > 0.
    pub r: f64,
}

impl Default for SauvolaParams {
    fn default() -> Self {
        Self { k: 0.5, r: 128.0 }
    }
}

/// Classify a pixel against the image-wide average intensity.
///
/// # Example
///
/// ```
/// use limiar_imgproc::threshold::{classify_global, BinaryValue};
///
/// assert_eq!(classify_global(127, 127), BinaryValue::White);
/// assert_eq!(classify_global(126, 127), BinaryValue::Black);
/// ```
#[inline]
pub fn classify_global(pixel: u8, global_average: u8) -> BinaryValue {
    BinaryValue::from_decision(pixel >= global_average)
}

/// Bernsen's threshold: the midpoint of the local range, `(max + min) / 2`.
#[inline]
pub fn bernsen_threshold(stats: &LocalStats) -> f64 {
    (stats.max as f64 + stats.min as f64) / 2.0
}

/// Classify a pixel with Bernsen's local contrast method.
///
/// The pixel is white when it reaches the midpoint of the local range. In a
/// low-contrast window (`max - min < contrast_limit`) the whole window is one
/// class, white when its midpoint reaches [`MID_GRAY`].
///
/// With `BernsenParams { contrast_limit: 0 }` the low-contrast rule never
/// applies and the result is the plain `pixel >= (max + min) / 2`; a flat
/// window of 100 is then white, while the default limit makes it black.
///
/// # Example
///
/// ```
/// use limiar_imgproc::stats::LocalStats;
/// use limiar_imgproc::threshold::{classify_bernsen, BernsenParams, BinaryValue};
///
/// let stats = LocalStats::from_samples(&[0, 255]).unwrap();
/// let params = BernsenParams::default();
///
/// assert_eq!(classify_bernsen(128, &stats, &params), BinaryValue::White);
/// assert_eq!(classify_bernsen(127, &stats, &params), BinaryValue::Black);
///
/// let flat = LocalStats::from_samples(&[100; 9]).unwrap();
/// assert_eq!(classify_bernsen(100, &flat, &params), BinaryValue::Black);
///
/// let plain = BernsenParams { contrast_limit: 0 };
/// assert_eq!(classify_bernsen(100, &flat, &plain), BinaryValue::White);
/// ```
#[inline]
pub fn classify_bernsen(pixel: u8, stats: &LocalStats, params: &BernsenParams) -> BinaryValue {
    let threshold = bernsen_threshold(stats);
    if stats.max - stats.min < params.contrast_limit {
        return BinaryValue::from_decision(threshold >= MID_GRAY);
    }
    BinaryValue::from_decision(pixel as f64 >= threshold)
}

/// Niblack's threshold: `mean + k * sqrt(variance)`.
#[inline]
pub fn niblack_threshold(stats: &LocalStats, params: &NiblackParams) -> f64 {
    stats.mean + params.k * stats.std_dev()
}

/// Classify a pixel with Niblack's local mean and variance method.
#[inline]
pub fn classify_niblack(pixel: u8, stats: &LocalStats, params: &NiblackParams) -> BinaryValue {
    BinaryValue::from_decision(pixel as f64 >= niblack_threshold(stats, params))
}

/// Sauvola-Pietikäinen threshold: `mean + 1 + k * (sqrt(variance / r) - 1)`.
#[inline]
pub fn sauvola_threshold(stats: &LocalStats, params: &SauvolaParams) -> f64 {
    stats.mean + 1.0 + params.k * ((stats.variance / params.r).sqrt() - 1.0)
}

/// Classify a pixel with the Sauvola-Pietikäinen normalized variance method.
#[inline]
pub fn classify_sauvola(pixel: u8, stats: &LocalStats, params: &SauvolaParams) -> BinaryValue {
    BinaryValue::from_decision(pixel as f64 >= sauvola_threshold(stats, params))
}

fn check_sizes(src: &Image<u8, 1>, dst: &Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

/// Binarize an image against a single global threshold.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary image, `0` or `255` per pixel.
/// * `global_average` - The image-wide average intensity.
/// * `strategy` - How the rows are scheduled.
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::parallel::ExecutionStrategy;
/// use limiar_imgproc::threshold::threshold_global;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 1 },
///     vec![10, 100, 200],
/// ).unwrap();
/// let mut binary = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_global(&image, &mut binary, 100, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(binary.as_slice(), &[0, 255, 255]);
/// ```
pub fn threshold_global(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    global_average: u8,
    strategy: ExecutionStrategy,
) -> Result<(), ThresholdError> {
    check_sizes(src, dst)?;

    let width = src.width();
    let data = src.as_slice();

    parallel::for_each_row(dst, strategy, |y, dst_row| {
        let src_row = &data[y * width..(y + 1) * width];
        dst_row
            .iter_mut()
            .zip(src_row.iter())
            .for_each(|(dst_pixel, &src_pixel)| {
                *dst_pixel = classify_global(src_pixel, global_average).as_u8();
            });
    })?;

    Ok(())
}

// runs `classify` once per pixel with the statistics of its own window
fn threshold_local(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    window: &LocalWindow,
    strategy: ExecutionStrategy,
    classify: impl Fn(u8, &LocalStats) -> BinaryValue + Send + Sync,
) -> Result<(), ThresholdError> {
    check_sizes(src, dst)?;

    let sampler = NeighborhoodSampler::new(src, window.size, window.border)?;
    let width = src.width();
    let data = src.as_slice();

    parallel::for_each_row(dst, strategy, |y, dst_row| {
        let src_row = &data[y * width..(y + 1) * width];
        dst_row
            .iter_mut()
            .zip(src_row.iter())
            .enumerate()
            .for_each(|(x, (dst_pixel, &src_pixel))| {
                let stats = sampler.local_stats(x, y);
                *dst_pixel = classify(src_pixel, &stats).as_u8();
            });
    })?;

    Ok(())
}

/// Binarize an image with Bernsen's local contrast method.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary image, `0` or `255` per pixel.
/// * `window` - The neighborhood window.
/// * `params` - Bernsen's parameters.
/// * `strategy` - How the rows are scheduled.
///
/// # Errors
///
/// Returns an error if the sizes differ, the window size is zero or the image is empty.
pub fn threshold_bernsen(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    window: &LocalWindow,
    params: &BernsenParams,
    strategy: ExecutionStrategy,
) -> Result<(), ThresholdError> {
    threshold_local(src, dst, window, strategy, |pixel, stats| {
        classify_bernsen(pixel, stats, params)
    })
}

/// Binarize an image with Niblack's local mean and variance method.
///
/// # Errors
///
/// Returns an error if the sizes differ, the window size is zero or the image is empty.
pub fn threshold_niblack(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    window: &LocalWindow,
    params: &NiblackParams,
    strategy: ExecutionStrategy,
) -> Result<(), ThresholdError> {
    threshold_local(src, dst, window, strategy, |pixel, stats| {
        classify_niblack(pixel, stats, params)
    })
}

/// Binarize an image with the Sauvola-Pietikäinen method.
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::parallel::ExecutionStrategy;
/// use limiar_imgproc::threshold::{threshold_sauvola, LocalWindow, SauvolaParams};
///
/// let image = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 100).unwrap();
/// let mut binary = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_sauvola(
///     &image,
///     &mut binary,
///     &LocalWindow::default(),
///     &SauvolaParams::default(),
///     ExecutionStrategy::Serial,
/// )
/// .unwrap();
///
/// // the threshold of a flat window is mean + 1 - k
/// assert!(binary.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn threshold_sauvola(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    window: &LocalWindow,
    params: &SauvolaParams,
    strategy: ExecutionStrategy,
) -> Result<(), ThresholdError> {
    threshold_local(src, dst, window, strategy, |pixel, stats| {
        classify_sauvola(pixel, stats, params)
    })
}
