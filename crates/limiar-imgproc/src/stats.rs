use limiar_image::{Image, ImageError};
use thiserror::Error;

use crate::neighborhood::Neighborhood;

/// Errors produced by the sample statistics.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    /// The statistic is undefined over zero samples.
    #[error("cannot compute statistics over an empty sample")]
    EmptyInput,
}

/// Mean of an intensity sample.
///
/// # Example
///
/// ```
/// use limiar_imgproc::stats::mean;
///
/// assert_eq!(mean(&[0, 10, 20]).unwrap(), 10.0);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(samples: &[u8]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(sum(samples) as f64 / samples.len() as f64)
}

/// Population variance of an intensity sample: the sum of squared deviations
/// from the mean divided by the number of samples.
///
/// # Example
///
/// ```
/// use limiar_imgproc::stats::variance;
///
/// assert_eq!(variance(&[2, 4, 4, 4, 5, 5, 7, 9]).unwrap(), 4.0);
/// ```
pub fn variance(samples: &[u8]) -> Result<f64, StatsError> {
    let mean = mean(samples)?;
    Ok(squared_deviation(samples, mean) / samples.len() as f64)
}

/// Smallest intensity of a sample.
pub fn min(samples: &[u8]) -> Result<u8, StatsError> {
    samples.iter().copied().min().ok_or(StatsError::EmptyInput)
}

/// Largest intensity of a sample.
pub fn max(samples: &[u8]) -> Result<u8, StatsError> {
    samples.iter().copied().max().ok_or(StatsError::EmptyInput)
}

#[inline]
fn sum(samples: &[u8]) -> u64 {
    samples.iter().fold(0u64, |acc, &v| acc + v as u64)
}

#[inline]
fn squared_deviation(samples: &[u8], mean: f64) -> f64 {
    samples.iter().fold(0.0, |acc, &v| {
        let d = v as f64 - mean;
        acc + d * d
    })
}

/// Statistics of a local neighborhood.
///
/// Invariants: `variance >= 0` and `min <= mean <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalStats {
    /// Mean intensity.
    pub mean: f64,
    /// Smallest intensity.
    pub min: u8,
    /// Largest intensity.
    pub max: u8,
    /// Population variance of the intensities.
    pub variance: f64,
}

impl LocalStats {
    /// Compute the statistics of an arbitrary sample.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::EmptyInput`] when `samples` is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use limiar_imgproc::stats::LocalStats;
    ///
    /// let stats = LocalStats::from_samples(&[10, 20, 30, 40]).unwrap();
    /// assert_eq!(stats.min, 10);
    /// assert_eq!(stats.max, 40);
    /// assert_eq!(stats.mean, 25.0);
    /// assert_eq!(stats.variance, 125.0);
    /// ```
    pub fn from_samples(samples: &[u8]) -> Result<Self, StatsError> {
        if samples.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        Ok(Self::from_non_empty(samples))
    }

    /// Compute the statistics of a neighborhood.
    ///
    /// A [`Neighborhood`] always holds at least the center pixel.
    pub fn from_neighborhood(neighborhood: &Neighborhood) -> Self {
        Self::from_non_empty(neighborhood.as_slice())
    }

    /// Standard deviation, i.e. the square root of the variance.
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub(crate) fn from_non_empty(samples: &[u8]) -> Self {
        debug_assert!(!samples.is_empty(), "neighborhood must not be empty");

        let mut acc = StatsAccumulator::default();
        samples.iter().for_each(|&v| acc.push(v));
        acc.finish()
    }
}

/// Running sums of a sample, so local statistics need no sample buffer.
///
/// The variance is evaluated from exact integer sums as
/// `(n * sum(v^2) - sum(v)^2) / n^2`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StatsAccumulator {
    count: u64,
    total: u128,
    total_sq: u128,
    min: u8,
    max: u8,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            total: 0,
            total_sq: 0,
            min: u8::MAX,
            max: u8::MIN,
        }
    }
}

impl StatsAccumulator {
    #[inline]
    pub(crate) fn push(&mut self, v: u8) {
        let w = v as u128;
        self.count += 1;
        self.total += w;
        self.total_sq += w * w;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    /// At least one sample must have been pushed.
    pub(crate) fn finish(&self) -> LocalStats {
        debug_assert!(self.count > 0, "neighborhood must not be empty");

        let n = self.count as u128;
        let mean = self.total as f64 / self.count as f64;
        let spread = n * self.total_sq - self.total * self.total;
        let variance = spread as f64 / (n * n) as f64;

        LocalStats {
            mean,
            min: self.min,
            max: self.max,
            variance,
        }
    }
}

/// Compute the image-wide average intensity.
///
/// The average is the integer (floor) mean of all pixels, computed once per
/// run for the global threshold.
///
/// # Errors
///
/// Returns an error if the image has no pixels.
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::stats::global_average;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![0, 255],
/// ).unwrap();
///
/// assert_eq!(global_average(&image).unwrap(), 127);
/// ```
pub fn global_average(src: &Image<u8, 1>) -> Result<u8, ImageError> {
    let pixels = src.as_slice();
    if pixels.is_empty() {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }
    Ok((sum(pixels) / pixels.len() as u64) as u8)
}
