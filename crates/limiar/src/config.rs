use limiar_image::ImageSize;
use limiar_imgproc::border::BorderPolicy;
use limiar_imgproc::histogram::FULL_HISTOGRAM_BINS;
use limiar_imgproc::parallel::ExecutionStrategy;
use limiar_imgproc::threshold::{BernsenParams, LocalWindow, NiblackParams, SauvolaParams};

use crate::error::BinarizeError;

/// Number of buckets the histogram is condensed into.
pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 50;

/// Immutable parameters of a binarization run.
///
/// # Example
///
/// ```
/// use limiar::BinarizeConfig;
///
/// let config = BinarizeConfig::default().with_window_size(15);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.window.size, 15);
///
/// assert!(BinarizeConfig::default().with_window_size(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BinarizeConfig {
    /// The neighborhood window of the local methods.
    pub window: LocalWindow,
    /// Bernsen's parameters.
    pub bernsen: BernsenParams,
    /// Niblack's parameters.
    pub niblack: NiblackParams,
    /// Sauvola-Pietikäinen parameters.
    pub sauvola: SauvolaParams,
    /// How the sweeps schedule their rows.
    pub strategy: ExecutionStrategy,
    /// Number of buckets of the condensed histogram.
    pub histogram_buckets: usize,
    /// Size of the histogram chart.
    pub chart_size: ImageSize,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            window: LocalWindow::default(),
            bernsen: BernsenParams::default(),
            niblack: NiblackParams::default(),
            sauvola: SauvolaParams::default(),
            strategy: ExecutionStrategy::default(),
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS,
            chart_size: ImageSize {
                width: 520,
                height: 240,
            },
        }
    }
}

impl BinarizeConfig {
    /// Set the side length of the local window.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window.size = size;
        self
    }

    /// Set the policy for window coordinates outside the image.
    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.window.border = border;
        self
    }

    /// Set the execution strategy of the sweeps.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`BinarizeError::Config`] naming the first invalid parameter.
    pub fn validate(&self) -> Result<(), BinarizeError> {
        if self.window.size == 0 {
            return Err(BinarizeError::Config(
                "window size must be > 0".to_string(),
            ));
        }

        if self.window.size.checked_mul(self.window.size).is_none() {
            return Err(BinarizeError::Config(format!(
                "window size {} is too large",
                self.window.size
            )));
        }

        if !self.niblack.k.is_finite() {
            return Err(BinarizeError::Config(format!(
                "niblack k must be finite, got {}",
                self.niblack.k
            )));
        }

        if !self.sauvola.k.is_finite() {
            return Err(BinarizeError::Config(format!(
                "sauvola k must be finite, got {}",
                self.sauvola.k
            )));
        }

        if !(self.sauvola.r.is_finite() && self.sauvola.r > 0.0) {
            return Err(BinarizeError::Config(format!(
                "sauvola dynamic range must be > 0, got {}",
                self.sauvola.r
            )));
        }

        if self.histogram_buckets == 0 || self.histogram_buckets > FULL_HISTOGRAM_BINS {
            return Err(BinarizeError::Config(format!(
                "histogram buckets must be in [1, {FULL_HISTOGRAM_BINS}], got {}",
                self.histogram_buckets
            )));
        }

        if self.chart_size.width == 0 || self.chart_size.height == 0 {
            return Err(BinarizeError::Config(format!(
                "chart size must not be empty, got {}",
                self.chart_size
            )));
        }

        if let ExecutionStrategy::Fixed(0) = self.strategy {
            return Err(BinarizeError::Config(
                "fixed thread count must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() -> Result<(), BinarizeError> {
        let config = BinarizeConfig::default();
        config.validate()?;
        assert_eq!(config.window.size, 10);
        assert_eq!(config.window.border, BorderPolicy::Replicate);
        assert_eq!(config.niblack.k, 0.5);
        assert_eq!(config.sauvola.k, 0.5);
        assert_eq!(config.sauvola.r, 128.0);
        assert_eq!(config.histogram_buckets, 50);
        Ok(())
    }

    #[test]
    fn test_invalid_parameters() {
        let base = BinarizeConfig::default();

        let mut config = base.clone();
        config.sauvola.r = 0.0;
        assert!(matches!(config.validate(), Err(BinarizeError::Config(_))));

        let mut config = base.clone();
        config.niblack.k = f64::NAN;
        assert!(matches!(config.validate(), Err(BinarizeError::Config(_))));

        let mut config = base.clone();
        config.histogram_buckets = 257;
        assert!(matches!(config.validate(), Err(BinarizeError::Config(_))));

        let config = base.clone().with_window_size(usize::MAX);
        assert!(matches!(config.validate(), Err(BinarizeError::Config(_))));

        let config = base.with_strategy(ExecutionStrategy::Fixed(0));
        assert!(matches!(config.validate(), Err(BinarizeError::Config(_))));
    }
}
