use limiar_image::{Image, ImageError};

use crate::border::BorderPolicy;
use crate::stats::{LocalStats, StatsAccumulator};

/// Intensity samples gathered from a square window around a pixel.
///
/// A neighborhood can only be obtained from a [`NeighborhoodSampler`] and
/// always contains at least the center pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    samples: Vec<u8>,
}

impl Neighborhood {
    /// The sampled intensities, row by row.
    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the neighborhood has no samples; never true once sampled.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Statistics of the samples.
    pub fn stats(&self) -> LocalStats {
        LocalStats::from_neighborhood(self)
    }
}

/// Extracts `n x n` neighborhoods from a grayscale image.
///
/// The window around `(x, y)` spans `n` columns starting at `x - n / 2` and
/// `n` rows starting at `y - n / 2`. For even `n` this is
/// `[x - n/2, x + n/2) x [y - n/2, y + n/2)`, one column and one row more on
/// the top-left side than on the bottom-right side. Coordinates outside the
/// image are resolved with the sampler's [`BorderPolicy`].
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::border::BorderPolicy;
/// use limiar_imgproc::neighborhood::NeighborhoodSampler;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 3 },
///     vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
/// ).unwrap();
///
/// let sampler = NeighborhoodSampler::new(&image, 3, BorderPolicy::Exclude).unwrap();
///
/// let center = sampler.sample(1, 1).unwrap();
/// assert_eq!(center.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
///
/// let corner = sampler.sample(0, 0).unwrap();
/// assert_eq!(corner.as_slice(), &[1, 2, 4, 5]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodSampler<'a> {
    image: &'a Image<u8, 1>,
    window_size: usize,
    border: BorderPolicy,
}

impl<'a> NeighborhoodSampler<'a> {
    /// Create a sampler over `image` with an `window_size x window_size` window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window size is zero, its `n * n` sample count
    /// overflows `usize`, or the image has no pixels.
    pub fn new(
        image: &'a Image<u8, 1>,
        window_size: usize,
        border: BorderPolicy,
    ) -> Result<Self, ImageError> {
        if window_size == 0 || window_size.checked_mul(window_size).is_none() {
            return Err(ImageError::InvalidWindowSize(window_size));
        }

        if image.width() == 0 || image.height() == 0 {
            return Err(ImageError::EmptyImage(image.width(), image.height()));
        }

        Ok(Self {
            image,
            window_size,
            border,
        })
    }

    /// The side length of the sampling window.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// The policy applied to out-of-image coordinates.
    pub fn border(&self) -> BorderPolicy {
        self.border
    }

    /// Largest number of samples a neighborhood can hold.
    ///
    /// `Exclude` never yields more samples than the image has pixels.
    pub fn max_samples(&self) -> usize {
        let n = self.window_size;
        match self.border {
            BorderPolicy::Exclude => n.min(self.image.width()) * n.min(self.image.height()),
            // n * n is checked at construction
            BorderPolicy::Replicate | BorderPolicy::Reflect => n * n,
        }
    }

    /// Sample the neighborhood centered at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `(x, y)` is outside the image.
    pub fn sample(&self, x: usize, y: usize) -> Result<Neighborhood, ImageError> {
        let mut neighborhood = Neighborhood {
            samples: Vec::with_capacity(self.max_samples()),
        };
        self.resample(&mut neighborhood, x, y)?;
        Ok(neighborhood)
    }

    /// Refill an existing neighborhood with the window centered at `(x, y)`,
    /// reusing its allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if `(x, y)` is outside the image; the neighborhood is
    /// left unchanged in that case.
    pub fn resample(
        &self,
        neighborhood: &mut Neighborhood,
        x: usize,
        y: usize,
    ) -> Result<(), ImageError> {
        if x >= self.image.width() || y >= self.image.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.image.width(),
                self.image.height(),
            ));
        }
        self.fill(&mut neighborhood.samples, x, y);
        Ok(())
    }

    /// Statistics of the window centered at `(x, y)`, accumulated without
    /// storing the samples.
    ///
    /// `(x, y)` must be inside the image.
    pub(crate) fn local_stats(&self, x: usize, y: usize) -> LocalStats {
        let mut acc = StatsAccumulator::default();
        self.for_each_sample(x, y, |v| acc.push(v));
        acc.finish()
    }

    fn fill(&self, buf: &mut Vec<u8>, x: usize, y: usize) {
        buf.clear();
        self.for_each_sample(x, y, |v| buf.push(v));
    }

    // walks rows and columns independently; the center pixel is always kept
    fn for_each_sample(&self, x: usize, y: usize, mut f: impl FnMut(u8)) {
        let width = self.image.width();
        let height = self.image.height();
        let data = self.image.as_slice();
        let half = (self.window_size / 2) as isize;
        let x0 = x as isize - half;
        let y0 = y as isize - half;

        for dy in 0..self.window_size as isize {
            let Some(yi) = self.border.map_index(y0 + dy, height) else {
                continue;
            };
            let row = &data[yi * width..(yi + 1) * width];
            for dx in 0..self.window_size as isize {
                if let Some(xi) = self.border.map_index(x0 + dx, width) {
                    f(row[xi]);
                }
            }
        }
    }
}
