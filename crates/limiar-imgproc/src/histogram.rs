use limiar_image::{Image, ImageError};
use rayon::prelude::*;

/// Number of bins of a full 8-bit intensity histogram.
pub const FULL_HISTOGRAM_BINS: usize = 256;

/// Maps an 8-bit value (or a 256-bin histogram index) to one of `num_bins` bins.
#[inline]
fn bin_index(value: usize, num_bins: usize) -> usize {
    (value * num_bins) >> 8
}

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram. The counts are accumulated into it.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > FULL_HISTOGRAM_BINS {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    if hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; FULL_HISTOGRAM_BINS];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = bin_index(i, num_bins);
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(a, b)| *a += b);
                a
            },
        );

    hist.iter_mut()
        .zip(counts.iter())
        .for_each(|(h, c)| *h += c);

    Ok(())
}

/// Condense a full 256-bin histogram into fewer contiguous buckets.
///
/// Bucket `i` holds the sum of every bin `b` with `(b * num_buckets) >> 8 == i`,
/// so buckets are ascending in intensity and their total equals the total of
/// the input histogram.
///
/// # Arguments
///
/// * `hist` - A histogram with [`FULL_HISTOGRAM_BINS`] bins.
/// * `num_buckets` - The number of output buckets, in `[1, 256]`.
///
/// # Errors
///
/// Returns an error if the input is not a 256-bin histogram or the bucket
/// count is out of range.
///
/// # Example
///
/// ```
/// use limiar_imgproc::histogram::condense_histogram;
///
/// let hist = vec![1usize; 256];
/// let buckets = condense_histogram(&hist, 50).unwrap();
///
/// assert_eq!(buckets.len(), 50);
/// assert_eq!(buckets.iter().sum::<usize>(), 256);
/// ```
pub fn condense_histogram(hist: &[usize], num_buckets: usize) -> Result<Vec<usize>, ImageError> {
    if hist.len() != FULL_HISTOGRAM_BINS {
        return Err(ImageError::InvalidHistogramBins(hist.len()));
    }

    if num_buckets == 0 || num_buckets > FULL_HISTOGRAM_BINS {
        return Err(ImageError::InvalidHistogramBins(num_buckets));
    }

    let buckets = hist
        .iter()
        .enumerate()
        .fold(vec![0usize; num_buckets], |mut acc, (bin, &count)| {
            acc[bin_index(bin, num_buckets)] += count;
            acc
        });

    Ok(buckets)
}
