use rayon::prelude::*;
use thiserror::Error;

use limiar_image::Image;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how row-wise image operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Apply a function to each pixel in the image in parallel.
///
/// The source and destination images must have the same size.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to every row of an image with the given strategy.
///
/// The closure receives the row index and the mutable row slice
/// (`width * C` elements). Rows are disjoint, so no synchronization is needed
/// to write them; the call returns once every row has been processed.
///
/// # Arguments
///
/// * `dst` - The image whose rows are written.
/// * `strategy` - The execution strategy.
/// * `f` - The operation to perform on each `(row_index, row)` pair.
///
/// # Errors
///
/// Returns an error if a [`ExecutionStrategy::Fixed`] pool cannot be built.
pub fn for_each_row<T, const C: usize>(
    dst: &mut Image<T, C>,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) -> Result<(), ParallelError>
where
    T: Send,
{
    let stride = C * dst.cols();
    if stride == 0 {
        return Ok(());
    }

    let rows = dst.as_slice_mut();
    match strategy {
        ExecutionStrategy::Serial => {
            rows.chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::ParallelRows => {
            rows.par_chunks_exact_mut(stride)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                rows.par_chunks_exact_mut(stride)
                    .enumerate()
                    .for_each(|(y, row)| f(y, row));
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use limiar_image::{ImageError, ImageSize};

    fn row_index_image(strategy: ExecutionStrategy) -> Image<usize, 1> {
        let mut dst = Image::<usize, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 4,
            },
            0,
        )
        .unwrap();
        for_each_row(&mut dst, strategy, |y, row| {
            row.iter_mut().enumerate().for_each(|(x, v)| *v = y * 10 + x);
        })
        .unwrap();
        dst
    }

    #[test]
    fn test_for_each_row_serial() {
        let dst = row_index_image(ExecutionStrategy::Serial);
        assert_eq!(
            dst.as_slice(),
            &[0, 1, 2, 10, 11, 12, 20, 21, 22, 30, 31, 32]
        );
    }

    #[test]
    fn test_for_each_row_strategies_agree() {
        let serial = row_index_image(ExecutionStrategy::Serial);
        let parallel = row_index_image(ExecutionStrategy::ParallelRows);
        let fixed = row_index_image(ExecutionStrategy::Fixed(2));
        assert_eq!(serial, parallel);
        assert_eq!(serial, fixed);
    }

    #[test]
    fn test_for_each_row_fixed_error() -> Result<(), ImageError> {
        let mut dst = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 1,
                height: 1,
            },
            0,
        )?;
        let res = for_each_row(&mut dst, ExecutionStrategy::Fixed(0), |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
        Ok(())
    }

    #[test]
    fn test_par_iter_rows() -> Result<(), ImageError> {
        let src = Image::<u8, 2>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        )?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        par_iter_rows(&src, &mut dst, |s, d| d[0] = s[0] + s[1]);
        assert_eq!(dst.as_slice(), &[3, 7, 11, 15]);
        Ok(())
    }
}
