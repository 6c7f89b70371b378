use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use limiar_image::Image;
use limiar_imgproc::color::gray_from_rgb_u8;
use limiar_imgproc::draw::draw_histogram_chart;
use limiar_imgproc::histogram::{compute_histogram, condense_histogram, FULL_HISTOGRAM_BINS};
use limiar_imgproc::parallel::ExecutionStrategy;
use limiar_imgproc::stats::global_average;
use limiar_imgproc::threshold::{
    threshold_bernsen, threshold_global, threshold_niblack, threshold_sauvola, ThresholdError,
};
use limiar_io::functional::read_image_any_rgb8;
use limiar_io::png::{write_image_png_gray8, write_image_png_rgb8};
use limiar_io::IoError;

use crate::config::BinarizeConfig;
use crate::error::BinarizeError;

/// The stages of a binarization run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decode the input file.
    Load,
    /// Convert the input to grayscale.
    Grayscale,
    /// Compute, condense and chart the histogram.
    Histogram,
    /// Threshold against the global average.
    GlobalSweep,
    /// Threshold with Bernsen's method.
    BernsenSweep,
    /// Threshold with Niblack's method.
    NiblackSweep,
    /// Threshold with the Sauvola-Pietikäinen method.
    SauvolaSweep,
    /// All outputs are available.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Grayscale => "grayscale",
            Stage::Histogram => "histogram",
            Stage::GlobalSweep => "global sweep",
            Stage::BernsenSweep => "bernsen sweep",
            Stage::NiblackSweep => "niblack sweep",
            Stage::SauvolaSweep => "sauvola sweep",
            Stage::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// An image written by [`BinarizationOutput::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// The grayscale image.
    Grayscale,
    /// The condensed histogram chart.
    HistogramChart,
    /// The globally thresholded image.
    Global,
    /// Bernsen's binary image.
    Bernsen,
    /// Niblack's binary image.
    Niblack,
    /// The Sauvola-Pietikäinen binary image.
    Sauvola,
}

impl Artifact {
    /// Every artifact, in the order they are written.
    pub const ALL: [Artifact; 6] = [
        Artifact::Grayscale,
        Artifact::HistogramChart,
        Artifact::Global,
        Artifact::Bernsen,
        Artifact::Niblack,
        Artifact::Sauvola,
    ];

    /// The file name of the artifact inside the output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Artifact::Grayscale => "grayScale.png",
            Artifact::HistogramChart => "hist.png",
            Artifact::Global => "limiarGlobal.png",
            Artifact::Bernsen => "binarBernsen.png",
            Artifact::Niblack => "binarNiblack.png",
            Artifact::Sauvola => "binarSauvola.png",
        }
    }
}

/// Everything a binarization run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BinarizationOutput {
    /// The grayscale image all methods read.
    pub gray: Image<u8, 1>,
    /// The full 256-bin intensity histogram.
    pub histogram: Vec<usize>,
    /// The histogram condensed into ascending buckets.
    pub condensed: Vec<usize>,
    /// The bar chart of the condensed histogram.
    pub chart: Image<u8, 3>,
    /// The image-wide average intensity.
    pub global_average: u8,
    /// Thresholded against the global average.
    pub global: Image<u8, 1>,
    /// Thresholded with Bernsen's method.
    pub bernsen: Image<u8, 1>,
    /// Thresholded with Niblack's method.
    pub niblack: Image<u8, 1>,
    /// Thresholded with the Sauvola-Pietikäinen method.
    pub sauvola: Image<u8, 1>,
}

impl BinarizationOutput {
    /// The binary image produced by `stage`, if it is a sweep.
    pub fn binary(&self, stage: Stage) -> Option<&Image<u8, 1>> {
        match stage {
            Stage::GlobalSweep => Some(&self.global),
            Stage::BernsenSweep => Some(&self.bernsen),
            Stage::NiblackSweep => Some(&self.niblack),
            Stage::SauvolaSweep => Some(&self.sauvola),
            _ => None,
        }
    }

    fn write_artifact(&self, artifact: Artifact, file_path: &Path) -> Result<(), IoError> {
        match artifact {
            Artifact::Grayscale => write_image_png_gray8(file_path, &self.gray),
            Artifact::HistogramChart => write_image_png_rgb8(file_path, &self.chart),
            Artifact::Global => write_image_png_gray8(file_path, &self.global),
            Artifact::Bernsen => write_image_png_gray8(file_path, &self.bernsen),
            Artifact::Niblack => write_image_png_gray8(file_path, &self.niblack),
            Artifact::Sauvola => write_image_png_gray8(file_path, &self.sauvola),
        }
    }

    /// Write every artifact as PNG into `dir`.
    ///
    /// Each artifact is attempted even when an earlier one failed.
    ///
    /// # Returns
    ///
    /// The paths of the written files, in [`Artifact::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`BinarizeError::Artifacts`] with the path and cause of every
    /// artifact that could not be written.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, BinarizeError> {
        let dir = dir.as_ref();
        let mut written = Vec::with_capacity(Artifact::ALL.len());
        let mut failures = Vec::new();

        for artifact in Artifact::ALL {
            let file_path = dir.join(artifact.file_name());
            match self.write_artifact(artifact, &file_path) {
                Ok(()) => {
                    info!("wrote {}", file_path.display());
                    written.push(file_path);
                }
                Err(err) => {
                    warn!("failed to write {}: {err}", file_path.display());
                    failures.push((file_path, err));
                }
            }
        }

        if !failures.is_empty() {
            return Err(BinarizeError::Artifacts(failures));
        }

        Ok(written)
    }
}

/// Runs grayscale conversion, the histogram and the four thresholding sweeps.
///
/// # Example
///
/// ```
/// use limiar::image::{Image, ImageSize};
/// use limiar::{BinarizationPipeline, BinarizeConfig};
///
/// let rgb = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 6 }, 200).unwrap();
///
/// let pipeline = BinarizationPipeline::new(BinarizeConfig::default()).unwrap();
/// let output = pipeline.run(&rgb).unwrap();
///
/// assert_eq!(output.global_average, 200);
/// assert_eq!(output.bernsen.size(), rgb.size());
/// ```
#[derive(Debug, Clone)]
pub struct BinarizationPipeline {
    config: BinarizeConfig,
}

impl BinarizationPipeline {
    /// Create a pipeline from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BinarizeError::Config`] if the configuration is invalid.
    pub fn new(config: BinarizeConfig) -> Result<Self, BinarizeError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration of the pipeline.
    pub fn config(&self) -> &BinarizeConfig {
        &self.config
    }

    /// Decode the image at `file_path` and run the pipeline on it.
    ///
    /// A decode failure aborts before any other stage runs.
    pub fn run_path(&self, file_path: impl AsRef<Path>) -> Result<BinarizationOutput, BinarizeError> {
        let file_path = file_path.as_ref();
        debug!("stage: {} ({})", Stage::Load, file_path.display());
        let rgb = read_image_any_rgb8(file_path)?;
        debug!("decoded {} image", rgb.size());
        self.run(&rgb)
    }

    /// Run the pipeline on an RGB image.
    pub fn run(&self, rgb: &Image<u8, 3>) -> Result<BinarizationOutput, BinarizeError> {
        debug!("stage: {}", Stage::Grayscale);
        let mut gray = Image::from_size_val(rgb.size(), 0)?;
        gray_from_rgb_u8(rgb, &mut gray)?;

        self.run_gray(gray)
    }

    /// Run the histogram and the sweeps on a grayscale image.
    pub fn run_gray(&self, gray: Image<u8, 1>) -> Result<BinarizationOutput, BinarizeError> {
        let config = &self.config;

        debug!("stage: {}", Stage::Histogram);
        let mut histogram = vec![0; FULL_HISTOGRAM_BINS];
        compute_histogram(&gray, &mut histogram, FULL_HISTOGRAM_BINS)?;
        let condensed = condense_histogram(&histogram, config.histogram_buckets)?;
        let mut chart = Image::from_size_val(config.chart_size, 0)?;
        draw_histogram_chart(&mut chart, &condensed);

        let global_average = global_average(&gray)?;
        debug!("global average: {global_average}");

        let (strategy, pool) = sweep_pool(config.strategy)?;

        // every sweep reads the shared grayscale image and owns its output
        let sweeps = || {
            rayon::join(
                || {
                    rayon::join(
                        || {
                            sweep(&gray, Stage::GlobalSweep, |dst| {
                                threshold_global(&gray, dst, global_average, strategy)
                            })
                        },
                        || {
                            sweep(&gray, Stage::BernsenSweep, |dst| {
                                threshold_bernsen(
                                    &gray,
                                    dst,
                                    &config.window,
                                    &config.bernsen,
                                    strategy,
                                )
                            })
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            sweep(&gray, Stage::NiblackSweep, |dst| {
                                threshold_niblack(
                                    &gray,
                                    dst,
                                    &config.window,
                                    &config.niblack,
                                    strategy,
                                )
                            })
                        },
                        || {
                            sweep(&gray, Stage::SauvolaSweep, |dst| {
                                threshold_sauvola(
                                    &gray,
                                    dst,
                                    &config.window,
                                    &config.sauvola,
                                    strategy,
                                )
                            })
                        },
                    )
                },
            )
        };
        let ((global, bernsen), (niblack, sauvola)) = match &pool {
            Some(pool) => pool.install(sweeps),
            None => sweeps(),
        };

        let output = BinarizationOutput {
            global: global?,
            bernsen: bernsen?,
            niblack: niblack?,
            sauvola: sauvola?,
            gray,
            histogram,
            condensed,
            chart,
            global_average,
        };
        debug!("stage: {}", Stage::Done);

        Ok(output)
    }
}

// a fixed thread count is one pool shared by the four concurrent sweeps
fn sweep_pool(
    strategy: ExecutionStrategy,
) -> Result<(ExecutionStrategy, Option<rayon::ThreadPool>), BinarizeError> {
    match strategy {
        ExecutionStrategy::Fixed(n) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
            Ok((ExecutionStrategy::ParallelRows, Some(pool)))
        }
        other => Ok((other, None)),
    }
}

fn sweep(
    gray: &Image<u8, 1>,
    stage: Stage,
    f: impl FnOnce(&mut Image<u8, 1>) -> Result<(), ThresholdError>,
) -> Result<Image<u8, 1>, ThresholdError> {
    debug!("stage: {stage}");
    let mut dst = Image::from_size_val(gray.size(), 0)?;
    f(&mut dst)?;
    Ok(dst)
}
