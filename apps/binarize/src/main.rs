use argh::FromArgs;
use std::path::PathBuf;

use limiar::imgproc::border::BorderPolicy;
use limiar::{BinarizationPipeline, BinarizeConfig};

#[derive(FromArgs, Debug)]
/// Binarize an image with global, Bernsen, Niblack and Sauvola thresholding.
struct Args {
    /// path to the input image
    #[argh(option, default = "PathBuf::from(\"img.png\")")]
    infile: PathBuf,

    /// side length of the local window
    #[argh(option, short = 'n', default = "10")]
    window_size: usize,

    /// directory the output images are written to
    #[argh(option, default = "PathBuf::from(\".\")")]
    output_dir: PathBuf,

    /// policy for pixels outside the image: replicate, reflect or exclude
    #[argh(option, default = "BorderPolicy::Replicate")]
    border: BorderPolicy,

    /// number of worker threads, defaults to one per core
    #[argh(option)]
    threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = BinarizeConfig::default()
        .with_window_size(args.window_size)
        .with_border(args.border);
    let pipeline = BinarizationPipeline::new(config)?;

    if let Some(num_threads) = args.threads {
        if num_threads == 0 {
            return Err("--threads must be > 0".into());
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(limiar::BinarizeError::from)?;
    }

    log::info!("binarizing {}", args.infile.display());
    let output = pipeline.run_path(&args.infile)?;

    for (i, count) in output.condensed.iter().enumerate() {
        println!("{i}: {count}");
    }
    println!("global average: {}", output.global_average);

    std::fs::create_dir_all(&args.output_dir)?;
    output.save(&args.output_dir)?;

    Ok(())
}
