use limiar::image::{Image, ImageSize};
use limiar::imgproc::border::BorderPolicy;
use limiar::imgproc::parallel::ExecutionStrategy;
use limiar::io::functional::{read_image_any_mono8, read_image_any_rgb8};
use limiar::io::png::write_image_png_rgb8;
use limiar::io::IoError;
use limiar::{Artifact, BinarizationPipeline, BinarizeConfig, BinarizeError, Stage};

const BLACK: u8 = 0;
const WHITE: u8 = 255;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rgb_from_gray(width: usize, height: usize, gray: &[u8]) -> Result<Image<u8, 3>, BinarizeError> {
    let data = gray.iter().flat_map(|&v| [v, v, v]).collect();
    Ok(Image::new(ImageSize { width, height }, data)?)
}

// deterministic texture with dark strokes on a bright page
fn document(width: usize, height: usize) -> Result<Image<u8, 3>, BinarizeError> {
    let gray: Vec<u8> = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            let page = 180 + ((x * 7 + y * 13) % 40) as u8;
            if (x / 3) % 4 == 0 && y % 5 != 0 {
                page / 4
            } else {
                page
            }
        })
        .collect();
    rgb_from_gray(width, height, &gray)
}

#[test]
fn two_columns_global_and_bernsen_agree() -> Result<(), BinarizeError> {
    init_logger();
    let rgb = rgb_from_gray(4, 4, &[0, 0, 255, 255].repeat(4))?;

    let pipeline = BinarizationPipeline::new(BinarizeConfig::default().with_window_size(2))?;
    let output = pipeline.run(&rgb)?;

    let expected = [BLACK, BLACK, WHITE, WHITE].repeat(4);
    assert_eq!(output.global_average, 127);
    assert_eq!(output.global.as_slice(), expected.as_slice());
    assert_eq!(output.bernsen.as_slice(), expected.as_slice());

    Ok(())
}

#[test]
fn uniform_image_niblack_and_sauvola() -> Result<(), BinarizeError> {
    init_logger();
    let rgb = rgb_from_gray(7, 5, &[100; 35])?;

    let output = BinarizationPipeline::new(BinarizeConfig::default())?.run(&rgb)?;

    assert!(output.niblack.as_slice().iter().all(|&v| v == WHITE));
    assert!(output.sauvola.as_slice().iter().all(|&v| v == BLACK));
    assert!(output.global.as_slice().iter().all(|&v| v == WHITE));

    Ok(())
}

#[test]
fn outputs_match_input_dimensions() -> Result<(), BinarizeError> {
    init_logger();
    let rgb = document(37, 23)?;
    let output = BinarizationPipeline::new(BinarizeConfig::default())?.run(&rgb)?;

    assert_eq!(output.gray.size(), rgb.size());
    for stage in [
        Stage::GlobalSweep,
        Stage::BernsenSweep,
        Stage::NiblackSweep,
        Stage::SauvolaSweep,
    ] {
        let binary = output.binary(stage).ok_or_else(|| {
            BinarizeError::Config(format!("no binary image for {stage}"))
        })?;
        assert_eq!(binary.size(), rgb.size());
        assert!(binary.as_slice().iter().all(|&v| v == BLACK || v == WHITE));
    }

    Ok(())
}

#[test]
fn condensed_histogram_counts_every_pixel() -> Result<(), BinarizeError> {
    let rgb = document(41, 19)?;
    let output = BinarizationPipeline::new(BinarizeConfig::default())?.run(&rgb)?;

    assert_eq!(output.histogram.len(), 256);
    assert_eq!(output.condensed.len(), 50);
    assert_eq!(output.condensed.iter().sum::<usize>(), 41 * 19);
    assert_eq!(output.histogram.iter().sum::<usize>(), 41 * 19);

    Ok(())
}

#[test]
fn runs_are_repeatable_across_strategies() -> Result<(), BinarizeError> {
    let rgb = document(29, 31)?;

    for border in [
        BorderPolicy::Replicate,
        BorderPolicy::Reflect,
        BorderPolicy::Exclude,
    ] {
        let config = BinarizeConfig::default()
            .with_window_size(7)
            .with_border(border);

        let parallel = BinarizationPipeline::new(config.clone())?;
        let first = parallel.run(&rgb)?;
        let second = parallel.run(&rgb)?;
        assert_eq!(first, second);

        let serial = BinarizationPipeline::new(config.clone().with_strategy(ExecutionStrategy::Serial))?;
        assert_eq!(first, serial.run(&rgb)?);

        let fixed = BinarizationPipeline::new(config.with_strategy(ExecutionStrategy::Fixed(2)))?;
        assert_eq!(first, fixed.run(&rgb)?);
    }

    Ok(())
}

#[test]
fn save_writes_every_artifact() -> Result<(), BinarizeError> {
    init_logger();
    let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;

    let rgb = document(16, 12)?;
    let input_path = tmp_dir.path().join("img.png");
    write_image_png_rgb8(&input_path, &rgb)?;

    let output = BinarizationPipeline::new(BinarizeConfig::default())?.run_path(&input_path)?;
    let written = output.save(tmp_dir.path())?;

    assert_eq!(written.len(), Artifact::ALL.len());
    for (path, artifact) in written.iter().zip(Artifact::ALL) {
        assert!(path.exists(), "File does not exist: {:?}", path);
        assert!(path.ends_with(artifact.file_name()));
    }

    let sauvola = read_image_any_mono8(tmp_dir.path().join("binarSauvola.png"))?;
    assert_eq!(sauvola, output.sauvola);

    let gray = read_image_any_mono8(tmp_dir.path().join("grayScale.png"))?;
    assert_eq!(gray, output.gray);

    let chart = read_image_any_rgb8(tmp_dir.path().join("hist.png"))?;
    assert_eq!(chart, output.chart);

    Ok(())
}

#[test]
fn save_reports_every_failed_artifact() -> Result<(), BinarizeError> {
    let tmp_dir = tempfile::tempdir().map_err(IoError::from)?;
    let missing = tmp_dir.path().join("missing");

    let output = BinarizationPipeline::new(BinarizeConfig::default())?.run(&document(8, 8)?)?;

    match output.save(&missing) {
        Err(BinarizeError::Artifacts(failures)) => {
            assert_eq!(failures.len(), Artifact::ALL.len());
            for ((path, _), artifact) in failures.iter().zip(Artifact::ALL) {
                assert_eq!(path, &missing.join(artifact.file_name()));
            }
        }
        other => panic!("expected artifact failures, got {other:?}"),
    }

    Ok(())
}

#[test]
fn missing_input_fails_before_processing() {
    let res = BinarizationPipeline::new(BinarizeConfig::default())
        .and_then(|pipeline| pipeline.run_path("no/such/img.png"));
    assert!(matches!(
        res,
        Err(BinarizeError::Io(IoError::FileDoesNotExist(_)))
    ));
}
