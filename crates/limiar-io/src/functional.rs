use std::path::Path;

use limiar_image::{Image, ImageSize};

use crate::error::IoError;

// open the file and let the image crate guess the format from its content
fn decode_any(file_path: &Path) -> Result<image::DynamicImage, IoError> {
    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?;

    Ok(img)
}

/// Reads an image from the given file path as 8-bit RGB.
///
/// The method reads any format supported by the image crate. Grayscale,
/// alpha and 16-bit inputs are converted to three 8-bit channels; alpha is
/// discarded.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image with three channels (rgb8).
///
/// # Errors
///
/// Returns [`IoError::FileDoesNotExist`] for a missing file and
/// [`IoError::ImageDecodeError`] when the content cannot be decoded.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Reads an image from the given file path as 8-bit grayscale.
///
/// Color inputs are reduced to luma by the image crate.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_any_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_luma8().into_raw())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::write_image_png_gray8;

    #[test]
    fn read_missing_file() {
        let res = read_image_any_rgb8("does/not/exist.png");
        assert!(matches!(res, Err(IoError::FileDoesNotExist(_))));
    }

    #[test]
    fn read_garbage_file() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("garbage.png");
        std::fs::write(&file_path, b"definitely not an image")?;

        let res = read_image_any_rgb8(&file_path);
        assert!(matches!(res, Err(IoError::ImageDecodeError(_))));
        Ok(())
    }

    #[test]
    fn read_gray_as_rgb8() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("gray.png");

        let gray = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0, 50, 100, 150, 200, 250],
        )?;
        write_image_png_gray8(&file_path, &gray)?;

        let rgb = read_image_any_rgb8(&file_path)?;
        assert_eq!(rgb.size(), gray.size());
        assert_eq!(rgb.num_channels(), 3);
        for (px, &v) in rgb.as_slice().chunks_exact(3).zip(gray.as_slice()) {
            assert_eq!(px, &[v, v, v]);
        }

        let mono = read_image_any_mono8(&file_path)?;
        assert_eq!(mono, gray);

        Ok(())
    }

    #[test]
    fn read_rgba_drops_alpha() -> Result<(), IoError> {
        let tmp_dir = tempfile::tempdir()?;
        let file_path = tmp_dir.path().join("rgba.png");

        let rgba = image::RgbaImage::from_raw(2, 1, vec![10, 20, 30, 0, 40, 50, 60, 255])
            .ok_or_else(|| IoError::PngEncodingError("bad buffer".to_string()))?;
        rgba.save(&file_path)?;

        let rgb = read_image_any_rgb8(&file_path)?;
        assert_eq!(rgb.as_slice(), &[10, 20, 30, 40, 50, 60]);

        Ok(())
    }
}
