use limiar_image::Image;
use std::cmp::{max, min};

/// Margin around the plot area of a chart, in pixels.
pub const CHART_MARGIN: usize = 10;

const CHART_BACKGROUND: [u8; 3] = [255, 255, 255];
const CHART_BAR: [u8; 3] = [0, 0, 0];
const CHART_AXIS: [u8; 3] = [0, 0, 0];

/// Helper function to set a pixel's color, skipping coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a filled rectangle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y), exclusive.
/// * `color` - The fill color of the rectangle.
pub fn draw_filled_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
) {
    let (x_start, y_start) = top_left;
    let (x_end, y_end) = bottom_right;

    // clamp to the image bounds
    let x_min = max(0, min(x_start, x_end));
    let y_min = max(0, min(y_start, y_end));
    let x_max = min(img.cols() as i64, max(x_start, x_end));
    let y_max = min(img.rows() as i64, max(y_start, y_end));

    for y in y_min..y_max {
        for x in x_min..x_max {
            set_pixel(img, x, y, color);
        }
    }
}

/// Draws a bar chart of histogram buckets inplace.
///
/// The image is cleared to white, a horizontal axis is drawn along the bottom
/// of the plot area and every bucket gets one black bar whose height is scaled
/// to the largest bucket. Bars never overlap; buckets that do not fit in the
/// plot width are not drawn.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `buckets` - The bucket counts, left to right.
///
/// # Example
///
/// ```
/// use limiar_image::{Image, ImageSize};
/// use limiar_imgproc::draw::draw_histogram_chart;
///
/// let mut chart = Image::<u8, 3>::from_size_val(
///     ImageSize { width: 120, height: 60 },
///     0,
/// ).unwrap();
///
/// draw_histogram_chart(&mut chart, &[1, 4, 2, 0]);
/// assert_eq!(chart.get([0, 0, 0]), Some(&255));
/// ```
pub fn draw_histogram_chart(img: &mut Image<u8, 3>, buckets: &[usize]) {
    img.as_slice_mut()
        .chunks_exact_mut(3)
        .for_each(|px| px.copy_from_slice(&CHART_BACKGROUND));

    let width = img.cols();
    let height = img.rows();
    if width <= 2 * CHART_MARGIN || height <= 2 * CHART_MARGIN {
        return;
    }

    let plot_width = width - 2 * CHART_MARGIN;
    let plot_height = height - 2 * CHART_MARGIN;
    let baseline = (height - CHART_MARGIN) as i64;
    let left = CHART_MARGIN as i64;

    draw_filled_rect(
        img,
        (left, baseline),
        (left + plot_width as i64, baseline + 1),
        CHART_AXIS,
    );

    let peak = buckets.iter().copied().max().unwrap_or(0);
    if peak == 0 {
        return;
    }

    let bar_width = max(1, plot_width / buckets.len());
    let gap = if bar_width > 2 { 1 } else { 0 };

    for (i, &count) in buckets.iter().enumerate() {
        let x0 = i * bar_width;
        if x0 >= plot_width {
            break;
        }
        let bar_height = (count as u128 * plot_height as u128 / peak as u128) as i64;
        let x0 = left + x0 as i64;
        draw_filled_rect(
            img,
            (x0, baseline - bar_height),
            (x0 + (bar_width - gap) as i64, baseline),
            CHART_BAR,
        );
    }
}
