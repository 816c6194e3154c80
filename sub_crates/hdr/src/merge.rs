use rayon::prelude::*;
use tracing::debug;

use crate::{curve::RgbCurve, error::Error, image::Image};

/// Luminance ceiling used to scale the shortest exposure's highlight
/// weighting.
pub const MAX_LUMINANCE: f32 = 1000.0;

/// Floor for the per-channel weight sum, so pixels where every sample
/// gets zero weight come out as a finite value.
pub const MIN_WEIGHT_SUM: f64 = 0.001;

/// Tuning for `merge()`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MergeParams {
    /// The exposure time the output radiance is normalized to.
    pub target_time: f32,

    /// Robust response calibration mode.  Handled by whatever produced
    /// the response curve; it doesn't change the merge itself.
    pub robust_calibration: bool,

    /// How much to trust near-clipped samples of the shortest exposure.
    /// Non-negative, typically small.
    pub clamp_correction: f32,
}

impl Default for MergeParams {
    fn default() -> MergeParams {
        MergeParams {
            target_time: 1.0,
            robust_calibration: false,
            clamp_correction: 0.0,
        }
    }
}

/// Merges an exposure stack into a single radiance image.
///
/// `images` must be ordered from shortest to longest exposure, with
/// `exposure_times` matching index for index.  Every sample is passed
/// through `response` and divided by its image's exposure time, then
/// the results are averaged using `weight` as the confidence of each
/// sample.  The shortest exposure is weighted with a derived curve
/// (see `RgbCurve::invert_and_scale_upper_half()`) so that its bright
/// samples, which are clipped in every other image, are trusted.
///
/// The result is scaled to `params.target_time`.
///
/// Sample values are expected to lie in the curves' domain, [0.0, 1.0].
/// They are not clamped.
pub fn merge(
    images: &[Image],
    exposure_times: &[f32],
    weight: &RgbCurve,
    response: &RgbCurve,
    params: &MergeParams,
) -> Result<Image, Error> {
    //----------------
    // Checks.
    if response.is_empty() {
        return Err(Error::EmptyResponseCurve);
    }
    if weight.is_empty() {
        return Err(Error::EmptyWeightCurve);
    }
    if images.is_empty() {
        return Err(Error::EmptyStack);
    }
    if images.len() != exposure_times.len() {
        return Err(Error::TimeCountMismatch {
            images: images.len(),
            times: exposure_times.len(),
        });
    }

    let (width, height) = images[0].dimensions();
    for (i, img) in images.iter().enumerate() {
        if img.dimensions() != (width, height) {
            return Err(Error::DimensionMismatch {
                index: i,
                expected: (width, height),
                found: img.dimensions(),
            });
        }
    }
    for (i, &time) in exposure_times.iter().enumerate() {
        if !(time.is_finite() && time > 0.0) {
            return Err(Error::InvalidExposureTime { index: i, time: time });
        }
    }

    //----------------
    // Merge.
    debug!(
        "Merging {} exposures of {}x{}, target time {}, clamp correction {}",
        images.len(),
        width,
        height,
        params.target_time,
        params.clamp_correction,
    );
    if params.robust_calibration {
        debug!("Robust calibration is handled by the response curve's source");
    }

    let weight_shortest = weight.invert_and_scale_upper_half(
        1.0 + params.clamp_correction * MAX_LUMINANCE,
    );
    let target_time = params.target_time as f64;

    let mut pixels = vec![[0.0f32; 3]; width * height];
    if width > 0 {
        pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, radiance) in row.iter_mut().enumerate() {
                    for chan in 0..3 {
                        let mut w_sum = 0.0f64;
                        let mut w_div = 0.0f64;

                        // Shortest exposure.
                        //
                        // weight_shortest:          /
                        //                       ___/
                        //                  ____/
                        //                 0       1
                        {
                            let value = images[0].pixel(x, y)[chan];
                            let time = exposure_times[0] as f64;
                            let w = weight_shortest.eval(value, chan).max(0.0) as f64;
                            let r = response.eval(value, chan) as f64;
                            w_sum += w * r / time;
                            w_div += w;
                        }

                        // The rest.
                        //
                        // weight:           ____
                        //            ______/    \______
                        //           0                  1
                        for (img, &time) in images.iter().zip(exposure_times.iter()).skip(1) {
                            let value = img.pixel(x, y)[chan];
                            let time = time as f64;
                            let w = weight.eval(value, chan).max(0.0) as f64;
                            let r = response.eval(value, chan) as f64;
                            w_sum += w * r / time;
                            w_div += w;
                        }

                        radiance[chan] = (w_sum / w_div.max(MIN_WEIGHT_SUM) * target_time) as f32;
                    }
                }
            });
    }

    Image::new(width, height, pixels)
}
