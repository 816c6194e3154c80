use std::str::FromStr;

use crate::error::Error;

/// Falling sigmoid.
///
/// Goes from `end_val` down to `zero_val` as `x` passes `mid`, with
/// `width` controlling how wide the transition is.
///
/// ```text
///   ____
///       \________
///      mid
/// ```
///
/// There is no clamping: `x` far outside `mid +/- width` overflows the
/// exponential.  Normalized sample values in [0.0, 1.0] are fine.
#[inline]
pub fn sigmoid(zero_val: f32, end_val: f32, width: f32, mid: f32, x: f32) -> f32 {
    zero_val + (end_val - zero_val) * (1.0 / (1.0 + (10.0 * ((x - mid) / width)).exp()))
}

/// Rising sigmoid, the mirror image of `sigmoid()`.
///
/// ```text
///              ____
///   _______/
///         mid
/// ```
#[inline]
pub fn sigmoid_inv(zero_val: f32, end_val: f32, width: f32, mid: f32, x: f32) -> f32 {
    zero_val + (end_val - zero_val) * (1.0 / (1.0 + (10.0 * ((mid - x) / width)).exp()))
}

/// Named curve functions that an `RgbCurve` can be built from.
///
/// `Linear`, `Srgb` and `Gamma` are meant as response curves, the rest
/// as weight curves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CurveShape {
    Linear,
    Constant,
    Triangle,
    Gaussian,
    Plateau,
    Srgb,
    Gamma(f32),
}

impl CurveShape {
    pub fn eval(&self, x: f32) -> f32 {
        match *self {
            CurveShape::Linear => x,
            CurveShape::Constant => 1.0,
            CurveShape::Triangle => 1.0 - (2.0 * x - 1.0).abs(),
            CurveShape::Gaussian => {
                const SIGMA: f32 = 0.2;
                let d = x - 0.5;
                (-(d * d) / (2.0 * SIGMA * SIGMA)).exp()
            }
            CurveShape::Plateau => {
                sigmoid_inv(0.0, 1.0, 0.2, 0.1, x) * sigmoid(0.0, 1.0, 0.2, 0.9, x)
            }
            CurveShape::Srgb => {
                if x < 0.04045 {
                    x / 12.92
                } else {
                    ((x + 0.055) / 1.055).powf(2.4)
                }
            }
            CurveShape::Gamma(g) => x.max(0.0).powf(g),
        }
    }
}

impl FromStr for CurveShape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownCurveShape(s.to_string());
        let name = s.trim().to_ascii_lowercase();

        if let Some(g) = name.strip_prefix("gamma:") {
            return match g.parse::<f32>() {
                Ok(g) if g.is_finite() && g > 0.0 => Ok(CurveShape::Gamma(g)),
                _ => Err(unknown()),
            };
        }

        match name.as_str() {
            "linear" => Ok(CurveShape::Linear),
            "constant" => Ok(CurveShape::Constant),
            "triangle" => Ok(CurveShape::Triangle),
            "gaussian" => Ok(CurveShape::Gaussian),
            "plateau" => Ok(CurveShape::Plateau),
            "srgb" => Ok(CurveShape::Srgb),
            _ => Err(unknown()),
        }
    }
}

/// Three per-channel lookup tables over the normalized domain [0.0, 1.0].
///
/// Entry `i` of an `n` entry table is the curve's value at
/// `i / (n - 1)`, and evaluation linearly interpolates between entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbCurve {
    channels: [Vec<f32>; 3],
}

impl RgbCurve {
    pub fn from_channels(channels: [Vec<f32>; 3]) -> RgbCurve {
        RgbCurve { channels: channels }
    }

    /// Builds a curve by sampling `f(channel, x)` at `size` evenly
    /// spaced points in [0.0, 1.0].
    pub fn from_fn<F>(size: usize, f: F) -> RgbCurve
    where
        F: Fn(usize, f32) -> f32,
    {
        let denom = (size.max(2) - 1) as f32;
        let sample = |chan: usize| -> Vec<f32> {
            (0..size).map(|i| f(chan, i as f32 / denom)).collect()
        };

        RgbCurve {
            channels: [sample(0), sample(1), sample(2)],
        }
    }

    /// Builds a curve with the same shape in all three channels.
    pub fn from_shape(shape: CurveShape, size: usize) -> RgbCurve {
        RgbCurve::from_fn(size, |_, x| shape.eval(x))
    }

    /// Number of entries in the smallest channel table.
    pub fn len(&self) -> usize {
        self.channels.iter().map(|c| c.len()).min().unwrap_or(0)
    }

    /// True if any channel has no entries, which leaves it without a
    /// domain to evaluate over.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    /// Evaluates the curve at `x` for the given channel.
    ///
    /// Values of `x` outside [0.0, 1.0] get the value at the nearest end
    /// of the table.  The channel must not be empty.
    #[inline]
    pub fn eval(&self, x: f32, channel: usize) -> f32 {
        lerp_slice(self.channel(channel), x)
    }

    /// Returns a new curve for weighting the shortest exposure of a
    /// stack.
    ///
    /// The lower half of each table is kept as-is.  The upper half is
    /// inverted around 1.0 and scaled, so a weight `w` becomes
    /// `1 + (1 - w) * scale`.  For a weight curve that peaks at 1.0 in
    /// the middle this turns the falling upper tail into a rising one,
    /// favoring the bright samples the base curve distrusts.
    ///
    /// ```text
    ///                                /
    ///   base:     ____        new: _/
    ///          __/    \__        __/
    /// ```
    pub fn invert_and_scale_upper_half(&self, scale: f32) -> RgbCurve {
        let transform = |table: &Vec<f32>| -> Vec<f32> {
            let half = table.len() / 2;
            table
                .iter()
                .enumerate()
                .map(|(i, &w)| if i < half { w } else { 1.0 + (1.0 - w) * scale })
                .collect()
        };

        RgbCurve {
            channels: [
                transform(&self.channels[0]),
                transform(&self.channels[1]),
                transform(&self.channels[2]),
            ],
        }
    }
}

#[inline(always)]
fn lerp_slice(slice: &[f32], t: f32) -> f32 {
    let last = slice.len() - 1;
    if !(t > 0.0) {
        return slice[0];
    }

    let i1 = (last as f32 * t) as usize;
    if i1 >= last {
        slice[last]
    } else {
        let alpha = (last as f32 * t) - i1 as f32;
        let v1 = slice[i1];
        let v2 = slice[i1 + 1];
        v1 + ((v2 - v1) * alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_midpoints() {
        assert!((sigmoid(0.0, 1.0, 0.2, 0.5, 0.5) - 0.5).abs() < 0.000001);
        assert!((sigmoid_inv(0.0, 1.0, 0.2, 0.5, 0.5) - 0.5).abs() < 0.000001);
        assert!((sigmoid(2.0, 4.0, 0.2, 0.5, 0.5) - 3.0).abs() < 0.000001);
    }

    #[test]
    fn sigmoid_directions() {
        // Falling: starts near `end`, finishes near `zero`.
        assert!(sigmoid(0.0, 1.0, 0.2, 0.5, 0.0) > 0.99);
        assert!(sigmoid(0.0, 1.0, 0.2, 0.5, 1.0) < 0.01);

        // Rising: the reverse.
        assert!(sigmoid_inv(0.0, 1.0, 0.2, 0.5, 0.0) < 0.01);
        assert!(sigmoid_inv(0.0, 1.0, 0.2, 0.5, 1.0) > 0.99);

        for i in 0..100 {
            let x = i as f32 / 100.0;
            let y = (i + 1) as f32 / 100.0;
            assert!(sigmoid(0.0, 1.0, 0.2, 0.5, x) >= sigmoid(0.0, 1.0, 0.2, 0.5, y));
            assert!(sigmoid_inv(0.0, 1.0, 0.2, 0.5, x) <= sigmoid_inv(0.0, 1.0, 0.2, 0.5, y));
        }
    }

    #[test]
    fn sigmoids_mirror() {
        for i in 0..=10 {
            let x = i as f32 / 10.0;
            let a = sigmoid(0.0, 1.0, 0.3, 0.4, x);
            let b = sigmoid_inv(0.0, 1.0, 0.3, 0.4, x);
            assert!((a + b - 1.0).abs() < 0.00001);
        }
    }

    #[test]
    fn eval_interpolates() {
        let curve = RgbCurve::from_channels([vec![0.0, 1.0], vec![0.0, 2.0, 0.0], vec![5.0]]);
        assert_eq!(curve.eval(0.25, 0), 0.25);
        assert_eq!(curve.eval(0.5, 1), 2.0);
        assert_eq!(curve.eval(0.75, 1), 1.0);
        assert_eq!(curve.eval(0.3, 2), 5.0);
    }

    #[test]
    fn eval_holds_endpoints() {
        let table = vec![0.25, 0.75];
        let curve = RgbCurve::from_channels([table.clone(), table.clone(), table]);
        assert_eq!(curve.eval(-1.0, 0), 0.25);
        assert_eq!(curve.eval(0.0, 0), 0.25);
        assert_eq!(curve.eval(1.0, 0), 0.75);
        assert_eq!(curve.eval(7.0, 0), 0.75);
    }

    #[test]
    fn linear_is_identity() {
        let curve = RgbCurve::from_shape(CurveShape::Linear, 1024);
        for i in 0..=37 {
            let x = i as f32 / 37.0;
            for chan in 0..3 {
                assert!((curve.eval(x, chan) - x).abs() < 0.00001);
            }
        }
    }

    #[test]
    fn weight_shapes() {
        for &shape in &[CurveShape::Triangle, CurveShape::Gaussian, CurveShape::Plateau] {
            assert!((shape.eval(0.5) - 1.0).abs() < 0.01, "{:?}", shape);
            assert!(shape.eval(0.0) < 0.05, "{:?}", shape);
            assert!(shape.eval(1.0) < 0.05, "{:?}", shape);
        }
        assert_eq!(CurveShape::Triangle.eval(1.0), 0.0);
    }

    #[test]
    fn srgb_endpoints() {
        assert_eq!(CurveShape::Srgb.eval(0.0), 0.0);
        assert!((CurveShape::Srgb.eval(1.0) - 1.0).abs() < 0.000001);
    }

    #[test]
    fn parse_shapes() {
        assert_eq!("gaussian".parse::<CurveShape>(), Ok(CurveShape::Gaussian));
        assert_eq!("Plateau".parse::<CurveShape>(), Ok(CurveShape::Plateau));
        assert_eq!("gamma:2.2".parse::<CurveShape>(), Ok(CurveShape::Gamma(2.2)));
        assert_eq!(
            "gamma:-1".parse::<CurveShape>(),
            Err(Error::UnknownCurveShape("gamma:-1".into()))
        );
        assert_eq!(
            "bell".parse::<CurveShape>(),
            Err(Error::UnknownCurveShape("bell".into()))
        );
    }

    #[test]
    fn empty_curve() {
        assert!(RgbCurve::from_channels([vec![], vec![1.0], vec![1.0]]).is_empty());
        assert!(RgbCurve::from_fn(0, |_, x| x).is_empty());
        assert!(!RgbCurve::from_shape(CurveShape::Constant, 1).is_empty());
    }

    #[test]
    fn invert_and_scale_upper_half_keeps_lower_half() {
        let base = RgbCurve::from_shape(CurveShape::Triangle, 11);
        let derived = base.invert_and_scale_upper_half(3.0);

        for chan in 0..3 {
            assert_eq!(&derived.channel(chan)[..5], &base.channel(chan)[..5]);
            for i in 5..11 {
                let w = base.channel(chan)[i];
                assert_eq!(derived.channel(chan)[i], 1.0 + (1.0 - w) * 3.0);
            }
        }

        // Rises through the upper half, reaching `1 + scale` at the top.
        assert_eq!(derived.eval(0.5, 0), 1.0);
        assert_eq!(derived.eval(1.0, 0), 4.0);

        // The base curve is untouched.
        assert_eq!(base.eval(1.0, 0), 0.0);
    }

    #[test]
    fn invert_and_scale_upper_half_of_constant() {
        let base = RgbCurve::from_shape(CurveShape::Constant, 64);
        let derived = base.invert_and_scale_upper_half(1.0);
        assert_eq!(derived, base);
    }
}
