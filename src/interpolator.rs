use ndarray::{Array3, ArrayView3, ArrayViewMut1, Axis as ArrayAxis};

use crate::enums::InterpolationMode;

/// Pole of the cubic B-spline prefilter.
const BSPLINE_POLE: f64 = -0.267_949_192_431_122_7; // sqrt(3) - 2

/// Point sampler over one volume. B-spline coefficients are computed once on
/// construction.
pub(crate) struct Interpolator<'a> {
    data: ArrayView3<'a, f32>,
    mode: InterpolationMode,
    coefficients: Option<Array3<f64>>,
}

impl<'a> Interpolator<'a> {
    pub(crate) fn new(data: ArrayView3<'a, f32>, mode: InterpolationMode) -> Self {
        let coefficients = match mode {
            InterpolationMode::BSpline => Some(Self::bspline_coefficients(&data)),
            InterpolationMode::NearestNeighbor | InterpolationMode::Linear => None,
        };
        Self {
            data,
            mode,
            coefficients,
        }
    }

    /// Sample at a continuous array index `(z, y, x)`.
    ///
    /// Positions outside the buffer, i.e. further than half a voxel beyond the
    /// first or last sample along any dimension, yield `fill`.
    pub(crate) fn sample(&self, index: [f64; 3], fill: f32) -> f32 {
        let (depth, height, width) = self.data.dim();
        let dims = [depth, height, width];
        let inside = index
            .iter()
            .zip(dims)
            .all(|(&c, n)| c >= -0.5 && c < n as f64 - 0.5);
        if !inside {
            return fill;
        }

        match (self.mode, &self.coefficients) {
            (InterpolationMode::NearestNeighbor, _) => Self::nearest(&self.data, index),
            (InterpolationMode::Linear, _) => Self::trilinear_interpolate(&self.data, index),
            (InterpolationMode::BSpline, Some(coefficients)) => {
                Self::bspline_interpolate(coefficients, index)
            }
            (InterpolationMode::BSpline, None) => fill,
        }
    }

    #[inline]
    fn clamp_index(i: isize, len: usize) -> usize {
        i.clamp(0, len as isize - 1) as usize
    }

    /// Reflect `i` about the first and last sample (whole-sample symmetry).
    #[inline]
    fn mirror_index(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let period = 2 * len as isize - 2;
        let i = i.rem_euclid(period);
        if i >= len as isize {
            (period - i) as usize
        } else {
            i as usize
        }
    }

    #[inline]
    fn nearest(data: &ArrayView3<f32>, index: [f64; 3]) -> f32 {
        let (depth, height, width) = data.dim();
        let z = Self::clamp_index(index[0].round() as isize, depth);
        let y = Self::clamp_index(index[1].round() as isize, height);
        let x = Self::clamp_index(index[2].round() as isize, width);
        data[[z, y, x]]
    }

    #[inline]
    fn trilinear_interpolate(data: &ArrayView3<f32>, index: [f64; 3]) -> f32 {
        let (depth, height, width) = data.dim();

        let z = index[0].floor();
        let y = index[1].floor();
        let x = index[2].floor();

        let z0 = Self::clamp_index(z as isize, depth);
        let y0 = Self::clamp_index(y as isize, height);
        let x0 = Self::clamp_index(x as isize, width);
        let z1 = Self::clamp_index(z as isize + 1, depth);
        let y1 = Self::clamp_index(y as isize + 1, height);
        let x1 = Self::clamp_index(x as isize + 1, width);

        let dz = (index[0] - z) as f32;
        let dy = (index[1] - y) as f32;
        let dx = (index[2] - x) as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;
        let one_minus_dz = 1.0 - dz;

        let plane = |zi: usize| {
            let v00 = data[[zi, y0, x0]];
            let v01 = data[[zi, y0, x1]];
            let v10 = data[[zi, y1, x0]];
            let v11 = data[[zi, y1, x1]];

            let v0 = v00.mul_add(one_minus_dx, v01 * dx);
            let v1 = v10.mul_add(one_minus_dx, v11 * dx);

            v0.mul_add(one_minus_dy, v1 * dy)
        };

        plane(z0).mul_add(one_minus_dz, plane(z1) * dz)
    }

    /// Cubic B-spline kernel:
    /// - 2/3 - |x|^2 + |x|^3 / 2   for |x| < 1
    /// - (2 - |x|)^3 / 6           for 1 <= |x| < 2
    /// - 0                         otherwise
    #[inline]
    fn cubic_bspline(x: f64) -> f64 {
        let abs_x = x.abs();
        if abs_x < 1.0 {
            (2.0 / 3.0) - abs_x.powi(2) + 0.5 * abs_x.powi(3)
        } else if abs_x < 2.0 {
            (2.0 - abs_x).powi(3) / 6.0
        } else {
            0.0
        }
    }

    fn bspline_weights(c: f64, len: usize) -> [(usize, f64); 4] {
        let base = c.floor() as isize - 1;
        std::array::from_fn(|k| {
            let i = base + k as isize;
            (Self::mirror_index(i, len), Self::cubic_bspline(c - i as f64))
        })
    }

    /// Turn samples into cubic B-spline coefficients so that the spline passes
    /// through every sample. Separable recursive filter, one pass per axis.
    fn bspline_coefficients(data: &ArrayView3<f32>) -> Array3<f64> {
        let mut coefficients = data.mapv(f64::from);
        for axis in 0..3 {
            for lane in coefficients.lanes_mut(ArrayAxis(axis)) {
                Self::prefilter_lane(lane);
            }
        }
        coefficients
    }

    fn prefilter_lane(mut c: ArrayViewMut1<'_, f64>) {
        let n = c.len();
        if n < 2 {
            return;
        }
        let z = BSPLINE_POLE;
        let gain = (1.0 - z) * (1.0 - 1.0 / z);
        c.mapv_inplace(|v| v * gain);

        c[0] = Self::initial_causal_coefficient(&c, z);
        for k in 1..n {
            let previous = c[k - 1];
            c[k] += z * previous;
        }

        let last = (z / (z * z - 1.0)) * (z * c[n - 2] + c[n - 1]);
        c[n - 1] = last;
        for k in (0..n - 1).rev() {
            let next = c[k + 1];
            c[k] = z * (next - c[k]);
        }
    }

    /// First causal coefficient under mirror boundaries.
    fn initial_causal_coefficient(c: &ArrayViewMut1<'_, f64>, z: f64) -> f64 {
        let n = c.len();
        let horizon = (f64::EPSILON.ln() / z.abs().ln()).ceil() as usize;

        if horizon < n {
            let mut zn = z;
            let mut sum = c[0];
            for k in 1..horizon {
                sum += zn * c[k];
                zn *= z;
            }
            sum
        } else {
            let iz = 1.0 / z;
            let mut zn = z;
            let mut z2n = z.powi(n as i32 - 1);
            let mut sum = c[0] + z2n * c[n - 1];
            z2n *= z2n * iz;
            for k in 1..n - 1 {
                sum += (zn + z2n) * c[k];
                zn *= z;
                z2n *= iz;
            }
            sum / (1.0 - zn * zn)
        }
    }

    fn bspline_interpolate(coefficients: &Array3<f64>, index: [f64; 3]) -> f32 {
        let (depth, height, width) = coefficients.dim();
        let wz = Self::bspline_weights(index[0], depth);
        let wy = Self::bspline_weights(index[1], height);
        let wx = Self::bspline_weights(index[2], width);

        let mut value = 0.0_f64;
        for &(z, weight_z) in &wz {
            for &(y, weight_y) in &wy {
                let weight_zy = weight_z * weight_y;
                for &(x, weight_x) in &wx {
                    value += weight_zy * weight_x * coefficients[[z, y, x]];
                }
            }
        }
        value as f32
    }
}
