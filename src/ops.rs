//! Resampling, statistical projection and colour conversion primitives.
//!
//! [`VolumeOps`] is the capability the projector and the colour blender
//! depend on. [`NdVolumeOps`] implements it on the CPU with ndarray and
//! rayon; tests and alternative backends can supply their own.

use nalgebra::{Point3, Rotation3, Unit, Vector3};
use ndarray::{Array3, ArrayView1, ArrayView3, Axis as ArrayAxis, Zip};
use tracing::debug;
use web_time::Instant;

use crate::enums::{InterpolationMode, ProjectionKind};
use crate::error::{Result, ViewError};
use crate::interpolator::Interpolator;
use crate::volume::Volume;

/// Rigid transform rotating about a fixed centre:
/// `T(p) = R (p - c) + c + t`.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
    pub center: Point3<f64>,
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity(center: Point3<f64>) -> Self {
        Self {
            center,
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Rotation by `angle` radians about `axis`, which need not be normalised.
    pub fn from_axis_angle(center: Point3<f64>, axis: [f64; 3], angle: f64) -> Result<Self> {
        let unit = Unit::try_new(Vector3::from(axis), f64::EPSILON)
            .ok_or(ViewError::InvalidRotationAxis(axis))?;
        Ok(Self {
            center,
            rotation: Rotation3::from_axis_angle(&unit, angle),
            translation: Vector3::zeros(),
        })
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.center + self.rotation * (point - self.center) + self.translation
    }
}

/// Voxels are `f32` throughout, so resampling always produces the input's
/// pixel type.
pub trait VolumeOps {
    /// Resample `volume` onto its own grid: each output voxel takes the input
    /// value at `transform` applied to the voxel's physical position.
    fn resample(
        &self,
        volume: &Volume,
        transform: &RigidTransform,
        interpolation: InterpolationMode,
        fill_value: f32,
    ) -> Result<Volume>;

    /// Collapse array axis `axis` of the `(z, y, x)` data to length 1 with the
    /// given statistic, keeping the geometry of `volume`.
    fn project(&self, volume: &Volume, kind: ProjectionKind, axis: usize) -> Result<Volume>;

    /// Convert an `(..., ..., 3)` HSV array with values in `[0, 1]` to RGB.
    fn hsv_to_rgb(&self, hsv: ArrayView3<'_, f32>) -> Result<Array3<f32>>;
}

/// CPU implementation of [`VolumeOps`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NdVolumeOps;

impl NdVolumeOps {
    fn reduce(kind: ProjectionKind, lane: ArrayView1<'_, f32>) -> f32 {
        let n = lane.len();
        if n == 0 {
            return 0.0;
        }
        match kind {
            ProjectionKind::Sum => lane.iter().map(|&v| f64::from(v)).sum::<f64>() as f32,
            ProjectionKind::Mean => {
                (lane.iter().map(|&v| f64::from(v)).sum::<f64>() / n as f64) as f32
            }
            ProjectionKind::Median => {
                let mut values = lane.to_vec();
                let (_, median, _) = values.select_nth_unstable_by(n / 2, f32::total_cmp);
                *median
            }
            ProjectionKind::Std => {
                if n == 1 {
                    return 0.0;
                }
                let (sum, sum_sq) = lane.iter().fold((0.0_f64, 0.0_f64), |(s, sq), &v| {
                    let v = f64::from(v);
                    (s + v, sq + v * v)
                });
                let variance = (sum_sq - sum * sum / n as f64) / (n as f64 - 1.0);
                variance.max(0.0).sqrt() as f32
            }
            ProjectionKind::Min => lane.iter().copied().fold(f32::INFINITY, f32::min),
            ProjectionKind::Max => lane.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        }
    }

    fn hsv_pixel(h: f32, s: f32, v: f32) -> [f32; 3] {
        let h6 = h * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);
        match (sector as i64).rem_euclid(6) {
            0 => [v, t, p],
            1 => [q, v, p],
            2 => [p, v, t],
            3 => [p, q, v],
            4 => [t, p, v],
            _ => [v, p, q],
        }
    }
}

impl VolumeOps for NdVolumeOps {
    fn resample(
        &self,
        volume: &Volume,
        transform: &RigidTransform,
        interpolation: InterpolationMode,
        fill_value: f32,
    ) -> Result<Volume> {
        let start = Instant::now();

        // Compose index -> physical -> transform -> index into one affine map
        // acting on (x, y, z) continuous indices.
        let to_physical = volume.index_to_physical_matrix();
        let to_index = to_physical
            .try_inverse()
            .ok_or(ViewError::SingularGeometry)?;
        let linear = to_index * transform.rotation.matrix() * to_physical;
        let offset = to_index
            * (transform.transform_point(&volume.origin) - volume.origin);

        let interpolator = Interpolator::new(volume.data.view(), interpolation);
        let mut output = Array3::<f32>::zeros(volume.dim());
        Zip::indexed(&mut output).par_for_each(|(z, y, x), value| {
            let source = linear * Vector3::new(x as f64, y as f64, z as f64) + offset;
            *value = interpolator.sample([source.z, source.y, source.x], fill_value);
        });

        debug!(
            dim = ?volume.dim(),
            ?interpolation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resampled volume"
        );
        Ok(volume.with_data(output))
    }

    fn project(&self, volume: &Volume, kind: ProjectionKind, axis: usize) -> Result<Volume> {
        if axis > 2 {
            return Err(ViewError::lookup(format!(
                "projection axis {axis} is not one of 0, 1, 2"
            )));
        }
        let start = Instant::now();

        let reduced = Zip::from(volume.data.lanes(ArrayAxis(axis)))
            .par_map_collect(|lane| Self::reduce(kind, lane));
        let collapsed = reduced.insert_axis(ArrayAxis(axis));

        debug!(
            %kind,
            axis,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "projected volume"
        );
        Ok(volume.with_data(collapsed))
    }

    fn hsv_to_rgb(&self, hsv: ArrayView3<'_, f32>) -> Result<Array3<f32>> {
        let channels = hsv.len_of(ArrayAxis(2));
        if channels != 3 {
            return Err(ViewError::validation(format!(
                "HSV array must have 3 channels in its last dimension, got {channels}"
            )));
        }

        let mut rgb = Array3::<f32>::zeros(hsv.raw_dim());
        Zip::from(rgb.lanes_mut(ArrayAxis(2)))
            .and(hsv.lanes(ArrayAxis(2)))
            .par_for_each(|mut out, pixel| {
                let [r, g, b] = Self::hsv_pixel(pixel[0], pixel[1], pixel[2]);
                out[0] = r;
                out[1] = g;
                out[2] = b;
            });
        Ok(rgb)
    }
}
