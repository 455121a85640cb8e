//! Oblique projections: rotate a volume about its centre, then collapse one
//! image axis with a statistic.

use ndarray::{Array2, Axis as ArrayAxis};
use rayon::prelude::*;
use tracing::debug;
use web_time::Instant;

use crate::enums::{InterpolationMode, ProjectionKind};
use crate::error::{Result, ViewError};
use crate::ops::{NdVolumeOps, RigidTransform, VolumeOps};
use crate::volume::Volume;

/// Parameters of a single oblique projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeProjectionRequest {
    pub kind: ProjectionKind,
    /// Image axis that is collapsed, in physical index order: 0 is x, 1 is y,
    /// 2 is z. Axis `a` is array axis `2 - a` of the `(z, y, x)` data.
    pub projection_axis: usize,
    /// Rotation axis in physical `(x, y, z)` coordinates.
    pub rotation_axis: [f64; 3],
    /// Rotation angle in radians.
    pub rotation_angle: f64,
    /// Value given to samples that fall outside the volume after rotation.
    pub fill_value: f32,
    pub interpolation: InterpolationMode,
}

impl Default for VolumeProjectionRequest {
    fn default() -> Self {
        Self {
            kind: ProjectionKind::Mean,
            projection_axis: 0,
            rotation_axis: [1.0, 0.0, 0.0],
            rotation_angle: 0.0,
            fill_value: -1000.0,
            interpolation: InterpolationMode::Linear,
        }
    }
}

impl VolumeProjectionRequest {
    pub fn with_kind(mut self, kind: ProjectionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Select the statistic by name, e.g. `"mean"` or `"max"`.
    pub fn with_kind_name(self, name: &str) -> Result<Self> {
        Ok(self.with_kind(name.parse()?))
    }

    pub fn with_projection_axis(mut self, axis: usize) -> Self {
        self.projection_axis = axis;
        self
    }

    pub fn with_rotation(mut self, axis: [f64; 3], angle: f64) -> Self {
        self.rotation_axis = axis;
        self.rotation_angle = angle;
        self
    }

    pub fn with_fill_value(mut self, fill_value: f32) -> Self {
        self.fill_value = fill_value;
        self
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Axis of the `(z, y, x)` data array collapsed by this request.
    pub fn array_axis(&self) -> Result<usize> {
        self.validate()?;
        Ok(2 - self.projection_axis)
    }

    fn validate(&self) -> Result<()> {
        if self.projection_axis > 2 {
            return Err(ViewError::lookup(format!(
                "projection axis {} is not one of 0, 1, 2",
                self.projection_axis
            )));
        }
        Ok(())
    }
}

pub struct ObliquePlaneProjector<O = NdVolumeOps> {
    ops: O,
}

impl ObliquePlaneProjector<NdVolumeOps> {
    pub fn new() -> Self {
        Self::with_ops(NdVolumeOps)
    }
}

impl Default for ObliquePlaneProjector<NdVolumeOps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: VolumeOps> ObliquePlaneProjector<O> {
    pub fn with_ops(ops: O) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Rotate `volume` about its physical centre and project it along
    /// `request.projection_axis`, returning the 2-D image spanned by the two
    /// remaining axes in `(z, y, x)` array order. Projecting along x (axis 0)
    /// gives a `(z, y)` image.
    pub fn project(&self, volume: &Volume, request: &VolumeProjectionRequest) -> Result<Array2<f32>> {
        let array_axis = request.array_axis()?;
        let start = Instant::now();

        let transform = RigidTransform::from_axis_angle(
            volume.centre(),
            request.rotation_axis,
            request.rotation_angle,
        )?;
        let resampled =
            self.ops
                .resample(volume, &transform, request.interpolation, request.fill_value)?;

        let axis = ArrayAxis(array_axis);
        let projected = self.ops.project(&resampled, request.kind, array_axis)?;
        let len = projected.data.len_of(axis);
        if len != 1 {
            return Err(ViewError::validation(format!(
                "projection left {len} samples along array axis {array_axis}, expected 1"
            )));
        }

        debug!(
            kind = %request.kind,
            axis = request.projection_axis,
            angle = request.rotation_angle,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "oblique projection"
        );
        Ok(projected.data.index_axis_move(axis, 0))
    }

    /// Run independent requests against one volume on the rayon pool.
    pub fn project_many(
        &self,
        volume: &Volume,
        requests: &[VolumeProjectionRequest],
    ) -> Vec<Result<Array2<f32>>>
    where
        O: Sync,
    {
        requests
            .par_iter()
            .map(|request| self.project(volume, request))
            .collect()
    }
}
