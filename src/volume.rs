use nalgebra::{Matrix3, Point3, Vector3};
use ndarray::{Array3, ArrayView2};

use crate::enums::Axis;
use crate::error::{Result, ViewError};
use crate::slicing;

/// A scalar volume stored as a `(z, y, x)` array together with the geometry
/// that places its voxels in physical space.
///
/// Spacing, origin and direction are expressed in physical `(x, y, z)` order,
/// as is the continuous index accepted by
/// [`Volume::continuous_index_to_physical_point`].
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub data: Array3<f32>,
    pub spacing: Vector3<f64>,
    pub origin: Point3<f64>,
    pub direction: Matrix3<f64>,
}

impl Volume {
    /// Unit spacing, zero origin and identity direction.
    pub fn new(data: Array3<f32>) -> Self {
        Self {
            data,
            spacing: Vector3::new(1.0, 1.0, 1.0),
            origin: Point3::origin(),
            direction: Matrix3::identity(),
        }
    }

    pub fn with_spacing(mut self, spacing: Vector3<f64>) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_direction(mut self, direction: Matrix3<f64>) -> Self {
        self.direction = direction;
        self
    }

    /// A volume with new voxel data on the same physical geometry.
    pub fn with_data(&self, data: Array3<f32>) -> Self {
        Self {
            data,
            spacing: self.spacing,
            origin: self.origin,
            direction: self.direction,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Number of voxels along physical x, y and z.
    pub fn size(&self) -> [usize; 3] {
        let (depth, height, width) = self.dim();
        [width, height, depth]
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Matrix mapping a continuous `(x, y, z)` index offset to a physical
    /// offset.
    pub fn index_to_physical_matrix(&self) -> Matrix3<f64> {
        self.direction * Matrix3::from_diagonal(&self.spacing)
    }

    pub fn continuous_index_to_physical_point(&self, index: &Vector3<f64>) -> Point3<f64> {
        self.origin + self.index_to_physical_matrix() * index
    }

    pub fn physical_point_to_continuous_index(&self, point: &Point3<f64>) -> Result<Vector3<f64>> {
        let inverse = self
            .index_to_physical_matrix()
            .try_inverse()
            .ok_or(ViewError::SingularGeometry)?;
        Ok(inverse * (point - self.origin))
    }

    /// Physical position of the geometric centre of the voxel grid.
    pub fn centre(&self) -> Point3<f64> {
        let size = self.size();
        let midpoint = Vector3::from_fn(|i, _| (size[i] as f64 - 1.0) / 2.0);
        self.continuous_index_to_physical_point(&midpoint)
    }

    pub fn get_slice_from_axis(&self, index: usize, axis: Axis) -> Result<ArrayView2<'_, f32>> {
        if !self.is_valid_index(index, axis) {
            return Err(ViewError::SliceOutOfBounds {
                axis,
                index,
                len: self.data.len_of(ndarray::Axis(axis.array_dim())),
            });
        }
        slicing::axis_slice(axis, index).apply_2d(self.data.view())
    }

    fn is_valid_index(&self, index: usize, axis: Axis) -> bool {
        index < self.data.len_of(ndarray::Axis(axis.array_dim()))
    }
}
