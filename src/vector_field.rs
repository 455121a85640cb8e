//! Vector fields such as registration deformation fields, and the
//! reorientation of their components for in-plane display.

use ndarray::{Array2, Array4, ArrayView2, ArrayView3, Axis as ArrayAxis, Zip};

use crate::enums::Axis;
use crate::error::{Result, ViewError};
use crate::slicing::{self, SubsampleFactor, VectorGrid};

/// Position of a component in the trailing dimension of a [`VectorField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Axial = 0,
    Coronal = 1,
    Sagittal = 2,
}

/// A `(z, y, x, 3)` array holding an (axial, coronal, sagittal) vector per
/// voxel.
#[derive(Debug, Clone)]
pub struct VectorField {
    data: Array4<f32>,
}

/// Cross-section of a [`VectorField`], one 2-D view per component.
#[derive(Debug, Clone)]
pub struct VectorFieldSlice<'a> {
    pub axial: ArrayView2<'a, f32>,
    pub coronal: ArrayView2<'a, f32>,
    pub sagittal: ArrayView2<'a, f32>,
}

/// Vector components arranged for a 2-D plot: `horizontal` and `vertical`
/// lie in the display plane, `depth` points out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorientedField {
    pub horizontal: Array2<f32>,
    pub vertical: Array2<f32>,
    pub depth: Array2<f32>,
}

impl VectorField {
    pub fn new(data: Array4<f32>) -> Result<Self> {
        let components = data.len_of(ArrayAxis(3));
        if components != 3 {
            return Err(ViewError::validation(format!(
                "vector field must have 3 components in its last dimension, got {components}"
            )));
        }
        Ok(Self { data })
    }

    /// Build a field from three parallel component arrays.
    pub fn from_components(
        axial: ArrayView3<'_, f32>,
        coronal: ArrayView3<'_, f32>,
        sagittal: ArrayView3<'_, f32>,
    ) -> Result<Self> {
        for other in [coronal.view(), sagittal.view()] {
            if other.dim() != axial.dim() {
                return Err(ViewError::ShapeMismatch {
                    first: axial.shape().to_vec(),
                    second: other.shape().to_vec(),
                });
            }
        }

        let (z, y, x) = axial.dim();
        let mut data = Array4::zeros((z, y, x, 3));
        Zip::from(data.lanes_mut(ArrayAxis(3)))
            .and(&axial)
            .and(&coronal)
            .and(&sagittal)
            .for_each(|mut lane, &a, &c, &s| {
                lane[0] = a;
                lane[1] = c;
                lane[2] = s;
            });
        Ok(Self { data })
    }

    /// Spatial dimensions `(z, y, x)`.
    pub fn dim(&self) -> (usize, usize, usize) {
        let shape = self.data.shape();
        (shape[0], shape[1], shape[2])
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn component(&self, component: Component) -> ArrayView3<'_, f32> {
        self.data.index_axis(ArrayAxis(3), component as usize)
    }

    /// Subsampled cross-section at `cut` along `axis`.
    pub fn slice(
        &self,
        axis: Axis,
        cut: usize,
        subsample: SubsampleFactor,
    ) -> Result<VectorFieldSlice<'_>> {
        let spec = slicing::vector_field_slice(axis, cut, subsample);
        Ok(VectorFieldSlice {
            axial: spec.apply_2d(self.component(Component::Axial))?,
            coronal: spec.apply_2d(self.component(Component::Coronal))?,
            sagittal: spec.apply_2d(self.component(Component::Sagittal))?,
        })
    }

    /// Glyph positions matching [`VectorField::slice`].
    pub fn grid(&self, axis: Axis, subsample: SubsampleFactor) -> VectorGrid {
        slicing::vector_field_grid(axis, self.dim(), subsample)
    }
}

impl VectorFieldSlice<'_> {
    pub fn reorient(&self, axis: Axis, invert_field: bool) -> ReorientedField {
        reorient_vector_field(
            axis,
            self.axial.to_owned(),
            self.coronal.to_owned(),
            self.sagittal.to_owned(),
            invert_field,
        )
    }
}

/// Arrange sliced (axial, coronal, sagittal) components for display along
/// `axis`.
///
/// With `invert_field` every component is negated first, which converts
/// fields stored in image orientation to the display convention. The axial
/// view additionally flips the coronal component, since rows are drawn top
/// to bottom there.
pub fn reorient_vector_field(
    axis: Axis,
    axial: Array2<f32>,
    coronal: Array2<f32>,
    sagittal: Array2<f32>,
    invert_field: bool,
) -> ReorientedField {
    let (axial, coronal, sagittal) = if invert_field {
        (-axial, -coronal, -sagittal)
    } else {
        (axial, coronal, sagittal)
    };

    let (horizontal, vertical, depth) = match axis {
        Axis::X => (coronal, axial, sagittal),
        Axis::Y => (sagittal, axial, coronal),
        Axis::Z => (sagittal, -coronal, axial),
    };

    ReorientedField {
        horizontal,
        vertical,
        depth,
    }
}
