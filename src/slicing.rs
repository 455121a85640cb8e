//! Mapping of `(axis, index)` requests onto slices of `(z, y, x)` arrays.
//!
//! Three builders live here:
//!  - [`axis_slice`] selects a single 2-D cross-section of a volume
//!  - [`vector_field_slice`] selects a subsampled cross-section of a vector
//!    field
//!  - [`vector_field_grid`] produces the glyph positions matching
//!    [`vector_field_slice`]
//!
//! Strides are always chosen by array dimension: the axial stride applies to
//! dimension 0, the coronal stride to dimension 1 and the sagittal stride to
//! dimension 2, whatever the viewing axis.

use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewD, Axis as ArrayAxis, Ix2, Slice};
use tracing::trace;

use crate::enums::Axis;
use crate::error::{Result, ViewError};

/// Selection applied to one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Full,
    Strided(usize),
    Index(usize),
}

impl Selector {
    /// Number of elements this selector keeps from a dimension of length `len`.
    /// A fixed index keeps none, the dimension disappears. Fails on a zero
    /// stride.
    pub fn kept_len(self, dim: usize, len: usize) -> Result<Option<usize>> {
        match self {
            Selector::Full => Ok(Some(len)),
            Selector::Strided(step) => Ok(Some(len.div_ceil(check_stride(dim, step)?))),
            Selector::Index(_) => Ok(None),
        }
    }
}

fn check_stride(dim: usize, step: usize) -> Result<usize> {
    if step == 0 {
        return Err(ViewError::validation(format!(
            "stride on dimension {dim} must be at least 1"
        )));
    }
    Ok(step)
}

/// Per-dimension selection over a 3-D array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec(pub [Selector; 3]);

impl SliceSpec {
    pub fn selectors(&self) -> &[Selector; 3] {
        &self.0
    }

    /// Shape of the view obtained by applying this spec to an array of
    /// shape `dim`. Rejects the same zero strides as [`SliceSpec::apply`].
    pub fn output_shape(&self, dim: (usize, usize, usize)) -> Result<Vec<usize>> {
        let lens = [dim.0, dim.1, dim.2];
        let mut shape = Vec::with_capacity(3);
        for (axis, (selector, len)) in self.0.iter().zip(lens).enumerate() {
            if let Some(kept) = selector.kept_len(axis, len)? {
                shape.push(kept);
            }
        }
        Ok(shape)
    }

    /// Apply the spec to a 3-D view. The result borrows from `view`.
    pub fn apply<'a, A>(&self, view: ArrayView3<'a, A>) -> Result<ArrayViewD<'a, A>> {
        let mut view = view.into_dyn();

        for (dim, selector) in self.0.iter().enumerate() {
            match *selector {
                Selector::Full => {}
                Selector::Strided(step) => {
                    let step = check_stride(dim, step)?;
                    view.slice_axis_inplace(ArrayAxis(dim), Slice::new(0, None, step as isize));
                }
                Selector::Index(index) => {
                    let len = view.len_of(ArrayAxis(dim));
                    if index >= len {
                        return Err(ViewError::IndexOutOfBounds { dim, index, len });
                    }
                }
            }
        }

        // Remove fixed dimensions back to front so the remaining indices stay valid.
        for (dim, selector) in self.0.iter().enumerate().rev() {
            if let Selector::Index(index) = *selector {
                view.index_axis_inplace(ArrayAxis(dim), index);
            }
        }

        Ok(view)
    }

    /// Apply a spec that fixes exactly one dimension, yielding a 2-D view.
    pub fn apply_2d<'a, A>(&self, view: ArrayView3<'a, A>) -> Result<ArrayView2<'a, A>> {
        let sliced = self.apply(view)?;
        let ndim = sliced.ndim();
        sliced.into_dimensionality::<Ix2>().map_err(|_| {
            ViewError::validation(format!("slice spec yields a {ndim}-D view, expected 2-D"))
        })
    }
}

/// Subsampling strides for the axial, coronal and sagittal dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsampleFactor {
    axial: usize,
    coronal: usize,
    sagittal: usize,
}

impl SubsampleFactor {
    pub fn new(axial: usize, coronal: usize, sagittal: usize) -> Result<Self> {
        if axial == 0 || coronal == 0 || sagittal == 0 {
            return Err(ViewError::InvalidSubsample((axial, coronal, sagittal)));
        }
        Ok(Self {
            axial,
            coronal,
            sagittal,
        })
    }

    pub fn uniform(stride: usize) -> Result<Self> {
        Self::new(stride, stride, stride)
    }

    pub fn axial(&self) -> usize {
        self.axial
    }

    pub fn coronal(&self) -> usize {
        self.coronal
    }

    pub fn sagittal(&self) -> usize {
        self.sagittal
    }
}

impl Default for SubsampleFactor {
    fn default() -> Self {
        Self {
            axial: 1,
            coronal: 1,
            sagittal: 1,
        }
    }
}

impl TryFrom<usize> for SubsampleFactor {
    type Error = ViewError;

    fn try_from(stride: usize) -> Result<Self> {
        Self::uniform(stride)
    }
}

impl TryFrom<(usize, usize, usize)> for SubsampleFactor {
    type Error = ViewError;

    fn try_from((axial, coronal, sagittal): (usize, usize, usize)) -> Result<Self> {
        Self::new(axial, coronal, sagittal)
    }
}

impl TryFrom<[usize; 3]> for SubsampleFactor {
    type Error = ViewError;

    fn try_from([axial, coronal, sagittal]: [usize; 3]) -> Result<Self> {
        Self::new(axial, coronal, sagittal)
    }
}

/// Slice selecting the cross-section at `index` along `axis`.
pub fn axis_slice(axis: Axis, index: usize) -> SliceSpec {
    use Selector::{Full, Index};

    let spec = match axis {
        Axis::X => SliceSpec([Full, Full, Index(index)]),
        Axis::Y => SliceSpec([Full, Index(index), Full]),
        Axis::Z => SliceSpec([Index(index), Full, Full]),
    };
    trace!(%axis, index, ?spec, "axis slice");
    spec
}

/// Slice selecting the vector-field cross-section at `cut` along `axis`,
/// subsampling the two in-plane dimensions.
pub fn vector_field_slice(axis: Axis, cut: usize, subsample: SubsampleFactor) -> SliceSpec {
    use Selector::{Index, Strided};

    let spec = match axis {
        Axis::X => SliceSpec([
            Strided(subsample.axial),
            Strided(subsample.coronal),
            Index(cut),
        ]),
        Axis::Y => SliceSpec([
            Strided(subsample.axial),
            Index(cut),
            Strided(subsample.sagittal),
        ]),
        Axis::Z => SliceSpec([
            Index(cut),
            Strided(subsample.coronal),
            Strided(subsample.sagittal),
        ]),
    };
    trace!(%axis, cut, ?spec, "vector field slice");
    spec
}

/// Positions, in voxel units, at which vector glyphs are drawn.
///
/// Both arrays have shape `(n_horizontal, n_vertical)`, which is the
/// transpose of the slice returned by [`vector_field_slice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorGrid {
    pub horizontal: Array2<usize>,
    pub vertical: Array2<usize>,
}

impl VectorGrid {
    fn mesh(h_len: usize, h_step: usize, v_len: usize, v_step: usize) -> Self {
        let shape = (h_len.div_ceil(h_step), v_len.div_ceil(v_step));
        Self {
            horizontal: Array2::from_shape_fn(shape, |(h, _)| h * h_step),
            vertical: Array2::from_shape_fn(shape, |(_, v)| v * v_step),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.horizontal.dim()
    }
}

/// Regular mesh over the plane orthogonal to `axis` for a vector field of
/// spatial shape `dim` = `(z, y, x)`.
pub fn vector_field_grid(
    axis: Axis,
    dim: (usize, usize, usize),
    subsample: SubsampleFactor,
) -> VectorGrid {
    let (axial_len, coronal_len, sagittal_len) = dim;
    match axis {
        Axis::X => VectorGrid::mesh(coronal_len, subsample.coronal, axial_len, subsample.axial),
        Axis::Y => VectorGrid::mesh(
            sagittal_len,
            subsample.sagittal,
            axial_len,
            subsample.axial,
        ),
        Axis::Z => VectorGrid::mesh(
            sagittal_len,
            subsample.sagittal,
            coronal_len,
            subsample.coronal,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use proptest::prelude::*;

    fn ramp(dim: (usize, usize, usize)) -> Array3<u32> {
        Array3::from_shape_fn(dim, |(z, y, x)| (z * 10_000 + y * 100 + x) as u32)
    }

    #[test]
    fn axis_slice_keeps_the_other_two_dimensions() {
        let data = ramp((4, 5, 6));
        let expected = [(Axis::X, (4, 5)), (Axis::Y, (4, 6)), (Axis::Z, (5, 6))];
        for (axis, shape) in expected {
            let slice = axis_slice(axis, 2).apply_2d(data.view()).unwrap();
            assert_eq!(slice.dim(), shape, "axis {axis}");
        }
    }

    #[test]
    fn axis_slice_selects_the_requested_plane() {
        let data = ramp((4, 5, 6));
        let slice = axis_slice(Axis::Y, 3).apply_2d(data.view()).unwrap();
        assert_eq!(slice[[2, 4]], 20_304);
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let data = ramp((4, 5, 6));
        let err = axis_slice(Axis::Z, 4).apply(data.view()).unwrap_err();
        assert!(matches!(
            err,
            ViewError::IndexOutOfBounds {
                dim: 0,
                index: 4,
                len: 4
            }
        ));
    }

    #[test]
    fn strides_follow_dimension_identity() {
        let factor = SubsampleFactor::new(2, 3, 4).unwrap();
        assert_eq!(
            vector_field_slice(Axis::Y, 1, factor),
            SliceSpec([Selector::Strided(2), Selector::Index(1), Selector::Strided(4)])
        );
        assert_eq!(
            vector_field_slice(Axis::Z, 0, factor),
            SliceSpec([Selector::Index(0), Selector::Strided(3), Selector::Strided(4)])
        );
    }

    #[test]
    fn scalar_subsample_expands_to_all_dimensions() {
        let factor = SubsampleFactor::try_from(3).unwrap();
        assert_eq!(factor, SubsampleFactor::new(3, 3, 3).unwrap());
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(matches!(
            SubsampleFactor::try_from((1, 0, 2)),
            Err(ViewError::InvalidSubsample((1, 0, 2)))
        ));
    }

    #[test]
    fn grid_coordinates_step_by_stride() {
        let factor = SubsampleFactor::new(2, 3, 1).unwrap();
        let grid = vector_field_grid(Axis::X, (5, 7, 4), factor);
        // Coronal positions run horizontally, axial vertically.
        assert_eq!(grid.dim(), (3, 3));
        assert_eq!(grid.horizontal.column(0).to_vec(), vec![0, 3, 6]);
        assert_eq!(grid.vertical.row(0).to_vec(), vec![0, 2, 4]);
    }

    #[test]
    fn output_shape_matches_applied_view() {
        let data = ramp((7, 8, 9));
        let spec = vector_field_slice(Axis::X, 5, SubsampleFactor::new(2, 3, 1).unwrap());
        let view = spec.apply(data.view()).unwrap();
        assert_eq!(view.shape(), spec.output_shape(data.dim()).unwrap().as_slice());
    }

    #[test]
    fn zero_stride_fails_shape_and_apply_alike() {
        let data = ramp((4, 5, 6));
        let spec = SliceSpec([Selector::Index(1), Selector::Strided(0), Selector::Full]);
        assert!(matches!(spec.output_shape(data.dim()), Err(ViewError::Validation(_))));
        assert!(matches!(spec.apply(data.view()), Err(ViewError::Validation(_))));
        assert_eq!(Selector::Strided(3).kept_len(2, 7).unwrap(), Some(3));
        assert!(Selector::Strided(0).kept_len(2, 7).is_err());
    }

    proptest! {
        /// The glyph mesh must line up with the subsampled slice it decorates.
        #[test]
        fn grid_aligns_with_vector_field_slice(
            z in 1..12_usize,
            y in 1..12_usize,
            x in 1..12_usize,
            axial in 1..5_usize,
            coronal in 1..5_usize,
            sagittal in 1..5_usize,
            axis_index in 0..3_usize,
        ) {
            let axis = Axis::ALL[axis_index];
            let dim = (z, y, x);
            let factor = SubsampleFactor::new(axial, coronal, sagittal).unwrap();
            let data = ramp(dim);
            let cut = [z, y, x][axis.array_dim()] - 1;

            let slice = vector_field_slice(axis, cut, factor).apply_2d(data.view()).unwrap();
            let grid = vector_field_grid(axis, dim, factor);

            let (rows, cols) = slice.dim();
            prop_assert_eq!(grid.dim(), (cols, rows));
            prop_assert_eq!(grid.vertical.dim(), (cols, rows));
        }
    }
}
