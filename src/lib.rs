//! # volume-view
//!
//! Building blocks for rendering 2-D views of 3-D medical volumes and the
//! vector fields (e.g. deformation fields from image registration) that come
//! with them.

//!
//! Volumes are held as `(z, y, x)` arrays. A view is requested by anatomical
//! axis and index:
//!  - x: sagittal plane, fixes the last array dimension
//!  - y: coronal plane, fixes the middle array dimension
//!  - z: axial plane, fixes the first array dimension
//!
//! On top of the slicing helpers the crate offers two composite views:
//!  - a colour-difference blend of two co-registered images, where hue tells
//!    which image is brighter and saturation by how much
//!  - oblique projections, rotating a volume about its centre and collapsing
//!    one axis with a statistic (sum, mean, median, std, min, max)
//!
//! Resampling, projection and HSV conversion go through the [`VolumeOps`]
//! trait. [`NdVolumeOps`] implements it with ndarray and rayon.
//!
//! # Examples
//!
//! ## Quiver data for a deformation field
//!
//! ```
//! # use volume_view::{Axis, SubsampleFactor, VectorField};
//! # use ndarray::Array4;
//! let field = VectorField::new(Array4::zeros((16, 32, 32, 3)))
//!     .expect("field should have three components");
//! let subsample = SubsampleFactor::uniform(4).expect("stride should be positive");
//! let slice = field
//!     .slice(Axis::Z, 8, subsample)
//!     .expect("cut should be inside the field");
//! let arrows = slice.reorient(Axis::Z, true);
//! let grid = field.grid(Axis::Z, subsample);
//! assert_eq!(grid.dim(), (arrows.horizontal.ncols(), arrows.horizontal.nrows()));
//! ```
//!
//! ## Maximum intensity projection at an oblique angle
//!
//! ```
//! # use volume_view::{ObliquePlaneProjector, ProjectionKind, Volume, VolumeProjectionRequest};
//! # use ndarray::Array3;
//! let volume = Volume::new(Array3::zeros((8, 8, 8)));
//! let request = VolumeProjectionRequest::default()
//!     .with_kind(ProjectionKind::Max)
//!     .with_projection_axis(1)
//!     .with_rotation([0.0, 0.0, 1.0], 0.3);
//! let image = ObliquePlaneProjector::new()
//!     .project(&volume, &request)
//!     .expect("projection should succeed");
//! assert_eq!(image.dim(), (8, 8));
//! ```

pub mod colormix;
pub mod enums;
pub mod error;
mod interpolator;
pub mod ops;
pub mod projection;
pub mod render;
pub mod slicing;
pub mod vector_field;
pub mod volume;

pub use colormix::{ColorMixBlender, ColorMixImage, ColorMixOptions, Window};
pub use enums::{Axis, InterpolationMode, Orientation, ProjectionKind};
pub use error::{Result, ViewError};
pub use ops::{NdVolumeOps, RigidTransform, VolumeOps};
pub use projection::{ObliquePlaneProjector, VolumeProjectionRequest};
pub use slicing::{
    Selector, SliceSpec, SubsampleFactor, VectorGrid, axis_slice, vector_field_grid,
    vector_field_slice,
};
pub use vector_field::{ReorientedField, VectorField, VectorFieldSlice, reorient_vector_field};
pub use volume::Volume;
