use std::fmt;
use std::str::FromStr;

use crate::error::ViewError;

/// Anatomical viewing axis, named after the array dimension that is held
/// fixed.
///
/// Volumes are stored as `(z, y, x)` arrays, so `X` fixes the last array
/// dimension (sagittal plane), `Y` the middle one (coronal plane) and `Z` the
/// first one (axial plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the fixed dimension in a `(z, y, x)` array.
    pub fn array_dim(self) -> usize {
        match self {
            Axis::X => 2,
            Axis::Y => 1,
            Axis::Z => 0,
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            Axis::X => Orientation::Sagittal,
            Axis::Y => Orientation::Coronal,
            Axis::Z => Orientation::Axial,
        }
    }
}

impl From<Orientation> for Axis {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Axial => Axis::Z,
            Orientation::Coronal => Axis::Y,
            Orientation::Sagittal => Axis::X,
        }
    }
}

impl FromStr for Axis {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(ViewError::InvalidAxis(other.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

/// Statistic used to collapse one axis of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionKind {
    Sum,
    #[default]
    Mean,
    Median,
    Std,
    Min,
    Max,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 6] = [
        ProjectionKind::Sum,
        ProjectionKind::Mean,
        ProjectionKind::Median,
        ProjectionKind::Std,
        ProjectionKind::Min,
        ProjectionKind::Max,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProjectionKind::Sum => "sum",
            ProjectionKind::Mean => "mean",
            ProjectionKind::Median => "median",
            ProjectionKind::Std => "std",
            ProjectionKind::Min => "min",
            ProjectionKind::Max => "max",
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectionKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ViewError::lookup(format!("unknown projection kind '{s}'")))
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interpolation used when resampling a volume at non-grid positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    NearestNeighbor,
    #[default]
    Linear,
    // Cubic B-spline kernel, 4x4x4 support.
    BSpline,
}

impl FromStr for InterpolationMode {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(InterpolationMode::NearestNeighbor),
            "linear" => Ok(InterpolationMode::Linear),
            "bspline" => Ok(InterpolationMode::BSpline),
            other => Err(ViewError::lookup(format!(
                "unknown interpolation mode '{other}'"
            ))),
        }
    }
}
