//! Colour-difference blending of two co-registered images.
//!
//! Both images are windowed to `[0, 1]`. The blend encodes which image is
//! brighter as one of two opposite hues, the size of the difference as
//! saturation and the mean intensity as value.

use ndarray::{Array2, Array3, ArrayView2, ArrayViewD, Axis as ArrayAxis, Ix2, Ix3, Zip};
use tracing::{debug, warn};

use crate::error::{Result, ViewError};
use crate::ops::{NdVolumeOps, VolumeOps};
use crate::slicing::SliceSpec;
use crate::volume::Volume;

/// Intensity window given by its lower bound and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub lower: f32,
    pub width: f32,
}

impl Window {
    pub fn new(lower: f32, width: f32) -> Self {
        Self { lower, width }
    }

    pub fn upper(&self) -> f32 {
        self.lower + self.width
    }

    /// Clip to the window and rescale to `[0, 1]`. Meaningful only for a
    /// window that passes [`Window::validate`]; never panics.
    #[inline]
    pub fn normalise(&self, value: f32) -> f32 {
        (value.max(self.lower).min(self.upper()) - self.lower) / self.width
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.width.is_finite() && self.lower.is_finite()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ViewError::validation(format!(
                "window width must be positive and finite, got lower {} width {}",
                self.lower, self.width
            )))
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            lower: -250.0,
            width: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMixOptions {
    pub window: Window,
    /// Hue marking pixels where the first image is brighter. The second image
    /// is marked with the opposite hue, `color_rotation + 0.5`.
    pub color_rotation: f32,
}

impl Default for ColorMixOptions {
    fn default() -> Self {
        Self {
            window: Window::default(),
            color_rotation: 0.35,
        }
    }
}

/// One input of a colour blend. Both inputs of a blend must be of the same
/// kind.
#[derive(Debug, Clone)]
pub enum ColorMixImage<'a> {
    Volume(&'a Volume),
    Array(ArrayViewD<'a, f32>),
}

impl<'a> ColorMixImage<'a> {
    fn kind(&self) -> &'static str {
        match self {
            ColorMixImage::Volume(_) => "volume",
            ColorMixImage::Array(_) => "array",
        }
    }

    fn ndim(&self) -> usize {
        match self {
            ColorMixImage::Volume(volume) => volume.data.ndim(),
            ColorMixImage::Array(array) => array.ndim(),
        }
    }

    fn to_slice(&self, arr_slice: Option<&SliceSpec>) -> Result<ArrayView2<'a, f32>> {
        let view: ArrayViewD<'a, f32> = match (self, arr_slice) {
            (ColorMixImage::Volume(volume), Some(spec)) => spec.apply(volume.data.view())?,
            (ColorMixImage::Volume(volume), None) => volume.data.view().into_dyn(),
            (ColorMixImage::Array(array), Some(spec)) => {
                let ndim = array.ndim();
                let array = array.clone().into_dimensionality::<Ix3>().map_err(|_| {
                    ViewError::validation(format!(
                        "a slice spec needs a 3-D array, got a {ndim}-D array"
                    ))
                })?;
                spec.apply(array)?
            }
            (ColorMixImage::Array(array), None) => array.clone(),
        };

        let ndim = view.ndim();
        view.into_dimensionality::<Ix2>().map_err(|_| {
            ViewError::validation(format!("colour blending needs 2-D slices, got {ndim}-D data"))
        })
    }
}

impl<'a> From<&'a Volume> for ColorMixImage<'a> {
    fn from(volume: &'a Volume) -> Self {
        ColorMixImage::Volume(volume)
    }
}

impl<'a> From<ArrayViewD<'a, f32>> for ColorMixImage<'a> {
    fn from(array: ArrayViewD<'a, f32>) -> Self {
        ColorMixImage::Array(array)
    }
}

pub struct ColorMixBlender<O = NdVolumeOps> {
    ops: O,
    options: ColorMixOptions,
}

impl ColorMixBlender<NdVolumeOps> {
    pub fn new(options: ColorMixOptions) -> Self {
        Self::with_ops(NdVolumeOps, options)
    }
}

impl Default for ColorMixBlender<NdVolumeOps> {
    fn default() -> Self {
        Self::new(ColorMixOptions::default())
    }
}

impl<O: VolumeOps> ColorMixBlender<O> {
    pub fn with_ops(ops: O, options: ColorMixOptions) -> Self {
        Self { ops, options }
    }

    pub fn options(&self) -> &ColorMixOptions {
        &self.options
    }

    /// Blend exactly two images into an `(height, width, 3)` RGB array.
    ///
    /// Images with three or more dimensions must be reduced to 2-D by
    /// `arr_slice`. Where both normalised values are equal the pixel takes the
    /// hue of the second image.
    pub fn blend(
        &self,
        images: &[ColorMixImage<'_>],
        arr_slice: Option<&SliceSpec>,
    ) -> Result<Array3<f32>> {
        let [first, second] = images else {
            return Err(ViewError::validation(format!(
                "colour blending needs exactly two images, got {}",
                images.len()
            )));
        };
        if first.kind() != second.kind() {
            return Err(ViewError::validation(format!(
                "images must be all volumes or all arrays, got {} and {}",
                first.kind(),
                second.kind()
            )));
        }
        if arr_slice.is_none() && (first.ndim() >= 3 || second.ndim() >= 3) {
            return Err(ViewError::validation(
                "images cannot be 3-D unless a slice spec is given",
            ));
        }
        self.options.window.validate()?;

        let a = first.to_slice(arr_slice)?;
        let b = second.to_slice(arr_slice)?;
        if a.dim() != b.dim() {
            return Err(ViewError::ShapeMismatch {
                first: a.shape().to_vec(),
                second: b.shape().to_vec(),
            });
        }
        debug!(dim = ?a.dim(), "blending image pair");

        let hsv = self.hsv(a, b);
        self.ops.hsv_to_rgb(hsv.view())
    }

    fn hsv(&self, a: ArrayView2<'_, f32>, b: ArrayView2<'_, f32>) -> Array3<f32> {
        let window = self.options.window;
        let rotation = self.options.color_rotation;
        let a_norm = a.mapv(|v| window.normalise(v));
        let b_norm = b.mapv(|v| window.normalise(v));
        Self::warn_if_flat("first", &a_norm);
        Self::warn_if_flat("second", &b_norm);

        let mut hsv = Array3::<f32>::zeros((a.nrows(), a.ncols(), 3));
        Zip::from(hsv.lanes_mut(ArrayAxis(2)))
            .and(&a_norm)
            .and(&b_norm)
            .for_each(|mut pixel, &a, &b| {
                pixel[0] = if a > b { rotation } else { 0.5 + rotation };
                pixel[1] = (a - b).abs();
                pixel[2] = (a + b) / 2.0;
            });
        hsv
    }

    fn warn_if_flat(label: &str, normalised: &Array2<f32>) {
        let saturated_low = normalised.iter().all(|&v| v <= 0.0);
        let saturated_high = normalised.iter().all(|&v| v >= 1.0);
        if !normalised.is_empty() && (saturated_low || saturated_high) {
            warn!(image = label, "image lies entirely outside the intensity window");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Axis;
    use crate::slicing::axis_slice;

    #[test]
    fn window_normalises_and_clips() {
        let window = Window::new(-250.0, 500.0);
        assert_eq!(window.normalise(-1000.0), 0.0);
        assert_eq!(window.normalise(0.0), 0.5);
        assert_eq!(window.normalise(2000.0), 1.0);
    }

    #[test]
    fn inverted_or_nan_windows_do_not_panic() {
        for window in [Window::new(0.0, -10.0), Window::new(f32::NAN, 10.0)] {
            let _ = window.normalise(3.0);
            assert!(!window.is_valid());
            assert!(matches!(window.validate(), Err(ViewError::Validation(_))));
        }
        assert!(Window::default().is_valid());
    }

    #[test]
    fn hue_marks_the_brighter_image() {
        let blender = ColorMixBlender::default();
        let a = Array2::from_shape_vec((1, 3), vec![250.0_f32, -250.0, 0.0]).unwrap();
        let b = Array2::from_shape_vec((1, 3), vec![-250.0_f32, 250.0, 0.0]).unwrap();
        let hsv = blender.hsv(a.view(), b.view());

        assert!((hsv[[0, 0, 0]] - 0.35).abs() < 1e-6);
        assert!((hsv[[0, 1, 0]] - 0.85).abs() < 1e-6);
        // Ties go to the second image.
        assert!((hsv[[0, 2, 0]] - 0.85).abs() < 1e-6);
        assert_eq!(hsv[[0, 0, 1]], 1.0);
        assert_eq!(hsv[[0, 2, 1]], 0.0);
        assert_eq!(hsv[[0, 0, 2]], 0.5);
    }

    #[test]
    fn non_positive_window_width_is_rejected() {
        let options = ColorMixOptions {
            window: Window::new(0.0, 0.0),
            ..ColorMixOptions::default()
        };
        let blender = ColorMixBlender::new(options);
        let a = Array2::<f32>::zeros((2, 2)).into_dyn();
        let err = blender
            .blend(
                &[ColorMixImage::Array(a.view()), ColorMixImage::Array(a.view())],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ViewError::Validation(_)));
    }

    #[test]
    fn spec_on_two_dimensional_array_is_rejected() {
        let a = Array2::<f32>::zeros((2, 2)).into_dyn();
        let spec = axis_slice(Axis::Z, 0);
        let err = ColorMixBlender::default()
            .blend(
                &[ColorMixImage::Array(a.view()), ColorMixImage::Array(a.view())],
                Some(&spec),
            )
            .unwrap_err();
        assert!(matches!(err, ViewError::Validation(_)));
    }

    #[test]
    fn volume_pairs_are_sliced() {
        let first = Volume::new(Array3::from_elem((3, 4, 5), 250.0));
        let second = Volume::new(Array3::from_elem((3, 4, 5), -250.0));
        let spec = axis_slice(Axis::X, 1);
        let rgb = ColorMixBlender::default()
            .blend(
                &[ColorMixImage::Volume(&first), ColorMixImage::Volume(&second)],
                Some(&spec),
            )
            .unwrap();
        assert_eq!(rgb.dim(), (3, 4, 3));
    }
}
