use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use nalgebra::{Point3, Vector3};
use ndarray::{Array3, Axis as ArrayAxis};
use volume_view::{
    InterpolationMode, NdVolumeOps, ObliquePlaneProjector, ProjectionKind, ViewError, Volume,
    VolumeOps, VolumeProjectionRequest,
};

fn ramp(dim: (usize, usize, usize)) -> Volume {
    Volume::new(Array3::from_shape_fn(dim, |(z, y, x)| {
        (z * 100 + y * 10 + x) as f32
    }))
}

#[test]
fn unrotated_mean_matches_direct_reduction() {
    let volume = ramp((5, 6, 7))
        .with_spacing(Vector3::new(0.9, 1.1, 2.5))
        .with_origin(Point3::new(-30.0, 12.0, 4.0));
    let request = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Mean)
        .with_projection_axis(2)
        .with_rotation([1.0, 0.0, 0.0], 0.0);

    let image = ObliquePlaneProjector::new().project(&volume, &request).unwrap();
    // Image axis 2 is z, the first array dimension.
    let expected = volume.data.mean_axis(ArrayAxis(0)).unwrap();

    assert_eq!(image.dim(), (6, 7));
    for (a, b) in image.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-3, "expected {b}, got {a}");
    }
    // Mean over z of z*100 + y*10 + x is 200 + y*10 + x.
    assert!((image[[5, 6]] - 256.0).abs() < 1e-3);
}

#[test]
fn every_statistic_collapses_to_two_dimensions() {
    let volume = ramp((3, 4, 5));
    let projector = ObliquePlaneProjector::new();
    for kind in ProjectionKind::ALL {
        let request = VolumeProjectionRequest::default()
            .with_kind(kind)
            .with_projection_axis(0);
        let image = projector.project(&volume, &request).unwrap();
        assert_eq!(image.dim(), (3, 4), "kind {kind}");
    }
}

#[test]
fn half_turn_about_z_mirrors_the_axial_sum() {
    let volume = ramp((4, 6, 8));
    let projector = ObliquePlaneProjector::new();
    let base = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Sum)
        .with_projection_axis(2)
        .with_interpolation(InterpolationMode::NearestNeighbor);

    let straight = projector.project(&volume, &base).unwrap();
    let turned = projector
        .project(&volume, &base.with_rotation([0.0, 0.0, 1.0], PI))
        .unwrap();

    let (height, width) = straight.dim();
    for y in 0..height {
        for x in 0..width {
            assert_eq!(turned[[y, x]], straight[[height - 1 - y, width - 1 - x]]);
        }
    }
}

#[test]
fn quarter_turn_about_x_swaps_z_and_y_on_a_cube() {
    let volume = ramp((5, 5, 5));
    let request = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Max)
        .with_projection_axis(0)
        .with_rotation([1.0, 0.0, 0.0], FRAC_PI_2)
        .with_interpolation(InterpolationMode::NearestNeighbor);
    let image = ObliquePlaneProjector::new().project(&volume, &request).unwrap();

    // The output voxel (z, y) samples the input at (y', z') = (2 - (z - 2), y),
    // so the max over x is 100 * y + 10 * (4 - z) + 4.
    for ((z, y), &value) in image.indexed_iter() {
        assert_eq!(value, (100 * y + 10 * (4 - z) + 4) as f32);
    }
}

#[test]
fn rotated_corners_take_the_fill_value() {
    let volume = Volume::new(Array3::from_elem((9, 9, 9), 1.0));
    let request = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Min)
        .with_projection_axis(2)
        .with_rotation([0.0, 0.0, 1.0], FRAC_PI_4)
        .with_fill_value(-5.0);
    let image = ObliquePlaneProjector::new().project(&volume, &request).unwrap();

    assert_eq!(image[[0, 0]], -5.0);
    assert_eq!(image[[8, 8]], -5.0);
    assert!((image[[4, 4]] - 1.0).abs() < 1e-6);
}

#[test]
fn unrotated_bspline_max_keeps_an_isolated_peak() {
    let mut data = Array3::<f32>::zeros((7, 7, 7));
    data[[3, 3, 3]] = 1000.0;
    let request = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Max)
        .with_projection_axis(2)
        .with_interpolation(InterpolationMode::BSpline);
    let image = ObliquePlaneProjector::new()
        .project(&Volume::new(data), &request)
        .unwrap();

    assert!((image[[3, 3]] - 1000.0).abs() < 1e-2, "got {}", image[[3, 3]]);
    assert!(image[[0, 3]].abs() < 1e-2);
}

#[test]
fn bspline_resampling_keeps_a_flat_volume_flat() {
    let volume = Volume::new(Array3::from_elem((6, 6, 6), 3.0));
    let request = VolumeProjectionRequest::default()
        .with_kind(ProjectionKind::Mean)
        .with_projection_axis(1)
        .with_rotation([0.0, 1.0, 0.0], 0.2)
        .with_interpolation(InterpolationMode::BSpline)
        .with_fill_value(3.0);
    let image = ObliquePlaneProjector::new().project(&volume, &request).unwrap();
    for &value in image.iter() {
        assert!((value - 3.0).abs() < 1e-4, "got {value}");
    }
}

#[test]
fn batch_projection_matches_single_requests() {
    let volume = ramp((6, 6, 6));
    let projector = ObliquePlaneProjector::new();
    let requests: Vec<_> = (0..4)
        .map(|step| {
            VolumeProjectionRequest::default()
                .with_kind(ProjectionKind::Max)
                .with_rotation([0.0, 1.0, 1.0], step as f64 * 0.4)
        })
        .collect();

    let batch = projector.project_many(&volume, &requests);
    for (request, image) in requests.iter().zip(batch) {
        assert_eq!(image.unwrap(), projector.project(&volume, request).unwrap());
    }
}

#[test]
fn unknown_statistic_and_axis_are_lookup_errors() {
    assert!(matches!(
        VolumeProjectionRequest::default().with_kind_name("variance"),
        Err(ViewError::Lookup(_))
    ));

    let request = VolumeProjectionRequest::default().with_projection_axis(5);
    let err = ObliquePlaneProjector::new()
        .project(&ramp((2, 2, 2)), &request)
        .unwrap_err();
    assert!(matches!(err, ViewError::Lookup(_)));
}

#[test]
fn projection_keeps_geometry() {
    let volume = ramp((3, 3, 3)).with_spacing(Vector3::new(2.0, 3.0, 4.0));
    let projected = NdVolumeOps
        .project(&volume, ProjectionKind::Median, 1)
        .unwrap();
    assert_eq!(projected.dim(), (3, 1, 3));
    assert_eq!(projected.spacing, volume.spacing);
    assert_eq!(projected.data[[2, 0, 1]], 211.0);
}
