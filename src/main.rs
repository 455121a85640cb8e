use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use ndarray::Array3;
use tracing::info;
use volume_view::{
    Axis, ColorMixBlender, ColorMixImage, ColorMixOptions, InterpolationMode,
    ObliquePlaneProjector, ProjectionKind, Volume, VolumeProjectionRequest, Window, axis_slice,
    render,
};

#[derive(Parser)]
#[command(name = "volume-view")]
#[command(about = "Render views of a synthetic CT phantom")]
struct Cli {
    /// Edge length of the phantom in voxels
    #[arg(long, default_value_t = 64)]
    size: usize,

    /// Lower bound of the intensity window
    #[arg(long, default_value_t = -250.0, allow_negative_numbers = true)]
    window_lower: f32,

    /// Width of the intensity window
    #[arg(long, default_value_t = 500.0)]
    window_width: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blend the phantom with a shifted copy of itself
    Colormix {
        /// Viewing axis (x, y or z)
        #[arg(long, default_value = "z")]
        axis: Axis,

        /// Slice index, defaults to the centre of the volume
        #[arg(long)]
        index: Option<usize>,

        /// Shift of the second image along x, in voxels
        #[arg(long, default_value_t = 3)]
        shift: usize,

        /// Hue marking voxels where the first image is brighter
        #[arg(long, default_value_t = 0.35)]
        color_rotation: f32,

        #[arg(short, long, default_value = "colormix.png")]
        output: PathBuf,
    },

    /// Project the phantom after rotating it about its centre
    Project {
        /// Statistic: sum, mean, median, std, min or max
        #[arg(long, default_value = "mean")]
        kind: ProjectionKind,

        /// Image axis to collapse: 0 = x, 1 = y, 2 = z
        #[arg(long, default_value_t = 0)]
        projection_axis: usize,

        /// Rotation axis as "x,y,z"
        #[arg(long, value_parser = parse_vector, default_value = "1,0,0", allow_hyphen_values = true)]
        rotation_axis: [f64; 3],

        /// Rotation angle in radians
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        angle: f64,

        /// Value for samples rotated in from outside the volume
        #[arg(long, default_value_t = -1000.0, allow_negative_numbers = true)]
        fill: f32,

        /// Interpolation: nearest, linear or bspline
        #[arg(long, default_value = "linear")]
        interpolation: InterpolationMode,

        #[arg(short, long, default_value = "projection.png")]
        output: PathBuf,
    },

    /// Write projections at evenly spaced angles about one axis
    Sweep {
        #[arg(long, default_value = "max")]
        kind: ProjectionKind,

        /// Image axis to collapse: 0 = x, 1 = y, 2 = z
        #[arg(long, default_value_t = 1)]
        projection_axis: usize,

        #[arg(long, value_parser = parse_vector, default_value = "0,0,1", allow_hyphen_values = true)]
        rotation_axis: [f64; 3],

        /// Number of angles over a full turn
        #[arg(long, default_value_t = 12)]
        steps: usize,

        #[arg(short, long, default_value = "sweep")]
        output_dir: PathBuf,
    },
}

fn parse_vector(s: &str) -> std::result::Result<[f64; 3], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|e| e.to_string()))
        .collect::<std::result::Result<_, _>>()?;
    values
        .try_into()
        .map_err(|values: Vec<f64>| format!("expected 3 components, got {}", values.len()))
}

/// Ellipsoidal body with a dense core, CT-like intensities, on anisotropic
/// voxels.
fn phantom(size: usize, shift_x: usize) -> Volume {
    let depth = (size / 2).max(1);
    let centre = Vector3::new(
        (size as f64 - 1.0) / 2.0 + shift_x as f64,
        (size as f64 - 1.0) / 2.0,
        (depth as f64 - 1.0) / 2.0,
    );
    let radii = Vector3::new(size as f64 * 0.4, size as f64 * 0.3, depth as f64 * 0.45);

    let data = Array3::from_shape_fn((depth, size, size), |(z, y, x)| {
        let offset = Vector3::new(x as f64, y as f64, z as f64) - centre;
        let r = offset.component_div(&radii).norm();
        if r < 0.35 {
            700.0
        } else if r < 1.0 {
            40.0
        } else {
            -1000.0
        }
    });
    Volume::new(data).with_spacing(Vector3::new(1.0, 1.0, 2.0))
}

fn save(image: Option<image::DynamicImage>, path: &Path) -> Result<()> {
    let image = image.context("output does not fit an image buffer")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote image");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let window = Window::new(cli.window_lower, cli.window_width);
    window.validate()?;
    if cli.size == 0 {
        bail!("phantom size must be positive");
    }

    match cli.command {
        Commands::Colormix {
            axis,
            index,
            shift,
            color_rotation,
            output,
        } => {
            let first = phantom(cli.size, 0);
            let second = phantom(cli.size, shift);
            let (depth, height, width) = first.dim();
            let index = index.unwrap_or([depth, height, width][axis.array_dim()] / 2);

            let blender = ColorMixBlender::new(ColorMixOptions {
                window,
                color_rotation,
            });
            let spec = axis_slice(axis, index);
            let rgb = blender.blend(
                &[ColorMixImage::Volume(&first), ColorMixImage::Volume(&second)],
                Some(&spec),
            )?;
            save(render::rgb_to_image(&rgb.view()).map(Into::into), &output)?;
        }
        Commands::Project {
            kind,
            projection_axis,
            rotation_axis,
            angle,
            fill,
            interpolation,
            output,
        } => {
            let volume = phantom(cli.size, 0);
            let request = VolumeProjectionRequest::default()
                .with_kind(kind)
                .with_projection_axis(projection_axis)
                .with_rotation(rotation_axis, angle)
                .with_fill_value(fill)
                .with_interpolation(interpolation);
            let image = ObliquePlaneProjector::new().project(&volume, &request)?;
            save(render::slice_to_image(&image.view(), window).map(Into::into), &output)?;
        }
        Commands::Sweep {
            kind,
            projection_axis,
            rotation_axis,
            steps,
            output_dir,
        } => {
            if steps == 0 {
                bail!("sweep needs at least one step");
            }
            std::fs::create_dir_all(&output_dir)
                .with_context(|| format!("failed to create {}", output_dir.display()))?;

            let volume = phantom(cli.size, 0);
            let requests: Vec<_> = (0..steps)
                .map(|step| {
                    VolumeProjectionRequest::default()
                        .with_kind(kind)
                        .with_projection_axis(projection_axis)
                        .with_rotation(rotation_axis, TAU * step as f64 / steps as f64)
                })
                .collect();
            let images = ObliquePlaneProjector::new().project_many(&volume, &requests);

            for (step, image) in images.into_iter().enumerate() {
                let image = image?;
                let path = output_dir.join(format!("{kind}_{step:03}.png"));
                save(render::slice_to_image(&image.view(), window).map(Into::into), &path)?;
            }
        }
    }

    Ok(())
}
