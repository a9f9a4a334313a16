//! Rendering of rasters and point clouds into image files and interactive html pages.

pub mod colormap;

use crate::raster::Raster;
use colormap::ColorMap;
use log::info;
use nalgebra::Point3;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde_json::json;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Script included by the html pages of [write_iplot3d].
pub const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

#[derive(Error, Debug)]
pub enum PlotError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    Backend(String),

    #[error("Nothing to plot: {0}")]
    Empty(&'static str),

    #[error("Unknown color map '{name}'. Valid color maps are: {valid}")]
    UnknownColorMap { name: String, valid: String },
}

fn backend_error<E: Display>(e: E) -> PlotError {
    PlotError::Backend(e.to_string())
}

/// Image size for raster plots.
/// The raster is scaled to fit, keeping square cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterPlotOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for RasterPlotOptions {
    fn default() -> Self {
        RasterPlotOptions {
            width: 800,
            height: 800,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Plot3dOptions {
    pub width: u32,
    pub height: u32,

    /// Radius of the points in pixels.
    pub point_size: u32,

    /// Colors the points by their height.
    pub cmap: ColorMap,

    /// Larger clouds are down sampled to this number of points.
    pub max_points: usize,

    /// Seed for the down sampling. Random if not set.
    pub seed: Option<u64>,

    /// Rotation of the view around the vertical axis, in radians.
    pub yaw: f64,

    /// Tilt of the view, in radians.
    pub pitch: f64,
}

impl Default for Plot3dOptions {
    fn default() -> Self {
        Plot3dOptions {
            width: 1024,
            height: 768,
            point_size: 1,
            cmap: ColorMap::spectral().reversed(),
            max_points: 500_000,
            seed: None,
            yaw: 0.7,
            pitch: 0.3,
        }
    }
}

/// Picks at most `max_points` distinct indices in `0..len`, in ascending order.
pub fn sample_indices(len: usize, max_points: usize, seed: Option<u64>) -> Vec<usize> {
    if len <= max_points {
        return (0..len).collect();
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices = sample(&mut rng, len, max_points).into_vec();
    indices.sort_unstable();
    indices
}

fn to_rgb(color: colormap::Color) -> RGBColor {
    let (r, g, b) = color.to_rgb8();
    RGBColor(r, g, b)
}

/// Maps values linearly onto [0, 1]. A constant range maps everything to 0.5.
fn normalizer(min: f64, max: f64) -> impl Fn(f64) -> f32 {
    let range = max - min;
    move |value| {
        if range > 0.0 {
            ((value - min) / range) as f32
        } else {
            0.5
        }
    }
}

/// Renders the raster as a heat map. Cells without data are white.
pub fn plot_raster(
    raster: &Raster,
    cmap: &ColorMap,
    options: &RasterPlotOptions,
    path: &Path,
) -> Result<(), PlotError> {
    let (min, max) = match (raster.min(), raster.max()) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err(PlotError::Empty("the raster has no data")),
    };
    let normalize = normalizer(min, max);
    let rows = raster.rows() as f64;
    let cols = raster.cols() as f64;

    let scale = (options.width as f64 / cols).min(options.height as f64 / rows);
    let width = ((cols * scale).round() as u32).max(1);
    let height = ((rows * scale).round() as u32).max(1);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(backend_error)?;
    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(0.0..cols, 0.0..rows)
        .map_err(backend_error)?;

    let cells = (0..raster.rows())
        .flat_map(|row| (0..raster.cols()).map(move |col| (row, col)))
        .filter(|&(row, col)| raster.has_data(row, col));
    chart
        .draw_series(cells.map(|(row, col)| {
            let color = to_rgb(cmap.color_at(normalize(raster.get(row, col))));
            // row 0 is the top of the image
            let top = rows - row as f64;
            Rectangle::new(
                [(col as f64, top - 1.0), (col as f64 + 1.0, top)],
                color.filled(),
            )
        }))
        .map_err(backend_error)?;

    root.present().map_err(backend_error)?;
    info!("Wrote {}x{} raster plot to {}", width, height, path.display());
    Ok(())
}

/// Renders the points as a 3d scatter plot, colored by height.
///
/// The view is centered on the mean of the points and all axes share the same scale.
pub fn plot_points_3d(
    points: &[Point3<f64>],
    options: &Plot3dOptions,
    path: &Path,
) -> Result<(), PlotError> {
    if points.is_empty() {
        return Err(PlotError::Empty("the point cloud is empty"));
    }
    let n = points.len() as f64;
    let mean = points
        .iter()
        .fold(Point3::origin(), |acc, p| acc + p.coords / n);
    let half_extent = points
        .iter()
        .map(|p| (p - mean).amax())
        .fold(0.0, f64::max);
    let half_extent = if half_extent > 0.0 { half_extent } else { 1.0 };
    let (min_z, max_z) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.z), hi.max(p.z))
    });
    let normalize = normalizer(min_z, max_z);

    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(backend_error)?;
    let range = |center: f64| (center - half_extent)..(center + half_extent);

    // plotters has the y axis pointing up, so the point cloud z becomes the chart y.
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_3d(range(mean.x), range(mean.z), range(mean.y))
        .map_err(backend_error)?;
    chart.with_projection(|mut pb| {
        pb.yaw = options.yaw;
        pb.pitch = options.pitch;
        pb.scale = 0.9;
        pb.into_matrix()
    });

    chart
        .draw_series(points.iter().map(|p| {
            let color = to_rgb(options.cmap.color_at(normalize(p.z)));
            Circle::new((p.x, p.z, p.y), options.point_size, color.filled())
        }))
        .map_err(backend_error)?;

    root.present().map_err(backend_error)?;
    info!("Wrote 3d plot of {} points to {}", points.len(), path.display());
    Ok(())
}

/// Number of color stops of the plotly colorscale built from a [ColorMap].
const COLORSCALE_STOPS: usize = 16;

/// The color map as a plotly colorscale: `[[position, "#rrggbb"], ...]`.
fn plotly_colorscale(cmap: &ColorMap) -> serde_json::Value {
    let last = (COLORSCALE_STOPS - 1) as f32;
    let stops: Vec<_> = (0..COLORSCALE_STOPS)
        .map(|i| {
            let position = i as f32 / last;
            json!([position, cmap.color_at(position).to_hex()])
        })
        .collect();
    json!(stops)
}

/// Writes a html page with an interactive 3d scatter plot (plotly.js), colored by height.
pub fn write_iplot3d(
    points: &[Point3<f64>],
    cmap: &ColorMap,
    path: &Path,
) -> Result<(), PlotError> {
    if points.is_empty() {
        return Err(PlotError::Empty("the point cloud is empty"));
    }
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let zs: Vec<f64> = points.iter().map(|p| p.z).collect();
    let data = json!([{
        "type": "scatter3d",
        "mode": "markers",
        "x": xs,
        "y": ys,
        "z": zs,
        "marker": {
            "size": 2,
            "color": zs,
            "colorscale": plotly_colorscale(cmap),
            "opacity": 0.8,
        },
    }]);
    let layout = json!({
        "margin": { "l": 0, "r": 0, "b": 0, "t": 0 },
        "scene": { "aspectmode": "data" },
    });

    let mut wr = BufWriter::new(File::create(path)?);
    writeln!(wr, "<!DOCTYPE html>")?;
    writeln!(wr, "<html>")?;
    writeln!(wr, "<head>")?;
    writeln!(wr, "<meta charset=\"utf-8\">")?;
    writeln!(wr, "<script src=\"{}\"></script>", PLOTLY_JS_URL)?;
    writeln!(wr, "</head>")?;
    writeln!(wr, "<body>")?;
    writeln!(
        wr,
        "<div id=\"plot\" style=\"width:100%;height:100vh;\"></div>"
    )?;
    writeln!(wr, "<script>")?;
    writeln!(wr, "Plotly.newPlot(\"plot\", {}, {});", data, layout)?;
    writeln!(wr, "</script>")?;
    writeln!(wr, "</body>")?;
    writeln!(wr, "</html>")?;
    wr.flush()?;
    info!(
        "Wrote interactive plot of {} points to {}",
        points.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::colormap::ColorMap;
    use super::{
        plot_points_3d, plot_raster, sample_indices, write_iplot3d, Plot3dOptions, PlotError,
        RasterPlotOptions,
    };
    use crate::raster::Raster;
    use nalgebra::point;

    #[test]
    fn sample_small_clouds_completely() {
        assert_eq!(sample_indices(5, 10, None), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample_indices(5, 5, None), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn sample_without_replacement() {
        let indices = sample_indices(1000, 100, Some(42));
        assert_eq!(indices.len(), 100);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i < 1000));
        assert_eq!(indices, sample_indices(1000, 100, Some(42)));
    }

    #[test]
    fn raster_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chm.png");
        let mut raster = Raster::new(3, 4, 1.0, point![0.0, 3.0]);
        raster.set(0, 0, 1.0);
        raster.set(2, 3, 5.0);
        plot_raster(
            &raster,
            &ColorMap::viridis(),
            &RasterPlotOptions {
                width: 40,
                height: 40,
            },
            &path,
        )
        .unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let empty = Raster::new(2, 2, 1.0, point![0.0, 2.0]);
        assert!(matches!(
            plot_raster(
                &empty,
                &ColorMap::viridis(),
                &RasterPlotOptions::default(),
                &path
            ),
            Err(PlotError::Empty(_))
        ));
    }

    #[test]
    fn points_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.png");
        let points: Vec<_> = (0..50)
            .map(|i| point![i as f64, (i % 7) as f64, (i % 5) as f64])
            .collect();
        let options = Plot3dOptions {
            width: 64,
            height: 48,
            ..Default::default()
        };
        plot_points_3d(&points, &options, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        assert!(matches!(
            plot_points_3d(&[], &options, &path),
            Err(PlotError::Empty(_))
        ));
    }

    #[test]
    fn iplot_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.html");
        let cmap = ColorMap::greys();
        let points = [point![1.0, 2.0, 3.0], point![4.0, 5.0, 6.5]];
        write_iplot3d(&points, &cmap, &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Plotly.newPlot"));
        // the colorscale runs from white to black
        assert!(html.contains("[0.0,\"#ffffff\"]"));
        assert!(html.contains("[1.0,\"#000000\"]"));
        assert!(html.contains("\"scatter3d\""));
        assert!(html.contains("[1.0,4.0]"));
        assert!(html.contains("[3.0,6.5]"));
    }
}
