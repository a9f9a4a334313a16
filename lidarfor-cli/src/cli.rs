use clap::{Parser, Subcommand};
use lidarfor_common::clip::ClipGeometry;
use lidarfor_common::cloud::point::Dimension;
use lidarfor_common::raster::ground::GroundFilter;
use lidarfor_common::raster::{Aggregate, Interpolation};
use std::path::PathBuf;

/// Loads, plots, normalizes and clips LiDAR point clouds stored in las/laz files.
#[derive(Debug, Parser)]
pub struct AppOptions {
    /// Verbosity of the command line output.
    #[clap(long, default_value = "info")]
    pub log_level: log::Level,

    /// Settings file (toml). Values missing from the file keep their defaults.
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints a summary of the las header.
    Info(InfoOptions),

    /// Plots the canopy height model (highest point per cell) as an image.
    Plot(PlotOptions),

    /// Renders a 3d scatter plot of the points as an image.
    Plot3d(Plot3dOptions),

    /// Writes an interactive 3d scatter plot as a html page.
    Iplot3d(IPlot3dOptions),

    /// Replaces the z coordinate of each point with its height above the ground.
    Normalize(NormalizeOptions),

    /// Keeps the points inside a bounding box, circle or polygon.
    Clip(ClipOptions),

    /// Keeps the points with min < z < max.
    FilterZ(FilterZOptions),

    /// Keeps the points with min < value < max for any dimension.
    Filter(FilterOptions),

    /// Rasterizes a dimension of the points and writes it as an ESRI ascii grid or an image.
    Raster(RasterOptions),
}

#[derive(Debug, Parser)]
pub struct InfoOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct PlotOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// Image file to write. (png)
    #[clap()]
    pub output_file: PathBuf,

    /// Size of the raster cells. Defaults to the `grid.cell_size` setting.
    #[clap(long)]
    pub cell_size: Option<f64>,

    /// Name of the color map. Defaults to the `plot.cmap` setting.
    #[clap(long)]
    pub cmap: Option<String>,
}

#[derive(Debug, Parser)]
pub struct Plot3dOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// Image file to write. (png)
    #[clap()]
    pub output_file: PathBuf,

    /// Larger clouds are randomly down sampled to this number of points.
    #[clap(long)]
    pub max_points: Option<usize>,

    /// Radius of the points in pixels.
    #[clap(long)]
    pub point_size: Option<u32>,

    /// Name of the color map. Defaults to the `plot.cmap_3d` setting.
    #[clap(long)]
    pub cmap: Option<String>,

    /// Seed for the down sampling.
    #[clap(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct IPlot3dOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// Html file to write.
    #[clap()]
    pub output_file: PathBuf,

    /// Larger clouds are randomly down sampled to this number of points.
    #[clap(long)]
    pub max_points: Option<usize>,

    /// Name of the color map. Defaults to the `plot.cmap_3d` setting.
    #[clap(long)]
    pub cmap: Option<String>,

    /// Seed for the down sampling.
    #[clap(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct NormalizeOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// The las or laz file to write the normalized points to.
    #[clap()]
    pub output_file: PathBuf,

    /// Cell size of the elevation model. Defaults to the `normalize.cell_size` setting.
    #[clap(long)]
    pub cell_size: Option<f64>,

    /// Ground filter: lowest_point, classified or zhang2003.
    /// Defaults to the `normalize.ground_filter` setting.
    #[clap(long)]
    pub ground_filter: Option<GroundFilter>,

    /// How gaps in the elevation model are filled: nearest or idw.
    #[clap(long)]
    pub interpolation: Option<Interpolation>,
}

#[derive(Debug, Parser)]
pub struct ClipOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// The las or laz file to write the clipped points to.
    #[clap()]
    pub output_file: PathBuf,

    /// `bbox:min_x,min_y,max_x,max_y`, `circle:x,y,radius` or a WKT polygon / multipolygon.
    #[clap(required_unless_present = "wkt_file", conflicts_with = "wkt_file")]
    pub geometry: Option<ClipGeometry>,

    /// Reads the clip polygon from a WKT file instead.
    #[clap(long)]
    pub wkt_file: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct FilterZOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// The las or laz file to write the remaining points to.
    #[clap()]
    pub output_file: PathBuf,

    /// Exclusive lower bound.
    #[clap(allow_negative_numbers = true)]
    pub min: f64,

    /// Exclusive upper bound.
    #[clap(allow_negative_numbers = true)]
    pub max: f64,
}

#[derive(Debug, Parser)]
pub struct FilterOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// The las or laz file to write the remaining points to.
    #[clap()]
    pub output_file: PathBuf,

    /// Dimension to filter on, e.g. z, intensity, classification, gps_time.
    #[clap()]
    pub dimension: Dimension,

    /// Exclusive lower bound.
    #[clap(allow_negative_numbers = true)]
    pub min: f64,

    /// Exclusive upper bound.
    #[clap(allow_negative_numbers = true)]
    pub max: f64,
}

#[derive(Debug, Parser)]
pub struct RasterOptions {
    /// The las or laz file.
    #[clap()]
    pub input_file: PathBuf,

    /// Output file. `.png` writes an image, everything else an ESRI ascii grid.
    #[clap()]
    pub output_file: PathBuf,

    /// Size of the raster cells. Defaults to the `grid.cell_size` setting.
    #[clap(long)]
    pub cell_size: Option<f64>,

    /// How the values in a cell are combined: min, max, mean, median, count, sum or std.
    #[clap(long, default_value = "max")]
    pub aggregate: Aggregate,

    /// Dimension to rasterize.
    #[clap(long, default_value = "z")]
    pub dimension: Dimension,

    /// Fills empty cells (nearest or idw). Empty cells are left without data otherwise.
    #[clap(long)]
    pub interpolate: Option<Interpolation>,

    /// Color map for `.png` output. Defaults to the `plot.cmap` setting.
    #[clap(long)]
    pub cmap: Option<String>,
}
