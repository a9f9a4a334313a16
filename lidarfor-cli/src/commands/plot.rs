use crate::cli::{IPlot3dOptions, Plot3dOptions, PlotOptions};
use anyhow::Result;
use lidarfor_common::cloud::Cloud;
use lidarfor_common::plot::colormap::ColorMap;
use lidarfor_common::settings::Settings;

pub fn plot(options: PlotOptions, settings: &Settings) -> Result<()> {
    let cloud = Cloud::from_path(&options.input_file)?;
    let cell_size = options.cell_size.unwrap_or(settings.grid.cell_size);
    let cmap = ColorMap::by_name(options.cmap.as_deref().unwrap_or(&settings.plot.cmap))?;
    cloud.plot(
        cell_size,
        &cmap,
        &settings.plot.raster_options(),
        &options.output_file,
    )?;
    Ok(())
}

pub fn plot3d(options: Plot3dOptions, settings: &Settings) -> Result<()> {
    let cloud = Cloud::from_path(&options.input_file)?;
    let mut plot_options = settings.plot.plot3d_options()?;
    if let Some(max_points) = options.max_points {
        plot_options.max_points = max_points;
    }
    if let Some(point_size) = options.point_size {
        plot_options.point_size = point_size;
    }
    if let Some(cmap) = &options.cmap {
        plot_options.cmap = ColorMap::by_name(cmap)?;
    }
    if options.seed.is_some() {
        plot_options.seed = options.seed;
    }
    cloud.plot3d(&plot_options, &options.output_file)?;
    Ok(())
}

pub fn iplot3d(options: IPlot3dOptions, settings: &Settings) -> Result<()> {
    let cloud = Cloud::from_path(&options.input_file)?;
    let max_points = options.max_points.unwrap_or(settings.plot.max_points_iplot);
    let seed = options.seed.or(settings.plot.seed);
    let cmap = ColorMap::by_name(options.cmap.as_deref().unwrap_or(&settings.plot.cmap_3d))?;
    cloud.iplot3d(max_points, seed, &cmap, &options.output_file)?;
    Ok(())
}
