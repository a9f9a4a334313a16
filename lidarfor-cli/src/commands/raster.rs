use crate::cli::RasterOptions;
use anyhow::Result;
use lidarfor_common::cloud::Cloud;
use lidarfor_common::plot::colormap::ColorMap;
use lidarfor_common::settings::Settings;
use log::info;

pub fn raster(options: RasterOptions, settings: &Settings) -> Result<()> {
    let cloud = Cloud::from_path(&options.input_file)?;
    let cell_size = options.cell_size.unwrap_or(settings.grid.cell_size);
    let grid = cloud.grid(cell_size)?;
    let raster = match options.interpolate {
        Some(method) => grid.interpolate(options.aggregate, options.dimension, method)?,
        None => grid.raster(options.aggregate, options.dimension),
    };
    info!(
        "Rasterized {} ({:?}) into {}x{} cells, {} without data",
        options.dimension,
        options.aggregate,
        raster.rows(),
        raster.cols(),
        raster.nodata_cells().len()
    );

    let is_png = options
        .output_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png {
        let cmap = ColorMap::by_name(options.cmap.as_deref().unwrap_or(&settings.plot.cmap))?;
        raster.plot(&cmap, &settings.plot.raster_options(), &options.output_file)?;
    } else {
        raster.write_ascii(&options.output_file)?;
        info!("Wrote {}", options.output_file.display());
    }
    Ok(())
}
