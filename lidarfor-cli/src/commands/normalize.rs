use crate::cli::NormalizeOptions;
use anyhow::Result;
use lidarfor_common::cloud::Cloud;
use lidarfor_common::settings::Settings;
use log::info;

pub fn normalize(options: NormalizeOptions, settings: &Settings) -> Result<()> {
    let mut cloud = Cloud::from_path(&options.input_file)?;
    let cell_size = options.cell_size.unwrap_or(settings.normalize.cell_size);
    let ground_filter = options
        .ground_filter
        .unwrap_or_else(|| settings.normalize.ground_filter.clone());
    let interpolation = options
        .interpolation
        .unwrap_or(settings.normalize.interpolation);

    info!("Normalizing with {:?} on {} m cells", ground_filter, cell_size);
    cloud.normalize(cell_size, &ground_filter, interpolation)?;
    cloud.write(&options.output_file)?;
    Ok(())
}
