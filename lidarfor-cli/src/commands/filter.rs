use crate::cli::{FilterOptions, FilterZOptions};
use anyhow::{anyhow, Result};
use lidarfor_common::cloud::Cloud;
use log::info;

fn check_bounds(min: f64, max: f64) -> Result<()> {
    if min >= max {
        return Err(anyhow!(
            "The lower bound ({}) must be smaller than the upper bound ({}).",
            min,
            max
        ));
    }
    Ok(())
}

pub fn filter_z(options: FilterZOptions) -> Result<()> {
    check_bounds(options.min, options.max)?;
    let mut cloud = Cloud::from_path(&options.input_file)?;
    let before = cloud.len();
    cloud.filter_z(options.min, options.max);
    info!(
        "Kept {} of {} points with {} < z < {}",
        cloud.len(),
        before,
        options.min,
        options.max
    );
    cloud.write(&options.output_file)?;
    Ok(())
}

pub fn filter(options: FilterOptions) -> Result<()> {
    check_bounds(options.min, options.max)?;
    let mut cloud = Cloud::from_path(&options.input_file)?;
    let before = cloud.len();
    cloud.filter(options.min, options.max, options.dimension);
    info!(
        "Kept {} of {} points with {} < {} < {}",
        cloud.len(),
        before,
        options.min,
        options.dimension,
        options.max
    );
    cloud.write(&options.output_file)?;
    Ok(())
}
