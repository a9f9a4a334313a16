use crate::cli::ClipOptions;
use anyhow::{anyhow, Result};
use lidarfor_common::clip::ClipGeometry;
use lidarfor_common::cloud::Cloud;
use lidarfor_common::wkt;
use log::info;

pub fn clip(options: ClipOptions) -> Result<()> {
    let geometry = match (options.geometry, &options.wkt_file) {
        (Some(geometry), None) => geometry,
        (None, Some(wkt_file)) => {
            let text = std::fs::read_to_string(wkt_file)?;
            ClipGeometry::Polygon(wkt::parse_geometry(&text)?)
        }
        _ => return Err(anyhow!("Pass either a clip geometry or a wkt file.")),
    };

    let cloud = Cloud::from_path(&options.input_file)?;
    let clipped = cloud.clip(&geometry);
    info!(
        "{} of {} points are inside the clip geometry.",
        clipped.len(),
        cloud.len()
    );
    clipped.write(&options.output_file)?;
    Ok(())
}
