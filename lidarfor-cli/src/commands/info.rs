use crate::cli::InfoOptions;
use anyhow::Result;
use lidarfor_common::cloud::Cloud;

pub fn info(options: InfoOptions) -> Result<()> {
    let cloud = Cloud::from_path(&options.input_file)?;
    println!("{}", options.input_file.display());
    println!("{}", cloud);
    Ok(())
}
