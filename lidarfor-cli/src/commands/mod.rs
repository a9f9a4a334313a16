use anyhow::Result;
use lidarfor_common::settings::Settings;
use log::debug;
use std::path::Path;

pub mod clip;
pub mod filter;
pub mod info;
pub mod normalize;
pub mod plot;
pub mod raster;

/// Reads the settings file, or uses the defaults if there is none.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            Settings::load(path)?
        }
        None => Settings::default(),
    };
    debug!("{:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use crate::cli::{
        ClipOptions, FilterOptions, FilterZOptions, IPlot3dOptions, InfoOptions, NormalizeOptions,
        Plot3dOptions, PlotOptions, RasterOptions,
    };
    use lidarfor_common::cloud::header::CloudHeader;
    use lidarfor_common::cloud::point::{CloudPoint, Dimension};
    use lidarfor_common::cloud::{Cloud, CloudData};
    use lidarfor_common::raster::Aggregate;
    use lidarfor_common::settings::Settings;
    use std::path::{Path, PathBuf};

    /// Flat ground at z=10 with a column of points up to 5 m above it.
    fn write_test_cloud(dir: &Path) -> PathBuf {
        let mut points = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                points.push(CloudPoint::new(i as f64 + 0.5, j as f64 + 0.5, 10.0));
            }
        }
        for k in 1..=5 {
            points.push(CloudPoint::new(4.5, 4.5, 10.0 + k as f64));
        }
        let path = dir.join("input.las");
        CloudData::new(points, CloudHeader::new(None))
            .write(&path)
            .unwrap();
        path
    }

    #[test]
    fn run_commands() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_cloud(dir.path());
        let settings = Settings::default();

        super::info::info(InfoOptions {
            input_file: input.clone(),
        })
        .unwrap();

        let clipped = dir.path().join("clipped.las");
        super::clip::clip(ClipOptions {
            input_file: input.clone(),
            output_file: clipped.clone(),
            geometry: Some("bbox:0,0,2,2".parse().unwrap()),
            wkt_file: None,
        })
        .unwrap();
        assert_eq!(Cloud::from_path(&clipped).unwrap().len(), 4);

        let filtered = dir.path().join("filtered.laz");
        super::filter::filter_z(FilterZOptions {
            input_file: input.clone(),
            output_file: filtered.clone(),
            min: 10.5,
            max: 100.0,
        })
        .unwrap();
        assert_eq!(Cloud::from_path(&filtered).unwrap().len(), 5);

        let normalized = dir.path().join("normalized.las");
        super::normalize::normalize(
            NormalizeOptions {
                input_file: input.clone(),
                output_file: normalized.clone(),
                cell_size: None,
                ground_filter: None,
                interpolation: None,
            },
            &settings,
        )
        .unwrap();
        let normalized = Cloud::from_path(&normalized).unwrap();
        assert!(normalized.header().bounds.min.z.abs() < 1e-6);
        assert!((normalized.header().bounds.max.z - 5.0).abs() < 1e-6);

        let asc = dir.path().join("count.asc");
        super::raster::raster(
            RasterOptions {
                input_file: input.clone(),
                output_file: asc.clone(),
                cell_size: Some(1.0),
                aggregate: Aggregate::Count,
                dimension: Dimension::Z,
                interpolate: None,
                cmap: None,
            },
            &settings,
        )
        .unwrap();
        assert!(std::fs::read_to_string(&asc).unwrap().starts_with("ncols 9"));

        let png = dir.path().join("chm.png");
        super::plot::plot(
            PlotOptions {
                input_file: input.clone(),
                output_file: png.clone(),
                cell_size: None,
                cmap: Some("terrain".to_string()),
            },
            &settings,
        )
        .unwrap();
        assert!(png.exists());

        let column = dir.path().join("column.las");
        super::filter::filter(FilterOptions {
            input_file: input.clone(),
            output_file: column.clone(),
            dimension: Dimension::X,
            min: 4.0,
            max: 5.0,
        })
        .unwrap();
        // one row of ground points plus the column
        assert_eq!(Cloud::from_path(&column).unwrap().len(), 15);

        let png_3d = dir.path().join("cloud.png");
        super::plot::plot3d(
            Plot3dOptions {
                input_file: input.clone(),
                output_file: png_3d.clone(),
                max_points: Some(30),
                point_size: Some(2),
                cmap: None,
                seed: Some(2),
            },
            &settings,
        )
        .unwrap();
        assert!(png_3d.exists());

        let html = dir.path().join("cloud.html");
        super::plot::iplot3d(
            IPlot3dOptions {
                input_file: input,
                output_file: html.clone(),
                max_points: Some(20),
                cmap: Some("viridis".to_string()),
                seed: Some(1),
            },
            &settings,
        )
        .unwrap();
        assert!(html.exists());
    }
}
