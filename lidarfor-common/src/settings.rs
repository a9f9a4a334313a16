use crate::plot::colormap::ColorMap;
use crate::plot::{Plot3dOptions, PlotError, RasterPlotOptions};
use crate::raster::ground::GroundFilter;
use crate::raster::Interpolation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use toml::map::Map;

const DEFAULTS_TOML: &str = include_str!("defaults.toml");

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// All settings, that are not given on the command line.
/// Values missing from a settings file are taken from `defaults.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub grid: GridSettings,
    pub plot: PlotSettings,
    pub normalize: NormalizeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSettings {
    pub cell_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotSettings {
    pub width: u32,
    pub height: u32,
    pub cmap: String,
    pub cmap_3d: String,
    pub point_size: u32,
    pub max_points_3d: usize,
    pub max_points_iplot: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeSettings {
    pub cell_size: f64,
    pub ground_filter: GroundFilter,
    pub interpolation: Interpolation,
}

fn defaults_section(name: &str) -> Map<String, toml::Value> {
    let value: toml::Value = toml::from_str(DEFAULTS_TOML).expect("defaults.toml is invalid.");
    let toml::Value::Table(mut value) = value else {
        panic!("defaults.toml is invalid.")
    };
    let Some(toml::Value::Table(section)) = value.remove(name) else {
        panic!("defaults.toml is invalid.")
    };
    section
}

fn parse_key<T: DeserializeOwned>(map: &Map<String, toml::Value>, key: &str) -> T {
    let value = map.get(key).expect("defaults.toml is invalid.");
    value.clone().try_into().expect("defaults.toml is invalid.")
}

impl Default for GridSettings {
    fn default() -> Self {
        let defaults = defaults_section("grid");
        GridSettings {
            cell_size: parse_key(&defaults, "cell_size"),
        }
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        let defaults = defaults_section("plot");
        PlotSettings {
            width: parse_key(&defaults, "width"),
            height: parse_key(&defaults, "height"),
            cmap: parse_key(&defaults, "cmap"),
            cmap_3d: parse_key(&defaults, "cmap_3d"),
            point_size: parse_key(&defaults, "point_size"),
            max_points_3d: parse_key(&defaults, "max_points_3d"),
            max_points_iplot: parse_key(&defaults, "max_points_iplot"),
            seed: None,
        }
    }
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        let defaults = defaults_section("normalize");
        NormalizeSettings {
            cell_size: parse_key(&defaults, "cell_size"),
            ground_filter: parse_key(&defaults, "ground_filter"),
            interpolation: parse_key(&defaults, "interpolation"),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

impl PlotSettings {
    pub fn raster_options(&self) -> RasterPlotOptions {
        RasterPlotOptions {
            width: self.width,
            height: self.height,
        }
    }

    pub fn plot3d_options(&self) -> Result<Plot3dOptions, PlotError> {
        Ok(Plot3dOptions {
            width: self.width,
            height: self.height,
            point_size: self.point_size,
            cmap: ColorMap::by_name(&self.cmap_3d)?,
            max_points: self.max_points_3d,
            seed: self.seed,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsError};
    use crate::plot::colormap::ColorMap;
    use crate::raster::ground::GroundFilter;
    use crate::raster::Interpolation;
    use std::io::Write;

    #[test]
    fn test_default_toml_is_valid() {
        let settings = Settings::default();
        assert_eq!(settings.grid.cell_size, 1.0);
        assert_eq!(settings.plot.cmap, "viridis");
        assert_eq!(settings.plot.max_points_3d, 500_000);
        assert_eq!(settings.plot.max_points_iplot, 30_000);
        assert_eq!(settings.plot.seed, None);
        assert_eq!(settings.normalize.ground_filter, GroundFilter::LowestPoint);
        assert_eq!(settings.normalize.interpolation, Interpolation::default());
        assert!(ColorMap::by_name(&settings.plot.cmap).is_ok());
        assert!(settings.plot.plot3d_options().is_ok());
    }

    #[test]
    fn partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[plot]").unwrap();
        writeln!(file, "cmap = \"terrain\"").unwrap();
        writeln!(file, "seed = 7").unwrap();
        writeln!(file, "[normalize]").unwrap();
        writeln!(
            file,
            "ground_filter = {{ kind = \"zhang2003\", max_window = 3, slope = 0.5, dh_0 = 0.2, dh_max = 2.0 }}"
        )
        .unwrap();
        file.flush().unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.plot.cmap, "terrain");
        assert_eq!(settings.plot.seed, Some(7));
        assert_eq!(settings.plot.width, 800);
        assert_eq!(settings.grid.cell_size, 1.0);
        assert_eq!(
            settings.normalize.ground_filter,
            GroundFilter::Zhang2003 {
                max_window: 3,
                slope: 0.5,
                dh_0: 0.2,
                dh_max: 2.0
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[plot]").unwrap();
        writeln!(file, "colour = \"red\"").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            Settings::load(file.path()),
            Err(SettingsError::Toml(_))
        ));
    }
}
