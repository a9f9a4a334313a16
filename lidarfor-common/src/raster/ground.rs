use super::grid::Grid;
use super::{Aggregate, ParseEnumError, Raster};
use crate::cloud::point::Dimension;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// LAS classification code for ground points.
pub const GROUND_CLASS: u8 = 2;

/// Selects the cells and elevations, that make up the ground surface (DEM) of a point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundFilter {
    /// The lowest point in each cell.
    #[default]
    LowestPoint,

    /// The lowest point of the given classification in each cell.
    Classified { class: u8 },

    /// Progressive morphological filter (Zhang et al., 2003) on the lowest point surface.
    Zhang2003 {
        max_window: usize,
        slope: f64,
        dh_0: f64,
        dh_max: f64,
    },
}

impl GroundFilter {
    /// Builds the ground surface on the given grid.
    /// Cells, that are not considered ground, have no data.
    pub fn ground_surface(&self, grid: &Grid) -> Raster {
        match *self {
            GroundFilter::LowestPoint => grid.raster(Aggregate::Min, Dimension::Z),
            GroundFilter::Classified { class } => classified_surface(grid, class),
            GroundFilter::Zhang2003 {
                max_window,
                slope,
                dh_0,
                dh_max,
            } => {
                let lowest = grid.raster(Aggregate::Min, Dimension::Z);
                zhang2003(&lowest, max_window, slope, dh_0, dh_max)
            }
        }
    }
}

impl FromStr for GroundFilter {
    type Err = ParseEnumError;

    /// Parses the filter name. Filters with parameters get the default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowest_point" | "lowest" => Ok(GroundFilter::LowestPoint),
            "classified" => Ok(GroundFilter::Classified {
                class: GROUND_CLASS,
            }),
            "zhang2003" | "zhang" => Ok(GroundFilter::Zhang2003 {
                max_window: 5,
                slope: 0.3,
                dh_0: 0.3,
                dh_max: 3.0,
            }),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                valid: "lowest_point, classified, zhang2003",
            }),
        }
    }
}

fn classified_surface(grid: &Grid, class: u8) -> Raster {
    let points = grid.points();
    let mut raster = grid.empty_raster();
    let mut found = false;
    for ((row, col), indices) in grid.cells() {
        let lowest = indices
            .iter()
            .map(|&i| &points[i])
            .filter(|p| p.attributes.classification == class)
            .map(|p| p.position.z)
            .reduce(f64::min);
        if let Some(z) = lowest {
            raster.set(row, col, z);
            found = true;
        }
    }
    if !found {
        warn!(
            "No points with classification {}. Using the lowest points as ground instead.",
            class
        );
        return grid.raster(Aggregate::Min, Dimension::Z);
    }
    raster
}

/// Progressive morphological filter.
///
/// The surface is opened with growing windows (`2k + 1` cells for `k = 1..=max_window`).
/// Cells that drop by more than the elevation threshold of the current window are removed.
fn zhang2003(lowest: &Raster, max_window: usize, slope: f64, dh_0: f64, dh_max: f64) -> Raster {
    let cell_size = lowest.cell_size();
    let mut surface = lowest.clone();
    let mut ground: Vec<bool> = lowest.values().iter().map(|v| !v.is_nan()).collect();
    let mut threshold = dh_0;
    let mut previous_window = 1;

    for k in 1..=max_window {
        let window = 2 * k + 1;
        if k > 1 {
            threshold =
                (slope * (window - previous_window) as f64 * cell_size + dh_0).min(dh_max);
        }
        let opened = surface.opening(k);
        let mut removed = 0;
        for (i, is_ground) in ground.iter_mut().enumerate() {
            let drop = surface.values()[i] - opened.values()[i];
            if *is_ground && drop > threshold {
                *is_ground = false;
                removed += 1;
            }
        }
        debug!(
            "Ground filter window {}: threshold {:.3}, removed {} cells",
            window, threshold, removed
        );
        surface = opened;
        previous_window = window;
    }

    let mut result = lowest.clone();
    for (i, is_ground) in ground.into_iter().enumerate() {
        if !is_ground {
            result.set(i / result.cols(), i % result.cols(), f64::NAN);
        }
    }
    result
}
