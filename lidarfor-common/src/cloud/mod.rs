pub mod header;
pub mod point;

use crate::clip::ClipGeometry;
use crate::las::{read_cloud_data, write_cloud_data, LasError};
use crate::plot::colormap::ColorMap;
use crate::plot::{self, Plot3dOptions, PlotError, RasterPlotOptions};
use crate::raster::grid::Grid;
use crate::raster::ground::GroundFilter;
use crate::raster::{Aggregate, Interpolation, RasterError};
use header::CloudHeader;
use log::{debug, info, warn};
use point::{CloudPoint, Dimension};
use std::fmt::{Display, Formatter};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error(transparent)]
    Las(#[from] LasError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}

/// The points of a point cloud together with the header describing them.
///
/// Whenever the points change, the header bounds and point count are recalculated,
/// regardless of what the header said before.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudData {
    pub points: Vec<CloudPoint>,
    pub header: CloudHeader,
}

impl CloudData {
    pub fn new(points: Vec<CloudPoint>, header: CloudHeader) -> Self {
        let mut data = CloudData { points, header };
        data.refresh_header();
        data
    }

    /// Recalculates bounds and point count of the header.
    pub fn refresh_header(&mut self) {
        self.header.update_from(&self.points);
    }

    pub fn write(&self, path: &Path) -> Result<(), LasError> {
        write_cloud_data(self, path)
    }

    /// Copies the points, for which the mask is true, into a new container.
    /// The new container keeps the las metadata of this one.
    pub fn select(&self, mask: &[bool]) -> CloudData {
        assert_eq!(mask.len(), self.points.len());
        let points = self
            .points
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(p, _)| p.clone())
            .collect();
        CloudData::new(points, CloudHeader::new(self.header.metadata.clone()))
    }

    /// Removes all points, that do not match the predicate.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&CloudPoint) -> bool,
    {
        self.points.retain(f);
        self.refresh_header();
    }
}

/// A point cloud, that can be gridded, plotted, normalized, clipped and filtered.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub data: CloudData,
}

impl From<CloudData> for Cloud {
    fn from(data: CloudData) -> Self {
        Cloud { data }
    }
}

impl Cloud {
    /// Reads a las or laz file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CloudError> {
        let data = read_cloud_data(path.as_ref())?;
        info!(
            "Loaded {} points from {}",
            data.header.count,
            path.as_ref().display()
        );
        Ok(Cloud { data })
    }

    pub fn header(&self) -> &CloudHeader {
        &self.data.header
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.data.points
    }

    pub fn len(&self) -> usize {
        self.data.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.points.is_empty()
    }

    /// Bins the points into square cells of the given size.
    pub fn grid(&self, cell_size: f64) -> Result<Grid<'_>, RasterError> {
        Grid::new(&self.data, cell_size)
    }

    /// Renders a canopy height model (the highest point per cell) to an image file.
    pub fn plot(
        &self,
        cell_size: f64,
        cmap: &ColorMap,
        options: &RasterPlotOptions,
        path: &Path,
    ) -> Result<(), CloudError> {
        self.grid(cell_size)?
            .plot(Aggregate::Max, cmap, options, path)?;
        Ok(())
    }

    /// Renders the points as a three dimensional scatter plot.
    ///
    /// Large clouds are randomly down sampled to `options.max_points` first.
    pub fn plot3d(&self, options: &Plot3dOptions, path: &Path) -> Result<(), CloudError> {
        let indices = plot::sample_indices(self.len(), options.max_points, options.seed);
        if indices.len() < self.len() {
            info!("Too many points, down sampling for 3d plot performance.");
        }
        let coordinates: Vec<_> = indices.iter().map(|&i| self.data.points[i].position).collect();
        plot::plot_points_3d(&coordinates, options, path)?;
        Ok(())
    }

    /// Writes an interactive html page showing at most `max_points` points, colored by height.
    pub fn iplot3d(
        &self,
        max_points: usize,
        seed: Option<u64>,
        cmap: &ColorMap,
        path: &Path,
    ) -> Result<(), CloudError> {
        let indices = plot::sample_indices(self.len(), max_points, seed);
        let coordinates: Vec<_> = indices.iter().map(|&i| self.data.points[i].position).collect();
        plot::write_iplot3d(&coordinates, cmap, path)?;
        Ok(())
    }

    /// Replaces the z coordinate of each point with its height above the ground.
    ///
    /// The ground is a digital elevation model built with the given ground filter, on a grid
    /// with the given cell size.
    pub fn normalize(
        &mut self,
        cell_size: f64,
        filter: &GroundFilter,
        interpolation: Interpolation,
    ) -> Result<(), CloudError> {
        let heights = {
            let grid = self.grid(cell_size)?;
            debug!("Normalizing on a {}x{} grid", grid.rows(), grid.cols());
            grid.normalize(filter, interpolation)?
        };
        for (point, height) in self.data.points.iter_mut().zip(heights) {
            point.position.z = height;
        }
        self.data.refresh_header();
        Ok(())
    }

    /// Returns a new cloud with the points inside the given geometry.
    pub fn clip(&self, geometry: &ClipGeometry) -> Cloud {
        let footprint = self.data.header.bounds;
        let area = geometry.bounds();
        if !footprint.intersects_xy(area) {
            warn!("The clip geometry does not overlap the point cloud.");
        } else if !footprint.contains_xy_aabb(area) {
            warn!("The clip geometry extends beyond the bounds of the point cloud.");
        }
        let mask = geometry.mask(&self.data.points);
        Cloud::from(self.data.select(&mask))
    }

    /// Keeps the points with `min < z < max`.
    pub fn filter_z(&mut self, min: f64, max: f64) {
        self.filter(min, max, Dimension::Z)
    }

    /// Keeps the points, whose value in the given dimension is strictly between min and max.
    pub fn filter(&mut self, min: f64, max: f64, dimension: Dimension) {
        self.data.retain(|p| {
            let value = p.get(dimension);
            value > min && value < max
        });
    }

    pub fn write(&self, path: &Path) -> Result<(), CloudError> {
        self.data.write(path)?;
        Ok(())
    }
}

impl Display for Cloud {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data.header)
    }
}

#[cfg(test)]
pub mod test {
    use super::header::CloudHeader;
    use super::point::{CloudPoint, LasPointAttributes};
    use super::{Cloud, CloudData};

    /// A 10x10 m plot with flat ground at z=100, sampled every 0.5 m (classification 2),
    /// and a "tree" of points at heights up to 20 m above the ground, centered on (5, 5).
    pub fn forest_plot() -> Cloud {
        let mut points = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                let x = i as f64 * 0.5 + 0.25;
                let y = j as f64 * 0.5 + 0.25;
                points.push(CloudPoint::new(x, y, 100.0).with_attributes(LasPointAttributes {
                    classification: 2,
                    ..Default::default()
                }));
            }
        }
        for k in 0..=20 {
            let h = k as f64;
            points.push(CloudPoint::new(5.1, 5.1, 100.0 + h).with_attributes(
                LasPointAttributes {
                    classification: 5,
                    ..Default::default()
                },
            ));
        }
        Cloud::from(CloudData::new(points, CloudHeader::new(None)))
    }
}
