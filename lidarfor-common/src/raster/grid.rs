use super::ground::GroundFilter;
use super::{Aggregate, Interpolation, Raster, RasterError};
use crate::cloud::point::{CloudPoint, Dimension};
use crate::cloud::CloudData;
use crate::plot::colormap::ColorMap;
use crate::plot::{PlotError, RasterPlotOptions};
use log::debug;
use nalgebra::{point, Point2};
use std::path::Path;

/// The points of a cloud, binned into square cells in the xy plane.
///
/// The grid covers the bounding box of the cloud. Row 0 is the northern edge, column 0 the
/// western edge. Points on the eastern or southern edge of the bounding box are put into the
/// last column / row.
#[derive(Debug, Clone)]
pub struct Grid<'a> {
    data: &'a CloudData,
    cell_size: f64,
    rows: usize,
    cols: usize,
    origin: Point2<f64>,

    /// (row, col) of each point.
    point_cells: Vec<(usize, usize)>,

    /// Indices of the points in each cell, row major.
    cell_points: Vec<Vec<usize>>,
}

impl<'a> Grid<'a> {
    pub fn new(data: &'a CloudData, cell_size: f64) -> Result<Self, RasterError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(RasterError::InvalidCellSize(cell_size));
        }
        let bounds = &data.header.bounds;
        if data.points.is_empty() || bounds.is_empty() {
            return Err(RasterError::EmptyCloud);
        }

        let extent = bounds.extent();
        let cols = cell_count(extent.x, cell_size);
        let rows = cell_count(extent.y, cell_size);
        let cells = Raster::checked_cell_count(rows, cols)?;
        let origin = point![bounds.min.x, bounds.max.y];

        let mut point_cells = Vec::with_capacity(data.points.len());
        let mut cell_points = vec![Vec::new(); cells];
        for (index, point) in data.points.iter().enumerate() {
            let col = cell_index(point.position.x - origin.x, cell_size, cols);
            let row = cell_index(origin.y - point.position.y, cell_size, rows);
            point_cells.push((row, col));
            cell_points[row * cols + col].push(index);
        }
        debug!(
            "Binned {} points into a {}x{} grid with cell size {}",
            data.points.len(),
            rows,
            cols,
            cell_size
        );

        Ok(Grid {
            data,
            cell_size,
            rows,
            cols,
            origin,
            point_cells,
            cell_points,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Upper left corner of the grid.
    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    pub fn points(&self) -> &'a [CloudPoint] {
        &self.data.points
    }

    /// The (row, col) of the cell containing the point with the given index.
    pub fn cell_of(&self, point_index: usize) -> (usize, usize) {
        self.point_cells[point_index]
    }

    /// Non-empty cells together with the indices of the points in them.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &[usize])> + '_ {
        self.cell_points
            .iter()
            .enumerate()
            .filter(|(_, indices)| !indices.is_empty())
            .map(|(i, indices)| ((i / self.cols, i % self.cols), indices.as_slice()))
    }

    /// A raster with the dimensions of this grid and no data in it.
    pub fn empty_raster(&self) -> Raster {
        Raster::new(self.rows, self.cols, self.cell_size, self.origin)
    }

    /// Combines the values of the points in each cell.
    /// Empty cells are NaN (or 0 when counting).
    pub fn raster(&self, aggregate: Aggregate, dimension: Dimension) -> Raster {
        let mut raster = self.empty_raster();
        let mut values = Vec::new();
        for (i, indices) in self.cell_points.iter().enumerate() {
            values.clear();
            values.extend(indices.iter().map(|&p| self.data.points[p].get(dimension)));
            raster.set(i / self.cols, i % self.cols, aggregate.apply(&values));
        }
        raster
    }

    /// Like [Grid::raster], but cells without data are filled from their neighbours.
    pub fn interpolate(
        &self,
        aggregate: Aggregate,
        dimension: Dimension,
        method: Interpolation,
    ) -> Result<Raster, RasterError> {
        let mut raster = self.raster(aggregate, dimension);
        raster.fill_nodata(method)?;
        Ok(raster)
    }

    /// The digital elevation model: the ground surface selected by the filter,
    /// with the gaps filled by interpolation.
    pub fn ground_dem(
        &self,
        filter: &GroundFilter,
        interpolation: Interpolation,
    ) -> Result<Raster, RasterError> {
        let mut dem = filter.ground_surface(self);
        debug!(
            "Ground surface has {} of {} cells without data",
            dem.nodata_cells().len(),
            self.rows * self.cols
        );
        dem.fill_nodata(interpolation)?;
        Ok(dem)
    }

    /// Height of each point above the ground, in point order.
    pub fn normalize(
        &self,
        filter: &GroundFilter,
        interpolation: Interpolation,
    ) -> Result<Vec<f64>, RasterError> {
        let dem = self.ground_dem(filter, interpolation)?;
        Ok(self
            .data
            .points
            .iter()
            .map(|p| p.position.z - dem.value_at(p.position.x, p.position.y))
            .collect())
    }

    /// Plots the aggregated z values of each cell.
    pub fn plot(
        &self,
        aggregate: Aggregate,
        cmap: &ColorMap,
        options: &RasterPlotOptions,
        path: &Path,
    ) -> Result<(), PlotError> {
        self.raster(aggregate, Dimension::Z).plot(cmap, options, path)
    }
}

fn cell_count(extent: f64, cell_size: f64) -> usize {
    ((extent / cell_size).ceil() as usize).max(1)
}

fn cell_index(offset: f64, cell_size: f64, count: usize) -> usize {
    let index = (offset / cell_size).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(count - 1)
    }
}
