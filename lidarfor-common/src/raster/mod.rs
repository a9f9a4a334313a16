pub mod grid;
pub mod ground;

use crate::plot::colormap::ColorMap;
use crate::plot::{self, PlotError, RasterPlotOptions};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Value written for cells without data by [Raster::write_ascii].
pub const ASCII_NODATA_VALUE: f64 = -9999.0;

/// Largest number of cells a grid or raster may have.
pub const MAX_CELLS: usize = 1 << 27;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("The cell size must be a positive, finite number. (got: {0})")]
    InvalidCellSize(f64),
    #[error("A {rows}x{cols} raster has too many cells. (at most {} are allowed, use a larger cell size)", MAX_CELLS)]
    TooManyCells { rows: usize, cols: usize },
    #[error("Cannot build a grid for an empty point cloud.")]
    EmptyCloud,
    #[error("The raster does not contain any data to interpolate from.")]
    NoData,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[error("Unrecognized value '{value}'. Valid values are: {valid}")]
pub struct ParseEnumError {
    pub value: String,
    pub valid: &'static str,
}

/// How the values of the points in a cell are combined into a single cell value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Min,
    Max,
    Mean,
    Median,
    Count,
    Sum,
    Std,
}

impl Aggregate {
    /// Combines the values. NaN values are ignored.
    /// Returns NaN if no values are left, except for [Aggregate::Count], which returns 0.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let mut values: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if let Aggregate::Count = self {
            return values.len() as f64;
        }
        if values.is_empty() {
            return f64::NAN;
        }
        let n = values.len() as f64;
        match self {
            Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregate::Sum => values.iter().sum(),
            Aggregate::Mean => values.iter().sum::<f64>() / n,
            Aggregate::Median => {
                values.sort_unstable_by(f64::total_cmp);
                let mid = values.len() / 2;
                if values.len() % 2 == 0 {
                    (values[mid - 1] + values[mid]) * 0.5
                } else {
                    values[mid]
                }
            }
            Aggregate::Std => {
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                var.sqrt()
            }
            Aggregate::Count => unreachable!(),
        }
    }
}

impl std::str::FromStr for Aggregate {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Ok(Aggregate::Min),
            "max" => Ok(Aggregate::Max),
            "mean" => Ok(Aggregate::Mean),
            "median" => Ok(Aggregate::Median),
            "count" => Ok(Aggregate::Count),
            "sum" => Ok(Aggregate::Sum),
            "std" => Ok(Aggregate::Std),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                valid: "min, max, mean, median, count, sum, std",
            }),
        }
    }
}

/// How cells without data are filled.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Interpolation {
    /// Value of the closest cell with data.
    Nearest,

    /// Inverse distance weighting of the closest `neighbors` cells with data.
    Idw { power: f64, neighbors: usize },
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Idw {
            power: 2.0,
            neighbors: 8,
        }
    }
}

impl std::str::FromStr for Interpolation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Interpolation::Nearest),
            "idw" => Ok(Interpolation::default()),
            _ => Err(ParseEnumError {
                value: s.to_string(),
                valid: "nearest, idw",
            }),
        }
    }
}

/// A north-up grid of values.
/// Row 0 is the northern most row, column 0 the western most column.
/// Cells without data are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    cols: usize,
    cell_size: f64,
    /// Upper left (north west) corner of the raster.
    origin: Point2<f64>,
    data: Vec<f64>,
}

impl Raster {
    /// Number of cells of a `rows` x `cols` raster,
    /// or an error if it exceeds [MAX_CELLS].
    pub fn checked_cell_count(rows: usize, cols: usize) -> Result<usize, RasterError> {
        rows.checked_mul(cols)
            .filter(|&cells| cells <= MAX_CELLS)
            .ok_or(RasterError::TooManyCells { rows, cols })
    }

    /// Constructs a raster, where all cells have no data.
    ///
    /// # Panics
    /// Panics, if the raster would have more than [MAX_CELLS] cells.
    /// See [Raster::checked_cell_count].
    pub fn new(rows: usize, cols: usize, cell_size: f64, origin: Point2<f64>) -> Self {
        if let Err(e) = Self::checked_cell_count(rows, cols) {
            panic!("{}", e);
        }
        Raster {
            rows,
            cols,
            cell_size,
            origin,
            data: vec![f64::NAN; rows * cols],
        }
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

    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn has_data(&self, row: usize, col: usize) -> bool {
        !self.get(row, col).is_nan()
    }

    /// All cells without data, in row major order.
    pub fn nodata_cells(&self) -> Vec<(usize, usize)> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (row, col)))
            .filter(|&(row, col)| !self.has_data(row, col))
            .collect()
    }

    pub fn min(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }

    /// Bilinear interpolation between the cell centers around the given position.
    ///
    /// Outside of the outermost cell centers, the value of the closest border cell is used.
    /// Neighbours without data are left out of the interpolation. NaN if none of them has data.
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        let fc = (x - self.origin.x) / self.cell_size - 0.5;
        let fr = (self.origin.y - y) / self.cell_size - 0.5;
        let (c0, c1, tc) = interpolation_support(fc, self.cols);
        let (r0, r1, tr) = interpolation_support(fr, self.rows);

        let samples = [
            (r0, c0, (1.0 - tr) * (1.0 - tc)),
            (r0, c1, (1.0 - tr) * tc),
            (r1, c0, tr * (1.0 - tc)),
            (r1, c1, tr * tc),
        ];
        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        for (row, col, weight) in samples {
            let value = self.get(row, col);
            if !value.is_nan() && weight > 0.0 {
                sum += value * weight;
                weight_sum += weight;
            }
        }
        if weight_sum > 0.0 {
            return sum / weight_sum;
        }

        // all neighbours with a non-zero weight are empty - fall back to any neighbour with data.
        samples
            .iter()
            .map(|&(row, col, _)| self.get(row, col))
            .find(|v| !v.is_nan())
            .unwrap_or(f64::NAN)
    }

    /// Fills all cells without data from the surrounding cells, that have data.
    pub fn fill_nodata(&mut self, method: Interpolation) -> Result<(), RasterError> {
        let empty = self.nodata_cells();
        if empty.is_empty() {
            return Ok(());
        }
        if empty.len() == self.data.len() {
            return Err(RasterError::NoData);
        }

        let wanted = match method {
            Interpolation::Nearest => 1,
            Interpolation::Idw { neighbors, .. } => neighbors.max(1),
        };
        let mut filled = Vec::with_capacity(empty.len());
        for &(row, col) in &empty {
            let mut candidates = self.neighbours_with_data(row, col, wanted);
            candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            candidates.truncate(wanted);
            let value = match method {
                Interpolation::Nearest => candidates[0].1,
                Interpolation::Idw { power, .. } => {
                    let mut sum = 0.0;
                    let mut weight_sum = 0.0;
                    for &(dist_sq, value) in &candidates {
                        let weight = 1.0 / dist_sq.sqrt().powf(power);
                        sum += weight * value;
                        weight_sum += weight;
                    }
                    sum / weight_sum
                }
            };
            filled.push(value);
        }

        for ((row, col), value) in empty.into_iter().zip(filled) {
            self.set(row, col, value);
        }
        Ok(())
    }

    /// Searches rings of growing size around the cell, until at least `wanted` cells with data
    /// are found. Returns (squared distance in cells, value) pairs.
    ///
    /// Once enough candidates are found, the search continues up to the radius, where cells
    /// could still be closer (in euclidean distance) than the found ones.
    fn neighbours_with_data(&self, row: usize, col: usize, wanted: usize) -> Vec<(f64, f64)> {
        let max_radius = self.rows.max(self.cols);
        let mut found = Vec::new();
        let mut stop_at = max_radius;
        let mut radius = 1;
        while radius <= stop_at {
            self.visit_ring(row, col, radius, |r, c| {
                let value = self.get(r, c);
                if !value.is_nan() {
                    let dr = r as f64 - row as f64;
                    let dc = c as f64 - col as f64;
                    found.push((dr * dr + dc * dc, value));
                }
            });
            if found.len() >= wanted && stop_at == max_radius {
                stop_at = ((radius as f64) * std::f64::consts::SQRT_2).ceil() as usize;
                stop_at = stop_at.min(max_radius);
            }
            radius += 1;
        }
        found
    }

    /// Calls `f` for each cell, whose chebyshev distance to (row, col) is exactly `radius`.
    fn visit_ring<F: FnMut(usize, usize)>(&self, row: usize, col: usize, radius: usize, mut f: F) {
        let r = radius as isize;
        let (row, col) = (row as isize, col as isize);
        for dr in -r..=r {
            for dc in -r..=r {
                if dr.abs() != r && dc.abs() != r {
                    continue;
                }
                let (rr, cc) = (row + dr, col + dc);
                if rr < 0 || cc < 0 || rr >= self.rows as isize || cc >= self.cols as isize {
                    continue;
                }
                f(rr as usize, cc as usize);
            }
        }
    }

    /// Applies a square min filter (`erode == true`) or max filter with a window of
    /// `2 * half_size + 1` cells. Cells without data are ignored.
    pub fn morphological_filter(&self, half_size: usize, erode: bool) -> Raster {
        let mut result = self.clone();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let r_lo = row.saturating_sub(half_size);
                let r_hi = (row + half_size).min(self.rows - 1);
                let c_lo = col.saturating_sub(half_size);
                let c_hi = (col + half_size).min(self.cols - 1);
                let mut acc = f64::NAN;
                for r in r_lo..=r_hi {
                    for c in c_lo..=c_hi {
                        let v = self.get(r, c);
                        if v.is_nan() {
                            continue;
                        }
                        if acc.is_nan() || (erode && v < acc) || (!erode && v > acc) {
                            acc = v;
                        }
                    }
                }
                result.set(row, col, acc);
            }
        }
        result
    }

    /// Morphological opening: erosion followed by dilation.
    pub fn opening(&self, half_size: usize) -> Raster {
        self.morphological_filter(half_size, true)
            .morphological_filter(half_size, false)
    }

    /// Renders the raster as a heat map image.
    pub fn plot(
        &self,
        cmap: &ColorMap,
        options: &RasterPlotOptions,
        path: &Path,
    ) -> Result<(), PlotError> {
        plot::plot_raster(self, cmap, options, path)
    }

    /// Writes the raster as an ESRI ascii grid.
    pub fn write_ascii(&self, path: &Path) -> Result<(), RasterError> {
        let mut wr = BufWriter::new(File::create(path)?);
        let lower_left_y = self.origin.y - self.rows as f64 * self.cell_size;
        writeln!(wr, "ncols {}", self.cols)?;
        writeln!(wr, "nrows {}", self.rows)?;
        writeln!(wr, "xllcorner {}", self.origin.x)?;
        writeln!(wr, "yllcorner {}", lower_left_y)?;
        writeln!(wr, "cellsize {}", self.cell_size)?;
        writeln!(wr, "NODATA_value {}", ASCII_NODATA_VALUE)?;
        for row in 0..self.rows {
            let line = (0..self.cols)
                .map(|col| {
                    let v = self.get(row, col);
                    if v.is_nan() {
                        ASCII_NODATA_VALUE.to_string()
                    } else {
                        v.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(wr, "{}", line)?;
        }
        wr.flush()?;
        Ok(())
    }
}

/// Indices of the two samples and the interpolation factor between them, along one axis.
fn interpolation_support(f: f64, len: usize) -> (usize, usize, f64) {
    let last = len.saturating_sub(1);
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let i0 = f.floor() as usize;
    if i0 >= last {
        return (last, last, 0.0);
    }
    (i0, i0 + 1, f - i0 as f64)
}
